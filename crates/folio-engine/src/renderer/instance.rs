use bytemuck::{Pod, Zeroable};

/// What the canvas adapter should draw for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Shape {
    /// Filled circle. `size` = radius.
    Dot = 0,
    /// Glass bubble: translucent fill, rim stroke and highlight. `size` = radius.
    Bubble = 1,
    /// Soft light shaft hanging from the top edge. `size` = width,
    /// `extent` = length, `rotation` = tilt in radians.
    Ray = 2,
    /// Radial gradient blob fading to transparent. `size` = radius.
    Glow = 3,
    /// Matrix glyph. `size` = font px, `extent` = glyph index.
    Glyph = 4,
    /// Stroked circle outline. `size` = radius, `extent` = line width.
    Ring = 5,
}

impl Shape {
    pub fn from_f32(value: f32) -> Option<Shape> {
        match value as u8 {
            0 => Some(Shape::Dot),
            1 => Some(Shape::Bubble),
            2 => Some(Shape::Ray),
            3 => Some(Shape::Glow),
            4 => Some(Shape::Glyph),
            5 => Some(Shape::Ring),
            _ => None,
        }
    }
}

/// Stacking order. The adapter draws layers in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum DrawLayer {
    Backdrop = 0,
    Intro = 1,
    Overlay = 2,
}

/// One drawable, 12 floats = 48 bytes stride.
/// The bridge hands the raw buffer to the canvas adapter without copying.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DrawInstance {
    pub shape: f32,
    pub layer: f32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub extent: f32,
    pub rotation: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// Already clamped to [0, 1].
    pub alpha: f32,
    pub _pad: f32,
}

impl DrawInstance {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn new(shape: Shape, layer: DrawLayer, x: f32, y: f32, size: f32) -> Self {
        Self {
            shape: shape as u8 as f32,
            layer: layer as u8 as f32,
            x,
            y,
            size,
            r: 1.0,
            g: 1.0,
            b: 1.0,
            alpha: 1.0,
            ..Self::default()
        }
    }

    pub fn with_rgb(mut self, rgb: [f32; 3]) -> Self {
        self.r = rgb[0];
        self.g = rgb[1];
        self.b = rgb[2];
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn with_extent(mut self, extent: f32) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn shape(&self) -> Option<Shape> {
        Shape::from_f32(self.shape)
    }
}

/// Per-frame list of drawables, rebuilt from scratch every frame.
#[derive(Debug)]
pub struct DrawBuffer {
    instances: Vec<DrawInstance>,
    capacity: usize,
    dropped: usize,
}

impl DrawBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raise the cap to at least `capacity`. Never shrinks.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.capacity {
            self.instances.reserve(capacity - self.instances.len());
            self.capacity = capacity;
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.dropped = 0;
    }

    /// Append an instance. Instances past capacity are counted and discarded;
    /// invisible ones are skipped outright.
    pub fn push(&mut self, instance: DrawInstance) {
        if instance.alpha <= 0.0 {
            return;
        }
        if self.instances.len() >= self.capacity {
            self.dropped += 1;
            return;
        }
        self.instances.push(instance);
    }

    pub fn instances(&self) -> &[DrawInstance] {
        &self.instances
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Stable sort by layer so the adapter can paint back to front in one pass.
    pub fn sort_by_layer(&mut self) {
        self.instances.sort_by(|a, b| a.layer.total_cmp(&b.layer));
    }
}

impl Default for DrawBuffer {
    fn default() -> Self {
        Self::with_capacity(2048)
    }
}
