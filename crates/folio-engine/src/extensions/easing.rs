// extensions/easing.rs
//
// Easing curves under the names the page's stylesheets and timelines use
// ("power2.inOut", "expo.inOut", ...). Pure math, no state.

use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// "none": constant velocity.
    #[default]
    Linear,
    Power1In,
    Power1Out,
    Power1InOut,
    Power2In,
    Power2Out,
    Power2InOut,
    Power3In,
    Power3Out,
    Power3InOut,
    Power4In,
    Power4Out,
    Power4InOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    /// Overshoots then settles.
    BackOut,
    /// "elastic.out(1, 0.5)".
    ElasticOut,
    BounceOut,
}

impl Easing {
    /// Parse a timeline ease name. Unknown names fall back to `None`.
    pub fn from_name(name: &str) -> Option<Easing> {
        let base = name.split('(').next().unwrap_or(name).trim();
        let easing = match base {
            "none" | "linear" => Easing::Linear,
            "power1.in" => Easing::Power1In,
            "power1.out" | "power1" => Easing::Power1Out,
            "power1.inOut" => Easing::Power1InOut,
            "power2.in" => Easing::Power2In,
            "power2.out" | "power2" => Easing::Power2Out,
            "power2.inOut" => Easing::Power2InOut,
            "power3.in" => Easing::Power3In,
            "power3.out" | "power3" => Easing::Power3Out,
            "power3.inOut" => Easing::Power3InOut,
            "power4.in" => Easing::Power4In,
            "power4.out" | "power4" => Easing::Power4Out,
            "power4.inOut" => Easing::Power4InOut,
            "sine.in" => Easing::SineIn,
            "sine.out" | "sine" => Easing::SineOut,
            "sine.inOut" => Easing::SineInOut,
            "expo.in" => Easing::ExpoIn,
            "expo.out" | "expo" => Easing::ExpoOut,
            "expo.inOut" => Easing::ExpoInOut,
            "back.out" | "back" => Easing::BackOut,
            "elastic.out" | "elastic" => Easing::ElasticOut,
            "bounce.out" | "bounce" => Easing::BounceOut,
            _ => return None,
        };
        Some(easing)
    }

    /// Map normalized time in [0, 1] to eased progress.
    /// Input is clamped; output may overshoot for `BackOut`/`ElasticOut`.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,

            Easing::Power1In => power_in(t, 2),
            Easing::Power1Out => power_out(t, 2),
            Easing::Power1InOut => power_in_out(t, 2),
            Easing::Power2In => power_in(t, 3),
            Easing::Power2Out => power_out(t, 3),
            Easing::Power2InOut => power_in_out(t, 3),
            Easing::Power3In => power_in(t, 4),
            Easing::Power3Out => power_out(t, 4),
            Easing::Power3InOut => power_in_out(t, 4),
            Easing::Power4In => power_in(t, 5),
            Easing::Power4Out => power_out(t, 5),
            Easing::Power4InOut => power_in_out(t, 5),

            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,

            Easing::ExpoIn => {
                if t == 0.0 { 0.0 } else { 2.0_f32.powf(10.0 * t - 10.0) }
            }
            Easing::ExpoOut => {
                if t == 1.0 { 1.0 } else { 1.0 - 2.0_f32.powf(-10.0 * t) }
            }
            Easing::ExpoInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }

            Easing::BackOut => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }

            Easing::ElasticOut => {
                // amplitude 1, period 0.5
                const C: f32 = (2.0 * PI) / 0.5;
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2.0_f32.powf(-10.0 * t) * ((t - 0.125) * C).sin() + 1.0
                }
            }

            Easing::BounceOut => bounce_out(t),
        }
    }
}

// GSAP's powerN is a polynomial of degree N + 1.
#[inline]
fn power_in(t: f32, degree: i32) -> f32 {
    t.powi(degree)
}

#[inline]
fn power_out(t: f32, degree: i32) -> f32 {
    1.0 - (1.0 - t).powi(degree)
}

#[inline]
fn power_in_out(t: f32, degree: i32) -> f32 {
    if t < 0.5 {
        power_in(t * 2.0, degree) / 2.0
    } else {
        1.0 - power_in((1.0 - t) * 2.0, degree) / 2.0
    }
}

#[inline]
fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: glam::Vec3, b: glam::Vec3, t: f32) -> glam::Vec3 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease(a: f32, b: f32, t: f32, easing: Easing) -> f32 {
    lerp(a, b, easing.apply(t))
}

/// Where `value` sits between `start` and `end`, clamped to [0, 1].
/// A degenerate range counts as fully past once `value` reaches `end`.
#[inline]
pub fn progress_between(value: f32, start: f32, end: f32) -> f32 {
    let span = end - start;
    if span.abs() <= f32::EPSILON {
        return if value >= end { 1.0 } else { 0.0 };
    }
    ((value - start) / span).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 22] = [
        Easing::Linear,
        Easing::Power1In, Easing::Power1Out, Easing::Power1InOut,
        Easing::Power2In, Easing::Power2Out, Easing::Power2InOut,
        Easing::Power3In, Easing::Power3Out, Easing::Power3InOut,
        Easing::Power4In, Easing::Power4Out, Easing::Power4InOut,
        Easing::SineIn, Easing::SineOut, Easing::SineInOut,
        Easing::ExpoIn, Easing::ExpoOut, Easing::ExpoInOut,
        Easing::BackOut, Easing::ElasticOut, Easing::BounceOut,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-3, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-3, "{:?} at 1", easing);
        }
    }

    #[test]
    fn in_out_curves_are_symmetric_at_half() {
        for easing in [Easing::Power2InOut, Easing::Power3InOut, Easing::SineInOut, Easing::ExpoInOut] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-3, "{:?}", easing);
        }
    }

    #[test]
    fn out_curves_lead() {
        assert!(Easing::Power3Out.apply(0.3) > 0.3);
        assert!(Easing::Power2In.apply(0.3) < 0.3);
    }

    #[test]
    fn parses_timeline_names() {
        assert_eq!(Easing::from_name("power2.inOut"), Some(Easing::Power2InOut));
        assert_eq!(Easing::from_name("elastic.out(1, 0.5)"), Some(Easing::ElasticOut));
        assert_eq!(Easing::from_name("none"), Some(Easing::Linear));
        assert_eq!(Easing::from_name("wobble.sideways"), None);
    }

    #[test]
    fn progress_between_clamps() {
        assert_eq!(progress_between(5.0, 0.0, 10.0), 0.5);
        assert_eq!(progress_between(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(progress_between(50.0, 0.0, 10.0), 1.0);
        assert_eq!(progress_between(3.0, 3.0, 3.0), 1.0);
    }
}
