use serde::{Deserialize, Serialize};

/// Timed phase lengths in milliseconds.
/// CENTRAL_BUBBLE has no entry here: it only advances on a click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    pub emergence_ms: f64,
    pub convergence_ms: f64,
    pub explosion_ms: f64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            emergence_ms: 3000.0,
            convergence_ms: 2000.0,
            explosion_ms: 1000.0,
        }
    }
}

/// Ambient dust field shown behind the curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DustConfig {
    pub count: usize,
    /// Distance past each edge before a particle wraps to the opposite side.
    pub wrap_margin: f32,
}

impl Default for DustConfig {
    fn default() -> Self {
        Self { count: 80, wrap_margin: 10.0 }
    }
}

/// Underwater scene shown during the intro.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeaConfig {
    pub bubbles: usize,
    pub light_rays: usize,
    pub plankton: usize,
    pub caustics: usize,
}

impl Default for SeaConfig {
    fn default() -> Self {
        Self {
            bubbles: 30,
            light_rays: 6,
            plankton: 60,
            caustics: 5,
        }
    }
}

/// 3D intro bubbles. Sizes are in pixels and divided by 100 for world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroBubbleConfig {
    pub count: usize,
    pub min_size: f32,
    pub max_size: f32,
    pub merged_size: f32,
    pub rise_speed_min: f32,
    pub rise_speed_max: f32,
    /// Minimum gap between two hover sounds on the central bubble.
    pub hover_sound_debounce_ms: f64,
}

impl Default for IntroBubbleConfig {
    fn default() -> Self {
        Self {
            count: 18,
            min_size: 20.0,
            max_size: 80.0,
            merged_size: 350.0,
            rise_speed_min: 0.8,
            rise_speed_max: 2.0,
            hover_sound_debounce_ms: 5000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EggConfig {
    pub konami_ms: f64,
    pub matrix_ms: f64,
    pub avatar_ms: f64,
    pub avatar_clicks: u32,
    /// Idle gap after which the avatar click count starts over.
    pub avatar_reset_ms: f64,
}

impl Default for EggConfig {
    fn default() -> Self {
        Self {
            konami_ms: 8000.0,
            matrix_ms: 10000.0,
            avatar_ms: 4000.0,
            avatar_clicks: 5,
            avatar_reset_ms: 2000.0,
        }
    }
}

/// Configuration for the whole experience.
/// Every field is optional in JSON; missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    /// Fixed simulation step in seconds (default: 1/60).
    pub fixed_dt: f32,
    pub seed: u64,
    pub phases: PhaseDurations,
    pub dust: DustConfig,
    pub sea: SeaConfig,
    pub intro: IntroBubbleConfig,
    pub eggs: EggConfig,
    /// Draw instances reserved for the backdrop and the intro (default: 2048).
    /// Overlay effects get extra room on top, sized from the viewport.
    pub max_draw_instances: usize,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            seed: 42,
            phases: PhaseDurations::default(),
            dust: DustConfig::default(),
            sea: SeaConfig::default(),
            intro: IntroBubbleConfig::default(),
            eggs: EggConfig::default(),
            max_draw_instances: 2048,
        }
    }
}

impl ExperienceConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = ExperienceConfig::from_json("{}").unwrap();
        assert_eq!(config, ExperienceConfig::default());
        assert_eq!(config.phases.emergence_ms, 3000.0);
        assert_eq!(config.dust.count, 80);
    }

    #[test]
    fn partial_override() {
        let json = r#"{
            "seed": 7,
            "phases": { "convergence_ms": 500 },
            "eggs": { "avatar_clicks": 3 }
        }"#;
        let config = ExperienceConfig::from_json(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.phases.convergence_ms, 500.0);
        assert_eq!(config.phases.emergence_ms, 3000.0);
        assert_eq!(config.eggs.avatar_clicks, 3);
        assert_eq!(config.eggs.konami_ms, 8000.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ExperienceConfig::from_json("{ \"seed\": ").is_err());
    }
}
