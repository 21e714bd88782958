//! Landing configuration (window, sequence timing, orbit controls). Loaded from config.ron at startup.

use procgen::StarFieldConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings read from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Start in borderless fullscreen.
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub sequence: SequenceConfig,
    #[serde(default)]
    pub orbit: OrbitConfig,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            fullscreen: false,
            sequence: SequenceConfig::default(),
            orbit: OrbitConfig::default(),
        }
    }
}

impl LandingConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match Self::parse(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("config.ron")
}

/// Timing, star field, planet and overlay text of the cinematic. Durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub loading_delay_ms: u64,
    pub travel_duration_ms: u64,
    /// Camera z at the end of travel.
    pub travel_distance: f32,
    pub planet_position: [f32; 3],
    pub planet_radius: f32,
    pub planet_detail: u32,
    /// Planet clock speed, per second.
    pub planet_time_rate: f32,
    /// Planet clock speed while the camera pushes into it.
    pub planet_push_time_rate: f32,
    pub star_count: usize,
    pub star_spread: f32,
    /// Per-frame star movement during travel.
    pub star_step: f32,
    pub star_forward_limit: f32,
    pub star_far_reset: f32,
    pub star_seed: u64,
    pub planet_name: String,
    pub countdown_from: u32,
    pub countdown_interval_ms: u64,
    pub prompt_delay_ms: u64,
    pub prompt_text: String,
    pub type_interval_ms: u64,
    pub enter_duration_ms: u64,
    /// Where the camera settles in the room, and what it looks at.
    pub room_eye: [f32; 3],
    pub room_target: [f32; 3],
    pub header_text: String,
    pub clock_interval_ms: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        let stars = StarFieldConfig::default();
        Self {
            loading_delay_ms: 3000,
            travel_duration_ms: 5000,
            travel_distance: 80.0,
            planet_position: [0.0, 0.0, 100.0],
            planet_radius: 8.0,
            planet_detail: 4,
            planet_time_rate: 0.9,
            planet_push_time_rate: 9.0,
            star_count: stars.count,
            star_spread: stars.spread,
            star_step: stars.step,
            star_forward_limit: stars.forward_limit,
            star_far_reset: stars.far_reset,
            star_seed: stars.seed,
            planet_name: "Nife".to_string(),
            countdown_from: 3,
            countdown_interval_ms: 1500,
            prompt_delay_ms: 500,
            prompt_text: "click anywhere to start".to_string(),
            type_interval_ms: 100,
            enter_duration_ms: 4000,
            room_eye: [0.0, 5.0, 15.0],
            room_target: [0.0, 3.0, 0.0],
            header_text: "PORTFOLIO".to_string(),
            clock_interval_ms: 1000,
        }
    }
}

impl SequenceConfig {
    pub fn loading_delay(&self) -> Duration {
        Duration::from_millis(self.loading_delay_ms)
    }

    pub fn travel_duration(&self) -> Duration {
        Duration::from_millis(self.travel_duration_ms)
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn prompt_delay(&self) -> Duration {
        Duration::from_millis(self.prompt_delay_ms)
    }

    pub fn type_interval(&self) -> Duration {
        Duration::from_millis(self.type_interval_ms)
    }

    pub fn enter_duration(&self) -> Duration {
        Duration::from_millis(self.enter_duration_ms)
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms)
    }

    pub fn star_field(&self) -> StarFieldConfig {
        StarFieldConfig {
            count: self.star_count,
            spread: self.star_spread,
            step: self.star_step,
            forward_limit: self.star_forward_limit,
            far_reset: self.star_far_reset,
            seed: self.star_seed,
        }
    }
}

/// Room orbit controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Fraction of the pending rotation applied each frame.
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_pan: bool,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            min_distance: 8.0,
            max_distance: 30.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enable_pan: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = LandingConfig::parse("()").unwrap();
        assert_eq!(config.window_width, 1280);
        assert!(config.vsync);
        assert_eq!(config.sequence, SequenceConfig::default());
        assert!(!config.orbit.enable_pan);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = LandingConfig::parse(
            "(window_width: 1920, sequence: (travel_duration_ms: 2000, star_count: 10000), orbit: (enable_pan: true))",
        )
        .unwrap();
        assert_eq!(config.window_width, 1920);
        assert_eq!(config.window_height, 720);
        assert_eq!(config.sequence.travel_duration(), Duration::from_millis(2000));
        assert_eq!(config.sequence.star_field().count, 10_000);
        assert_eq!(config.sequence.loading_delay(), Duration::from_millis(3000));
        assert!(config.orbit.enable_pan);
        assert_eq!(config.orbit.min_distance, 8.0);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(LandingConfig::parse("(window_width: \"wide\")").is_err());
    }

    #[test]
    fn defaults_match_the_cinematic() {
        let seq = SequenceConfig::default();
        assert_eq!(seq.star_count, 15_000);
        assert_eq!(seq.countdown_from, 3);
        assert_eq!(seq.prompt_text.chars().count(), 23);
        assert_eq!(seq.planet_position, [0.0, 0.0, 100.0]);
    }
}
