use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read character config {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse character config at {location}: {message}")]
    Parse { location: String, message: String },
    #[error("invalid character config value at {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Every tunable the controller reads. Built once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    pub screen_width: f32,
    pub ground_y: f32,
    pub start_x: f32,
    pub speeds: SpeedConfig,
    pub frame_ticks: FrameTickConfig,
    pub jump: JumpConfig,
    pub dash: DashConfig,
    pub special: SpecialConfig,
    pub victory: VictoryConfig,
    pub script: ScriptConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            ground_y: 450.0,
            start_x: 400.0,
            speeds: SpeedConfig::default(),
            frame_ticks: FrameTickConfig::default(),
            jump: JumpConfig::default(),
            dash: DashConfig::default(),
            special: SpecialConfig::default(),
            victory: VictoryConfig::default(),
            script: ScriptConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeedConfig {
    pub walk: f32,
    pub run: f32,
    pub crouch_walk: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            walk: 1.5,
            run: 3.5,
            crouch_walk: 0.8,
        }
    }
}

/// Ticks spent on each frame for the fixed-rate policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameTickConfig {
    pub locomotion: u32,
    pub crouch: u32,
    pub jump: u32,
    pub attack: u32,
    pub victory: u32,
    pub script: u32,
}

impl Default for FrameTickConfig {
    fn default() -> Self {
        Self {
            locomotion: 10,
            crouch: 10,
            jump: 7,
            attack: 4,
            victory: 8,
            script: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JumpConfig {
    pub height: f32,
    pub duration_ticks: u32,
    pub air_speed: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            height: 120.0,
            duration_ticks: 42,
            air_speed: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashConfig {
    pub windup_ms: u64,
    pub windup_frames: usize,
    pub active_ticks_per_frame: u32,
    pub speed: f32,
    pub cue: String,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            windup_ms: 250,
            windup_frames: 3,
            active_ticks_per_frame: 3,
            speed: 9.0,
            cue: "dash_whoosh".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecialConfig {
    pub ticks_per_frame: u32,
    pub slow_frames: Vec<usize>,
    pub slow_ticks_per_frame: u32,
    pub trigger_frame: usize,
    pub background_ms: u64,
    pub cue: String,
    pub fullscreen_frames: Vec<usize>,
}

impl Default for SpecialConfig {
    fn default() -> Self {
        Self {
            ticks_per_frame: 5,
            slow_frames: vec![6, 7],
            slow_ticks_per_frame: 24,
            trigger_frame: 5,
            background_ms: 1500,
            cue: "special_impact".to_string(),
            fullscreen_frames: vec![6, 7],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VictoryConfig {
    pub cue: String,
    pub exit_grace_ms: u64,
}

impl Default for VictoryConfig {
    fn default() -> Self {
        Self {
            cue: "victory_fanfare".to_string(),
            exit_grace_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptConfig {
    pub fade_in_ms: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self { fade_in_ms: 600 }
    }
}

impl ControllerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config = match serde_path_to_error::deserialize::<_, ControllerConfig>(&mut deserializer)
        {
            Ok(config) => config,
            Err(error) => {
                let location = error.path().to_string();
                let source = error.into_inner();
                return Err(ConfigError::Parse {
                    location: if location.is_empty() {
                        ".".to_string()
                    } else {
                        location
                    },
                    message: source.to_string(),
                });
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_finite("screen_width", self.screen_width)?;
        finite("ground_y", self.ground_y)?;
        finite("start_x", self.start_x)?;
        non_negative_finite("speeds.walk", self.speeds.walk)?;
        non_negative_finite("speeds.run", self.speeds.run)?;
        non_negative_finite("speeds.crouch_walk", self.speeds.crouch_walk)?;
        non_zero("frame_ticks.locomotion", self.frame_ticks.locomotion)?;
        non_zero("frame_ticks.crouch", self.frame_ticks.crouch)?;
        non_zero("frame_ticks.jump", self.frame_ticks.jump)?;
        non_zero("frame_ticks.attack", self.frame_ticks.attack)?;
        non_zero("frame_ticks.victory", self.frame_ticks.victory)?;
        non_zero("frame_ticks.script", self.frame_ticks.script)?;
        non_negative_finite("jump.height", self.jump.height)?;
        non_zero("jump.duration_ticks", self.jump.duration_ticks)?;
        non_negative_finite("jump.air_speed", self.jump.air_speed)?;
        non_zero("dash.windup_ms", self.dash.windup_ms)?;
        non_zero("dash.windup_frames", self.dash.windup_frames)?;
        non_zero("dash.active_ticks_per_frame", self.dash.active_ticks_per_frame)?;
        non_negative_finite("dash.speed", self.dash.speed)?;
        non_empty("dash.cue", &self.dash.cue)?;
        non_zero("special.ticks_per_frame", self.special.ticks_per_frame)?;
        non_zero("special.slow_ticks_per_frame", self.special.slow_ticks_per_frame)?;
        non_zero("special.background_ms", self.special.background_ms)?;
        non_empty("special.cue", &self.special.cue)?;
        non_empty("victory.cue", &self.victory.cue)?;
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("expected finite number, got {value}")))
    }
}

fn positive_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected positive number, got {value}")))
    }
}

fn non_negative_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected non-negative number, got {value}")))
    }
}

fn non_zero<T>(field: &'static str, value: T) -> Result<(), ConfigError>
where
    T: PartialEq + Default,
{
    if value != T::default() {
        Ok(())
    } else {
        Err(invalid(field, "expected non-zero value"))
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(invalid(field, "expected non-empty cue id"))
    } else {
        Ok(())
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_validate() {
        ControllerConfig::default()
            .validate()
            .expect("defaults are valid");
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config = ControllerConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = ControllerConfig::from_json_str(r#"{"speeds":{"run":5.0}}"#).expect("parse");
        assert_eq!(config.speeds.run, 5.0);
        assert_eq!(config.speeds.walk, SpeedConfig::default().walk);
    }

    #[test]
    fn unknown_field_reports_path() {
        let error = ControllerConfig::from_json_str(r#"{"jump":{"hieght":3.0}}"#)
            .expect_err("unknown field");
        match error {
            ConfigError::Parse { location, message } => {
                assert!(location.starts_with("jump"), "location={location}");
                assert!(message.contains("hieght"), "message={message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_type_reports_nested_path() {
        let error = ControllerConfig::from_json_str(r#"{"dash":{"windup_ms":"slow"}}"#)
            .expect_err("bad type");
        match error {
            ConfigError::Parse { location, .. } => assert_eq!(location, "dash.windup_ms"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_frame_ticks_are_rejected() {
        let error = ControllerConfig::from_json_str(r#"{"frame_ticks":{"attack":0}}"#)
            .expect_err("zero ticks");
        match error {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "frame_ticks.attack"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_screen_width_is_rejected() {
        let config = ControllerConfig {
            screen_width: -1.0,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "screen_width",
                ..
            })
        ));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"screen_width": 640.0, "victory": {{"exit_grace_ms": 10}}}}"#)
            .expect("write");
        let config = ControllerConfig::load(file.path()).expect("load");
        assert_eq!(config.screen_width, 640.0);
        assert_eq!(config.victory.exit_grace_ms, 10);
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = ControllerConfig::load(&dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(error, ConfigError::ReadFile { .. }));
    }
}
