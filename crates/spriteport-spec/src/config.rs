//! Importer configuration model.
//!
//! One [`ImporterConfiguration`] lives for the whole session. The caller owns
//! it (usually inside a [`ConfigSession`]) and passes a shared reference into
//! every pipeline call; the pipeline never mutates it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::error::BackendError;
use crate::rules::NonLoopingRules;

/// Default timeout for one tool invocation.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 120;

/// Default pixels per world unit.
pub const DEFAULT_PIXELS_PER_UNIT: f32 = 100.0;

/// Default clip sample rate.
pub const DEFAULT_CLIP_FRAME_RATE: f32 = 60.0;

/// Default argument template for the external tool.
///
/// `{input}`, `{sheet}` and `{data}` are substituted by the orchestrator. Any
/// other brace group (`{title}`, `{tag}`, `{frame}`) is passed through for the
/// tool to expand.
pub fn default_tool_args() -> Vec<String> {
    [
        "--batch",
        "{input}",
        "--sheet",
        "{sheet}",
        "--data",
        "{data}",
        "--format",
        "json-array",
        "--list-tags",
        "--filename-format",
        "{title}_{tag}_{frame}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Errors from configuration edits and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl BackendError for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            ConfigError::UnknownKey(_) => "CONFIG_001",
            ConfigError::InvalidValue { .. } => "CONFIG_002",
        }
    }

    fn category(&self) -> &'static str {
        "config"
    }
}

/// Which component the generated clips animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetObjectKind {
    /// A world-space sprite renderer.
    #[default]
    SpriteRenderer,
    /// A UI image.
    Image,
}

impl TargetObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetObjectKind::SpriteRenderer => "sprite_renderer",
            TargetObjectKind::Image => "image",
        }
    }

    /// Component type name the clip binds to.
    pub fn component(&self) -> &'static str {
        match self {
            TargetObjectKind::SpriteRenderer => "SpriteRenderer",
            TargetObjectKind::Image => "Image",
        }
    }
}

impl FromStr for TargetObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "sprite_renderer" | "spriterenderer" => Ok(TargetObjectKind::SpriteRenderer),
            "image" | "ui_image" => Ok(TargetObjectKind::Image),
            _ => Err("expected one of: sprite_renderer, image".to_string()),
        }
    }
}

/// Sprite pivot placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpriteAlignment {
    #[default]
    Center,
    TopLeft,
    TopCenter,
    TopRight,
    LeftCenter,
    RightCenter,
    BottomLeft,
    BottomCenter,
    BottomRight,
    /// Use [`ImporterConfiguration::custom_pivot`].
    Custom,
}

impl SpriteAlignment {
    pub const ALL: [SpriteAlignment; 10] = [
        SpriteAlignment::Center,
        SpriteAlignment::TopLeft,
        SpriteAlignment::TopCenter,
        SpriteAlignment::TopRight,
        SpriteAlignment::LeftCenter,
        SpriteAlignment::RightCenter,
        SpriteAlignment::BottomLeft,
        SpriteAlignment::BottomCenter,
        SpriteAlignment::BottomRight,
        SpriteAlignment::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpriteAlignment::Center => "center",
            SpriteAlignment::TopLeft => "top_left",
            SpriteAlignment::TopCenter => "top_center",
            SpriteAlignment::TopRight => "top_right",
            SpriteAlignment::LeftCenter => "left_center",
            SpriteAlignment::RightCenter => "right_center",
            SpriteAlignment::BottomLeft => "bottom_left",
            SpriteAlignment::BottomCenter => "bottom_center",
            SpriteAlignment::BottomRight => "bottom_right",
            SpriteAlignment::Custom => "custom",
        }
    }

    /// Normalized pivot, x to the right and y up from the bottom-left corner.
    ///
    /// Returns `None` for [`SpriteAlignment::Custom`].
    pub fn pivot(&self) -> Option<[f32; 2]> {
        let pivot = match self {
            SpriteAlignment::Center => [0.5, 0.5],
            SpriteAlignment::TopLeft => [0.0, 1.0],
            SpriteAlignment::TopCenter => [0.5, 1.0],
            SpriteAlignment::TopRight => [1.0, 1.0],
            SpriteAlignment::LeftCenter => [0.0, 0.5],
            SpriteAlignment::RightCenter => [1.0, 0.5],
            SpriteAlignment::BottomLeft => [0.0, 0.0],
            SpriteAlignment::BottomCenter => [0.5, 0.0],
            SpriteAlignment::BottomRight => [1.0, 0.0],
            SpriteAlignment::Custom => return None,
        };
        Some(pivot)
    }
}

impl FromStr for SpriteAlignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        SpriteAlignment::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == key)
            .ok_or_else(|| {
                let names: Vec<&str> = SpriteAlignment::ALL.iter().map(|a| a.as_str()).collect();
                format!("expected one of: {}", names.join(", "))
            })
    }
}

/// Custom pivot used when alignment is [`SpriteAlignment::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomPivot {
    pub x: f32,
    pub y: f32,
}

impl Default for CustomPivot {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

/// External tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Explicit executable path. When unset the tool is searched for.
    pub path: Option<PathBuf>,
    /// Argument template (see [`default_tool_args`]).
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            path: None,
            args: default_tool_args(),
            timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

/// All user-editable importer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfiguration {
    pub tool: ToolSettings,
    pub target_object_kind: TargetObjectKind,
    pub sprite_alignment: SpriteAlignment,
    pub custom_pivot: CustomPivot,
    pub pixels_per_unit: f32,
    /// Samples per second of generated clips.
    pub clip_frame_rate: f32,
    pub save_sprites_to_subfolder: bool,
    pub save_animations_to_subfolder: bool,
    /// Also look for `<name>.controller.json` below the source directory when
    /// none sits beside the source.
    pub automatic_controller_discovery: bool,
    pub non_looping_rules: NonLoopingRules,
}

impl Default for ImporterConfiguration {
    fn default() -> Self {
        Self {
            tool: ToolSettings::default(),
            target_object_kind: TargetObjectKind::default(),
            sprite_alignment: SpriteAlignment::default(),
            custom_pivot: CustomPivot::default(),
            pixels_per_unit: DEFAULT_PIXELS_PER_UNIT,
            clip_frame_rate: DEFAULT_CLIP_FRAME_RATE,
            save_sprites_to_subfolder: true,
            save_animations_to_subfolder: true,
            automatic_controller_discovery: false,
            non_looping_rules: NonLoopingRules::new(),
        }
    }
}

/// Keys accepted by [`ImporterConfiguration::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "tool_path",
    "tool_timeout_secs",
    "target_object_kind",
    "sprite_alignment",
    "custom_pivot_x",
    "custom_pivot_y",
    "pixels_per_unit",
    "clip_frame_rate",
    "save_sprites_to_subfolder",
    "save_animations_to_subfolder",
    "automatic_controller_discovery",
];

impl ImporterConfiguration {
    /// Effective pivot for the configured alignment, clamped to [0, 1].
    pub fn pivot(&self) -> [f32; 2] {
        let [x, y] = self
            .sprite_alignment
            .pivot()
            .unwrap_or([self.custom_pivot.x, self.custom_pivot.y]);
        [clamp_unit(x), clamp_unit(y)]
    }

    /// Checks value ranges. Returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if !(self.pixels_per_unit.is_finite() && self.pixels_per_unit > 0.0) {
            errors.push(ConfigError::invalid(
                "pixels_per_unit",
                &self.pixels_per_unit.to_string(),
                "must be a positive number",
            ));
        }
        if !(self.clip_frame_rate.is_finite() && self.clip_frame_rate > 0.0) {
            errors.push(ConfigError::invalid(
                "clip_frame_rate",
                &self.clip_frame_rate.to_string(),
                "must be a positive number",
            ));
        }
        if self.sprite_alignment == SpriteAlignment::Custom {
            for (key, v) in [
                ("custom_pivot_x", self.custom_pivot.x),
                ("custom_pivot_y", self.custom_pivot.y),
            ] {
                if !(0.0..=1.0).contains(&v) {
                    errors.push(ConfigError::invalid(key, &v.to_string(), "must be in [0, 1]"));
                }
            }
        }
        if self.tool.timeout_secs == 0 {
            errors.push(ConfigError::invalid(
                "tool_timeout_secs",
                "0",
                "must be at least 1",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Sets a single value from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "tool_path" => {
                self.tool.path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "tool_timeout_secs" => self.tool.timeout_secs = parse_value(key, value)?,
            "target_object_kind" => {
                self.target_object_kind = value
                    .parse()
                    .map_err(|reason: String| ConfigError::invalid(key, value, reason))?
            }
            "sprite_alignment" => {
                self.sprite_alignment = value
                    .parse()
                    .map_err(|reason: String| ConfigError::invalid(key, value, reason))?
            }
            "custom_pivot_x" => self.custom_pivot.x = parse_unit(key, value)?,
            "custom_pivot_y" => self.custom_pivot.y = parse_unit(key, value)?,
            "pixels_per_unit" => self.pixels_per_unit = parse_positive(key, value)?,
            "clip_frame_rate" => self.clip_frame_rate = parse_positive(key, value)?,
            "save_sprites_to_subfolder" => self.save_sprites_to_subfolder = parse_value(key, value)?,
            "save_animations_to_subfolder" => {
                self.save_animations_to_subfolder = parse_value(key, value)?
            }
            "automatic_controller_discovery" => {
                self.automatic_controller_discovery = parse_value(key, value)?
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// Holds the session's configuration and tracks unsaved edits.
///
/// Edits go through [`ConfigSession::edit`] (or explicit
/// [`ConfigSession::mark_dirty`]); whoever persists the configuration checks
/// [`ConfigSession::is_dirty`] and calls [`ConfigSession::mark_clean`] once
/// saved.
#[derive(Debug, Clone, Default)]
pub struct ConfigSession {
    config: ImporterConfiguration,
    dirty: bool,
}

impl ConfigSession {
    pub fn new(config: ImporterConfiguration) -> Self {
        Self {
            config,
            dirty: false,
        }
    }

    pub fn config(&self) -> &ImporterConfiguration {
        &self.config
    }

    /// Applies an edit and marks the session dirty when it returns `Ok`.
    pub fn edit<T, E>(
        &mut self,
        f: impl FnOnce(&mut ImporterConfiguration) -> Result<T, E>,
    ) -> Result<T, E> {
        let value = f(&mut self.config)?;
        self.mark_dirty();
        Ok(value)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn into_inner(self) -> ImporterConfiguration {
        self.config
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.5
    } else {
        v.clamp(0.0, 1.0)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, value, e.to_string()))
}

fn parse_positive(key: &str, value: &str) -> Result<f32, ConfigError> {
    let v: f32 = parse_value(key, value)?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(ConfigError::invalid(key, value, "must be a positive number"))
    }
}

fn parse_unit(key: &str, value: &str) -> Result<f32, ConfigError> {
    let v: f32 = parse_value(key, value)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(ConfigError::invalid(key, value, "must be in [0, 1]"))
    }
}
