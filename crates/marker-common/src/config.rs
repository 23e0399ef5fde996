//! Configuration for marker layout, colours, transitions and caching.
//!
//! Every field has a default, so an empty YAML/JSON document is a valid
//! configuration. Sizes in [`LayoutMetrics`] are density-independent pixels
//! and are scaled by the display density at layout time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::color::Rgb;
use crate::error::{MarkerError, MarkerResult};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub layout: LayoutMetrics,
    pub palette: Palette,
    pub transition: TransitionConfig,
    pub cache: CacheConfig,
    /// TrueType font used for label text. Without one, text is measured
    /// with estimated metrics and not drawn.
    pub font_path: Option<PathBuf>,
}

impl MarkerConfig {
    /// Load configuration from a YAML or JSON file (chosen by extension).
    pub fn from_file(path: impl AsRef<Path>) -> MarkerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MarkerError::Io(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> MarkerResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> MarkerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all sections.
    pub fn validate(&self) -> MarkerResult<()> {
        self.layout
            .validate()
            .map_err(|e| MarkerError::InvalidConfig(format!("layout: {}", e)))?;
        self.transition
            .validate()
            .map_err(|e| MarkerError::InvalidConfig(format!("transition: {}", e)))?;
        self.cache
            .validate()
            .map_err(|e| MarkerError::InvalidConfig(format!("cache: {}", e)))?;
        Ok(())
    }
}

/// Size constants for the marker layout, in density-independent pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    pub text_size: f32,
    pub padding_vertical: f32,
    pub padding_horizontal: f32,
    pub min_marker_width: f32,
    pub stroke_width: f32,
    pub counter_padding: f32,
    /// Half of the pointer's base width.
    pub pointer_half_width: f32,
    pub pointer_height: f32,
    pub icon_size: f32,
    pub icon_circle_size: f32,
    pub icon_left_padding: f32,
    pub icon_right_padding: f32,
    /// Corner radius of the bubble in raw pixels, clamped to half the
    /// bubble height when drawn.
    pub corner_radius_px: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            text_size: 12.0,
            padding_vertical: 12.0,
            padding_horizontal: 11.5,
            min_marker_width: 40.0,
            stroke_width: 1.5,
            counter_padding: 6.0,
            pointer_half_width: 7.0,
            pointer_height: 6.0,
            icon_size: 16.0,
            icon_circle_size: 24.0,
            icon_left_padding: 5.0,
            icon_right_padding: 3.0,
            corner_radius_px: 1000.0,
        }
    }
}

impl LayoutMetrics {
    /// Convert every dp measurement to pixels for the given density.
    pub fn scaled(&self, density: f32) -> LayoutMetrics {
        LayoutMetrics {
            text_size: self.text_size * density,
            padding_vertical: self.padding_vertical * density,
            padding_horizontal: self.padding_horizontal * density,
            min_marker_width: self.min_marker_width * density,
            stroke_width: self.stroke_width * density,
            counter_padding: self.counter_padding * density,
            pointer_half_width: self.pointer_half_width * density,
            pointer_height: self.pointer_height * density,
            icon_size: self.icon_size * density,
            icon_circle_size: self.icon_circle_size * density,
            icon_left_padding: self.icon_left_padding * density,
            icon_right_padding: self.icon_right_padding * density,
            corner_radius_px: self.corner_radius_px,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("text_size", self.text_size),
            ("min_marker_width", self.min_marker_width),
            ("stroke_width", self.stroke_width),
            ("icon_size", self.icon_size),
            ("icon_circle_size", self.icon_circle_size),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(format!("{} must be positive, got {}", name, value));
            }
        }
        if self.icon_size > self.icon_circle_size {
            return Err("icon_size must not exceed icon_circle_size".to_string());
        }
        Ok(())
    }
}

/// Colours applied for one marker state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateColors {
    pub marker: Rgb,
    pub text: Rgb,
    pub stroke: Rgb,
    pub icon_circle: Rgb,
    pub counter_bubble: Rgb,
}

/// Icon colours used by the special variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecialColors {
    pub icon_circle: Rgb,
    pub icon: Rgb,
}

/// Full marker palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub default: StateColors,
    pub visualized: StateColors,
    pub selected: StateColors,
    pub special: SpecialColors,
    pub icon: Rgb,
    pub counter_text: Rgb,
    pub counter_stroke: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        let default_stroke = Rgb::new(217, 219, 208);
        Self {
            default: StateColors {
                marker: Rgb::WHITE,
                text: Rgb::BLACK,
                stroke: default_stroke,
                icon_circle: Rgb::new(248, 249, 245),
                counter_bubble: Rgb::new(235, 237, 230),
            },
            visualized: StateColors {
                marker: Rgb::new(217, 219, 208),
                text: Rgb::BLACK,
                stroke: Rgb::new(197, 201, 186),
                icon_circle: Rgb::WHITE,
                counter_bubble: Rgb::new(248, 249, 245),
            },
            selected: StateColors {
                marker: Rgb::new(57, 87, 189),
                text: Rgb::WHITE,
                stroke: default_stroke,
                icon_circle: Rgb::WHITE,
                counter_bubble: Rgb::new(248, 249, 245),
            },
            special: SpecialColors {
                icon_circle: Rgb::new(240, 243, 255),
                icon: Rgb::new(57, 87, 189),
            },
            icon: Rgb::BLACK,
            counter_text: Rgb::BLACK,
            counter_stroke: default_stroke,
        }
    }
}

/// Tunables for the frame-sequenced transition choreography.
///
/// The defaults were tuned against a compositor that needs a few
/// overlapping instances to hide swap latency; other surfaces may need
/// different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub duration_ms: u64,
    /// Upper bound on frames generated per second of transition.
    pub max_frame_rate: f32,
    /// Number of simultaneously live instances during a transition.
    pub queue_depth: usize,
    /// Delay between the final frame and retiring the extra instances.
    pub settle_delay_ms: u64,
    /// Total z-index distance covered by the frames of one transition.
    pub z_span: f32,
    /// Alpha fade duration when markers are added or removed.
    pub fade_duration_ms: u64,
    pub fades_enabled: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 400,
            max_frame_rate: 30.0,
            queue_depth: 3,
            settle_delay_ms: 100,
            z_span: 1.0,
            fade_duration_ms: 100,
            fades_enabled: false,
        }
    }
}

impl TransitionConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    /// Number of interpolated frames for a display refreshing at `refresh_hz`.
    pub fn frame_count(&self, refresh_hz: f32) -> usize {
        let rate = if refresh_hz > 0.0 {
            refresh_hz.min(self.max_frame_rate)
        } else {
            self.max_frame_rate
        };
        let frames = (self.duration().as_secs_f32() * rate).round() as usize;
        frames.max(2)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.duration_ms == 0 {
            return Err("duration_ms must be positive".to_string());
        }
        if !(self.max_frame_rate > 0.0) {
            return Err("max_frame_rate must be positive".to_string());
        }
        if self.queue_depth < 2 {
            return Err(format!("queue_depth must be at least 2, got {}", self.queue_depth));
        }
        if !(self.z_span > 0.0) {
            return Err("z_span must be positive".to_string());
        }
        Ok(())
    }
}

/// Raster cache sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Conservative ceiling on process memory, in megabytes.
    pub memory_ceiling_mb: u64,
    /// Fraction of the ceiling given to cached rasters.
    pub budget_fraction: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            memory_ceiling_mb: 256,
            budget_fraction: 0.125,
        }
    }
}

impl CacheConfig {
    /// Byte budget derived from the memory ceiling.
    pub fn max_bytes(&self) -> u64 {
        (self.memory_ceiling_mb.saturating_mul(1024 * 1024) as f64 * self.budget_fraction) as u64
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.budget_fraction > 0.0 && self.budget_fraction <= 1.0) {
            return Err(format!(
                "budget_fraction must be in (0, 1], got {}",
                self.budget_fraction
            ));
        }
        Ok(())
    }
}
