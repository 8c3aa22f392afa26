// this_file: src/config.rs
//! Layout configuration for wallpaper rendering
//!
//! All spacing values are ratios of either the canvas dimensions or the font
//! size, so a single configuration scales across font sizes and, with the
//! device bucket multiplier, across physical screen sizes.

use crate::error::{Error, Result};
use crate::note::CompletedNotePolicy;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Target raster dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CanvasSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl CanvasSize {
    /// Create a canvas size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    /// 6.7" lock screen resolution
    fn default() -> Self {
        Self::new(1290, 2796)
    }
}

/// Font weight used for every note in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Regular,
    Medium,
    Semibold,
    Bold,
    Heavy,
}

impl FontWeight {
    /// Value on the OpenType `wght` axis
    pub fn value(self) -> f32 {
        match self {
            FontWeight::Regular => 400.0,
            FontWeight::Medium => 500.0,
            FontWeight::Semibold => 600.0,
            FontWeight::Bold => 700.0,
            FontWeight::Heavy => 800.0,
        }
    }
}

/// Physical screen size category used to nudge the top padding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceBucket {
    Small,
    Compact,
    Standard,
    Large,
}

impl DeviceBucket {
    /// Classify a physical screen height expressed in points.
    ///
    /// Returns `None` for hints that are not finite and positive.
    pub fn from_screen_height(points: f64) -> Option<Self> {
        if !points.is_finite() || points <= 0.0 {
            return None;
        }
        let bucket = if points < 700.0 {
            DeviceBucket::Small
        } else if points < 830.0 {
            DeviceBucket::Compact
        } else if points < 900.0 {
            DeviceBucket::Standard
        } else {
            DeviceBucket::Large
        };
        Some(bucket)
    }

    /// Multiplier applied to the base top padding
    pub fn top_padding_multiplier(self) -> f64 {
        match self {
            DeviceBucket::Small => 1.05,
            DeviceBucket::Compact => 1.02,
            DeviceBucket::Standard => 1.0,
            DeviceBucket::Large => 0.98,
        }
    }
}

/// Immutable layout configuration passed into every render
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Canvas dimensions
    pub canvas: CanvasSize,
    /// Largest font size the optimizer may pick
    pub max_font_size: u32,
    /// Smallest font size the optimizer may pick
    pub min_font_size: u32,
    /// Weight used for all notes
    pub font_weight: FontWeight,
    /// Top padding (fraction of canvas height) when lock screen widgets are shown
    pub top_padding_ratio_with_widgets: f64,
    /// Top padding (fraction of canvas height) without widgets
    pub top_padding_ratio_without_widgets: f64,
    /// Reserved bottom area (fraction of canvas height)
    pub bottom_safe_area_ratio: f64,
    /// Left and right padding (fraction of canvas width)
    pub horizontal_padding_ratio: f64,
    /// Extra space between wrapped lines (fraction of font size)
    pub line_spacing_ratio: f64,
    /// Space between consecutive notes (fraction of font size)
    pub note_separator_ratio: f64,
    /// Whether completed notes take part in layout
    pub completed_note_policy: CompletedNotePolicy,
    /// Opacity of the black contrast overlay drawn over photos
    pub overlay_opacity: f32,
    /// Opacity multiplier for completed notes
    pub completed_opacity: f32,
    /// Opacity of the text shadow on photo backgrounds
    pub shadow_opacity: f32,
    /// Shadow blur radius as a fraction of font size
    pub shadow_blur_ratio: f32,
    /// Shadow offset in pixels
    pub shadow_offset: (f32, f32),
    /// Backgrounds darker than this pick light text
    pub luma_threshold: f64,
    /// Side of the downsampled grid used for photo luminance sampling
    pub luma_sample_grid: u32,
    /// Portion of the canvas width sampled for photo luminance
    pub text_region_width_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            max_font_size: 140,
            min_font_size: 52,
            font_weight: FontWeight::Bold,
            top_padding_ratio_with_widgets: 0.32,
            top_padding_ratio_without_widgets: 0.24,
            bottom_safe_area_ratio: 0.10,
            horizontal_padding_ratio: 0.07,
            line_spacing_ratio: 0.12,
            note_separator_ratio: 0.35,
            completed_note_policy: CompletedNotePolicy::Exclude,
            overlay_opacity: 0.25,
            completed_opacity: 0.5,
            shadow_opacity: 0.35,
            shadow_blur_ratio: 0.08,
            shadow_offset: (0.0, 2.0),
            luma_threshold: 0.55,
            luma_sample_grid: 12,
            text_region_width_ratio: 0.75,
        }
    }
}

impl LayoutConfig {
    /// Parse a configuration from JSON and validate it.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!(
            "Loaded layout config: canvas {}x{}, font sizes {}..={}",
            config.canvas.width, config.canvas.height, config.min_font_size, config.max_font_size
        );
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Same configuration targeting a different canvas
    pub fn with_canvas(mut self, canvas: CanvasSize) -> Self {
        self.canvas = canvas;
        self
    }

    /// Same configuration with a different completed-note policy
    pub fn with_completed_note_policy(mut self, policy: CompletedNotePolicy) -> Self {
        self.completed_note_policy = policy;
        self
    }

    /// Line spacing in pixels at the given font size
    pub fn line_spacing(&self, font_size: f32) -> f32 {
        font_size * self.line_spacing_ratio as f32
    }

    /// Separator placed before every note except the first
    pub fn note_separator(&self, font_size: f32) -> f32 {
        font_size * self.note_separator_ratio as f32
    }

    /// Check that the configuration can drive a render.
    ///
    /// Ratios that add up to more than the canvas are accepted: they produce
    /// an empty safe area, which renders as background only.
    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(Error::InvalidParameter(format!(
                "Canvas dimensions must be non-zero, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        if self.min_font_size == 0 {
            return Err(Error::InvalidParameter(
                "min_font_size must be positive".into(),
            ));
        }
        if self.min_font_size > self.max_font_size {
            return Err(Error::InvalidParameter(format!(
                "min_font_size ({}) exceeds max_font_size ({})",
                self.min_font_size, self.max_font_size
            )));
        }

        let ratios = [
            ("top_padding_ratio_with_widgets", self.top_padding_ratio_with_widgets),
            ("top_padding_ratio_without_widgets", self.top_padding_ratio_without_widgets),
            ("bottom_safe_area_ratio", self.bottom_safe_area_ratio),
            ("horizontal_padding_ratio", self.horizontal_padding_ratio),
            ("line_spacing_ratio", self.line_spacing_ratio),
            ("note_separator_ratio", self.note_separator_ratio),
            ("luma_threshold", self.luma_threshold),
            ("text_region_width_ratio", self.text_region_width_ratio),
            ("shadow_blur_ratio", self.shadow_blur_ratio as f64),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, value
                )));
            }
        }

        let opacities = [
            ("overlay_opacity", self.overlay_opacity),
            ("completed_opacity", self.completed_opacity),
            ("shadow_opacity", self.shadow_opacity),
        ];
        for (name, value) in opacities {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidParameter(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if !self.shadow_offset.0.is_finite() || !self.shadow_offset.1.is_finite() {
            return Err(Error::InvalidParameter(
                "shadow_offset must be finite".into(),
            ));
        }
        if self.luma_sample_grid == 0 {
            return Err(Error::InvalidParameter(
                "luma_sample_grid must be positive".into(),
            ));
        }
        Ok(())
    }
}
