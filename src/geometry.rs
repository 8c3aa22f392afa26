// this_file: src/geometry.rs
//! Safe-area geometry derived from canvas proportions

use crate::config::{CanvasSize, DeviceBucket, LayoutConfig};
use log::debug;

/// Rectangle of the canvas reserved for notes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeArea {
    /// Space above the notes (clock and widgets)
    pub top_padding: f32,
    /// Space below the notes (lock screen buttons, home indicator)
    pub bottom_safe_area: f32,
    /// Left and right margin
    pub horizontal_padding: f32,
    /// Vertical budget for notes, never negative
    pub available_height: f32,
    /// Wrapping width for note text, never negative
    pub text_max_width: f32,
}

/// Compute the safe area for a canvas.
///
/// `device_height_hint` is the physical screen height in points; `None` or an
/// unusable value leaves the base top padding unadjusted.
pub fn resolve(
    canvas: CanvasSize,
    has_overlay_widgets: bool,
    device_height_hint: Option<f64>,
    config: &LayoutConfig,
) -> SafeArea {
    let height = canvas.height as f64;
    let width = canvas.width as f64;

    let base_ratio = if has_overlay_widgets {
        config.top_padding_ratio_with_widgets
    } else {
        config.top_padding_ratio_without_widgets
    };
    let multiplier = device_height_hint
        .and_then(DeviceBucket::from_screen_height)
        .map(DeviceBucket::top_padding_multiplier)
        .unwrap_or(1.0);

    let top_padding = height * base_ratio * multiplier;
    let bottom_safe_area = height * config.bottom_safe_area_ratio;
    let horizontal_padding = width * config.horizontal_padding_ratio;

    let available_height = (height - top_padding - bottom_safe_area).max(0.0);
    let text_max_width = (width - 2.0 * horizontal_padding).max(0.0);

    debug!(
        "Safe area: top={:.1} bottom={:.1} available={:.1}x{:.1} (widgets={}, multiplier={})",
        top_padding, bottom_safe_area, text_max_width, available_height, has_overlay_widgets, multiplier
    );

    SafeArea {
        top_padding: top_padding as f32,
        bottom_safe_area: bottom_safe_area as f32,
        horizontal_padding: horizontal_padding as f32,
        available_height: available_height as f32,
        text_max_width: text_max_width as f32,
    }
}
