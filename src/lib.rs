// this_file: src/lib.rs
//! Wallnote - adaptive lock-screen wallpaper rendering for text notes
//!
//! This library provides functionality for:
//! - Proportional safe-area geometry with device-size adjustment
//! - Font loading via skrifa, shaping via rustybuzz, wrapping and block measurement
//! - Binary search for the largest font size that fits every note
//! - Background compositing with cover-scaled photos
//! - Luminance-based text tone selection
//! - CPU text rasterization with zeno, including shadows and strikethrough

pub mod background;
pub mod color;
pub mod config;
pub mod error;
pub mod font_loader;
pub mod geometry;
pub mod logging;
pub mod measure;
pub mod note;
pub mod optimizer;
pub mod rasterize;
pub mod renderer;
pub mod shaping;
pub mod styled_text;

// Re-export commonly used types
pub use background::{cover_geometry, Background, BackgroundCompositor, CoverFit};
pub use color::{Color, ColorSelector, TextTone};
pub use config::{CanvasSize, DeviceBucket, FontWeight, LayoutConfig};
pub use error::{Error, Result};
pub use font_loader::{FontLoader, Typeface};
pub use geometry::SafeArea;
pub use measure::{FixedAdvanceMeasurer, FontMeasurer, TextMeasurer};
pub use note::{CompletedNotePolicy, Note};
pub use optimizer::{FitResult, FontSizeOptimizer};
pub use renderer::{Wallpaper, WallpaperLayout, WallpaperRenderer};
pub use styled_text::{ShadowSpec, StyledRun, StyledTextBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
