// this_file: src/optimizer.rs
//! Font-size search
//!
//! Finds the largest integer font size in `[min_font_size, max_font_size]` at
//! which every eligible note fits the safe area. Taller text at larger sizes
//! makes the fit predicate monotonic, so a binary search over the size range
//! is exact. When nothing fits even at the minimum size, the minimum is used
//! and the visible notes are truncated to the prefix that fits.

use crate::config::LayoutConfig;
use crate::measure::TextMeasurer;
use crate::note::Note;
use log::{debug, trace};

/// Outcome of fitting a note sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitResult {
    /// Chosen font size in pixels
    pub font_size: u32,
    /// Length of the visible prefix
    pub visible: usize,
}

/// Binary search over font sizes against a text measurer
pub struct FontSizeOptimizer<'c, M> {
    measurer: M,
    available_height: f32,
    text_max_width: f32,
    config: &'c LayoutConfig,
}

impl<'c, M: TextMeasurer> FontSizeOptimizer<'c, M> {
    /// Create an optimizer for one safe area
    pub fn new(
        measurer: M,
        available_height: f32,
        text_max_width: f32,
        config: &'c LayoutConfig,
    ) -> Self {
        Self {
            measurer,
            available_height,
            text_max_width,
            config,
        }
    }

    /// Height of the note at `index` including the separator above it
    fn note_height(&self, index: usize, note: &Note, font_size: f32) -> f32 {
        let separator = if index > 0 {
            self.config.note_separator(font_size)
        } else {
            0.0
        };
        let block = self.measurer.measure(
            &note.text,
            font_size,
            self.text_max_width,
            self.config.line_spacing(font_size),
        );
        block + separator
    }

    /// True when every note fits the available height at `font_size`
    pub fn fits(&self, notes: &[&Note], font_size: u32) -> bool {
        if self.available_height <= 0.0 {
            return notes.is_empty();
        }
        let size = font_size as f32;
        let mut total = 0.0;
        for (index, note) in notes.iter().enumerate() {
            total += self.note_height(index, note, size);
            if total > self.available_height {
                return false;
            }
        }
        true
    }

    /// Largest size at which all notes fit, or the minimum size if none does
    pub fn optimal_font_size(&self, notes: &[&Note]) -> u32 {
        let min = self.config.min_font_size;
        let max = self.config.max_font_size;

        if self.fits(notes, max) {
            debug!("All {} notes fit at max size {}", notes.len(), max);
            return max;
        }

        let mut low = min;
        let mut high = max;
        let mut best = None;

        while low <= high {
            let mid = low + (high - low) / 2;
            let fits = self.fits(notes, mid);
            if cfg!(debug_assertions) {
                trace!("Trying size {} -> fits={}", mid, fits);
            }
            if fits {
                best = Some(mid);
                low = mid + 1;
            } else {
                if mid == 0 {
                    break;
                }
                high = mid - 1;
            }
        }

        let size = best.unwrap_or(min);
        debug!(
            "Optimal font size {} for {} notes (fit found: {})",
            size,
            notes.len(),
            best.is_some()
        );
        size
    }

    /// Length of the longest prefix of `notes` that fits at `font_size`
    pub fn notes_to_show(&self, notes: &[&Note], font_size: u32) -> usize {
        if self.available_height <= 0.0 {
            return 0;
        }
        let size = font_size as f32;
        let mut total = 0.0;
        for (index, note) in notes.iter().enumerate() {
            total += self.note_height(index, note, size);
            if total > self.available_height {
                debug!(
                    "Truncating at note {} of {} (height {:.1} > {:.1})",
                    index,
                    notes.len(),
                    total,
                    self.available_height
                );
                return index;
            }
        }
        notes.len()
    }

    /// Font size and visible prefix in one pass
    pub fn fit(&self, notes: &[&Note]) -> FitResult {
        let font_size = self.optimal_font_size(notes);
        FitResult {
            font_size,
            visible: self.notes_to_show(notes, font_size),
        }
    }
}
