// this_file: src/font_loader.rs
//! Font loading and weight resolution

use crate::config::FontWeight;
use crate::error::{Error, Result};
use log::{debug, info, warn};
use read_fonts::FontRef;
use skrifa::instance::{Location, LocationRef};
use skrifa::{MetadataProvider, Tag};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Reads font files and checks they can be parsed.
///
/// Loaded data is handed back to the caller; the loader keeps nothing
/// between calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontLoader;

impl FontLoader {
    /// Create a new font loader
    pub fn new() -> Self {
        Self
    }

    /// Load font data from file path
    pub fn load_font_data<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Vec<u8>>> {
        let path = path.as_ref();
        info!("Loading font: {}", path.display());
        let data = fs::read(path).map_err(|e| {
            Error::Font(format!(
                "Failed to read font file {}: {}",
                path.display(),
                e
            ))
        })?;
        self.from_bytes(data)
    }

    /// Validate in-memory font data
    pub fn from_bytes(&self, data: Vec<u8>) -> Result<Arc<Vec<u8>>> {
        if data.is_empty() {
            return Err(Error::Font("Font file is empty".into()));
        }

        if !Self::is_valid_font_signature(&data) {
            return Err(Error::Font(
                "Invalid font file format (expected TTF/OTF/TTC)".into(),
            ));
        }

        FontRef::from_index(&data, 0)
            .map_err(|e| Error::Font(format!("Failed to parse font: {}", e)))?;

        debug!("Validated font data ({} bytes)", data.len());
        Ok(Arc::new(data))
    }

    /// Check if data has valid font signature
    fn is_valid_font_signature(data: &[u8]) -> bool {
        if data.len() < 4 {
            return false;
        }

        let signature = &data[0..4];
        matches!(
            signature,
            // TrueType
            b"\x00\x01\x00\x00" |
            // OpenType
            b"OTTO" |
            // TrueType Collection
            b"ttcf" |
            // Apple TrueType
            b"true"
        )
    }
}

/// A parsed font face pinned to one weight.
///
/// Variable fonts with a `wght` axis are instanced at the requested weight;
/// static fonts are used as they are.
#[derive(Clone)]
pub struct Typeface<'a> {
    data: &'a [u8],
    font: FontRef<'a>,
    weight: FontWeight,
    location: Location,
}

impl<'a> Typeface<'a> {
    /// Parse the first face in `data` at the given weight
    pub fn new(data: &'a [u8], weight: FontWeight) -> Result<Self> {
        let font = FontRef::from_index(data, 0)
            .map_err(|e| Error::Font(format!("Failed to create font reference: {}", e)))?;

        let axes = font.axes();
        let location = if axes.get_by_tag(Tag::new(b"wght")).is_some() {
            debug!("Instancing variable font at wght={}", weight.value());
            axes.location([("wght", weight.value())])
        } else {
            if weight != FontWeight::Regular {
                warn!(
                    "Font has no wght axis, ignoring requested weight {:?}",
                    weight
                );
            }
            Location::default()
        };

        Ok(Self {
            data,
            font,
            weight,
            location,
        })
    }

    /// Raw font bytes the face was parsed from
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Underlying font reference
    pub fn font(&self) -> &FontRef<'_> {
        &self.font
    }

    /// Variation location for the requested weight
    pub fn location(&self) -> LocationRef<'_> {
        LocationRef::from(&self.location)
    }

    /// Weight this face was instanced at
    pub fn weight(&self) -> FontWeight {
        self.weight
    }
}

impl std::fmt::Debug for Typeface<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("weight", &self.weight)
            .field("coords", &self.location.coords().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("testdata/fonts")
            .join(name)
    }

    #[test]
    fn test_invalid_font_signatures() {
        assert!(!FontLoader::is_valid_font_signature(b""));
        assert!(!FontLoader::is_valid_font_signature(b"ABC"));
        assert!(!FontLoader::is_valid_font_signature(b"INVALID"));
    }

    #[test]
    fn test_valid_font_signatures() {
        assert!(FontLoader::is_valid_font_signature(
            b"\x00\x01\x00\x00extra"
        ));
        assert!(FontLoader::is_valid_font_signature(b"OTTOextra"));
        assert!(FontLoader::is_valid_font_signature(b"ttcfextra"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = FontLoader::new().load_font_data("nonexistent.ttf");
        assert!(matches!(result.unwrap_err(), Error::Font(_)));
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.ttf");
        File::create(&file_path).unwrap();

        let result = FontLoader::new().load_font_data(file_path);
        assert!(matches!(result.unwrap_err(), Error::Font(_)));
    }

    #[test]
    fn test_load_invalid_font_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.ttf");
        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"This is not a font file").unwrap();

        let result = FontLoader::new().load_font_data(file_path);
        assert!(matches!(result.unwrap_err(), Error::Font(_)));
    }

    #[test]
    fn test_truncated_font_is_rejected() {
        let result = FontLoader::new().from_bytes(b"\x00\x01\x00\x00\x00".to_vec());
        assert!(matches!(result.unwrap_err(), Error::Font(_)));
    }

    #[test]
    fn test_load_fixture_and_build_typeface() {
        let data = FontLoader::new()
            .load_font_data(fixture("DejaVuSans-Bold.ttf"))
            .unwrap();
        let face = Typeface::new(&data, FontWeight::Bold).unwrap();
        assert_eq!(face.weight(), FontWeight::Bold);
        // Static font: no variation coordinates
        assert!(face.location().coords().is_empty());
        assert!(face.font().charmap().map('A').is_some());
        assert_eq!(face.data().len(), data.len());
    }
}
