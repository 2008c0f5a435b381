//! Font discovery and loading.
//!
//! A [`FontBook`] wraps a `fontdb` database. Faces are resolved from a CSS
//! `font-family` list and a numeric weight, loaded once, and cached as
//! [`FontFace`] values that can both shape (`rustybuzz`) and rasterize
//! (`fontdue`) glyphs.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Once, OnceLock, RwLock};

/// Environment variable naming an extra font directory.
pub const FONT_DIR_ENV: &str = "CVBUILDER_FONT_DIR";

/// A loaded font face.
pub struct FontFace {
    data: Arc<Vec<u8>>,
    index: u32,
    raster: fontdue::Font,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("data_len", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontFace {
    /// Parse face `index` of a font file. Returns `None` for data that
    /// neither the shaper nor the rasterizer accepts.
    pub fn from_data(data: Vec<u8>, index: u32) -> Option<Self> {
        rustybuzz::Face::from_slice(&data, index)?;
        let settings = fontdue::FontSettings {
            collection_index: index,
            ..fontdue::FontSettings::default()
        };
        let raster = match fontdue::Font::from_bytes(data.as_slice(), settings) {
            Ok(font) => font,
            Err(e) => {
                log::warn!("Failed to read glyph outlines: {}", e);
                return None;
            }
        };
        Some(Self {
            data: Arc::new(data),
            index,
            raster,
        })
    }

    /// A shaping view over the face. Cheap: only the header is parsed.
    pub fn shaping_face(&self) -> Option<rustybuzz::Face<'_>> {
        rustybuzz::Face::from_slice(&self.data, self.index)
    }

    /// Glyph rasterizer for this face.
    pub fn raster(&self) -> &fontdue::Font {
        &self.raster
    }
}

type FaceKey = (String, u16);

/// Font database plus a cache of loaded faces.
pub struct FontBook {
    db: Database,
    faces: RwLock<HashMap<FaceKey, Option<Arc<FontFace>>>>,
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook").field("faces", &self.db.len()).finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    /// An empty book.
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            faces: RwLock::new(HashMap::new()),
        }
    }

    /// The shared book of system fonts, plus [`FONT_DIR_ENV`] if set.
    pub fn system() -> Arc<FontBook> {
        static SYSTEM: OnceLock<Arc<FontBook>> = OnceLock::new();
        SYSTEM
            .get_or_init(|| {
                let mut book = FontBook::new();
                book.load_system_fonts();
                if let Ok(dir) = std::env::var(FONT_DIR_ENV) {
                    book.load_fonts_dir(dir);
                }
                log::debug!("Font book ready with {} face(s)", book.len());
                Arc::new(book)
            })
            .clone()
    }

    /// Add the platform's installed fonts.
    pub fn load_system_fonts(&mut self) {
        self.db.load_system_fonts();
        self.invalidate();
    }

    /// Add every font file under `dir`.
    pub fn load_fonts_dir<P: AsRef<Path>>(&mut self, dir: P) {
        self.db.load_fonts_dir(dir);
        self.invalidate();
    }

    /// Add a font from memory.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
        self.invalidate();
    }

    /// Number of known faces.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Whether no face is known.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    fn invalidate(&mut self) {
        if let Ok(faces) = self.faces.get_mut() {
            faces.clear();
        }
    }

    /// Resolve a face for a CSS `font-family` list and weight.
    ///
    /// Unknown families fall back to the closest upright sans-serif face,
    /// then to any upright face.
    pub fn resolve(&self, family: &str, weight: u16) -> Option<Arc<FontFace>> {
        let key = (family.to_string(), weight);
        if let Ok(faces) = self.faces.read() {
            if let Some(face) = faces.get(&key) {
                return face.clone();
            }
        }

        let face = self.load(family, weight);
        if let Ok(mut faces) = self.faces.write() {
            faces.insert(key, face.clone());
        }
        face
    }

    fn load(&self, family: &str, weight: u16) -> Option<Arc<FontFace>> {
        if self.db.is_empty() {
            static WARNED: Once = Once::new();
            WARNED.call_once(|| log::warn!("No fonts available; text will be left out of captures"));
            return None;
        }

        let mut families = parse_families(family);
        families.push(Family::SansSerif);
        let query = Query {
            families: &families,
            weight: Weight(weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query).or_else(|| self.closest_upright(weight))?;

        if let Some(info) = self.db.face(id) {
            log::debug!(
                "Resolved '{}' {} to {} ({})",
                family,
                weight,
                info.post_script_name,
                info.families.first().map(|(name, _)| name.as_str()).unwrap_or("?")
            );
        }
        self.db
            .with_face_data(id, |data, index| FontFace::from_data(data.to_vec(), index))
            .flatten()
            .map(Arc::new)
    }

    fn closest_upright(&self, weight: u16) -> Option<fontdb::ID> {
        self.db
            .faces()
            .filter(|face| face.style == Style::Normal)
            .min_by_key(|face| {
                let name = face
                    .families
                    .first()
                    .map(|(name, _)| name.as_str())
                    .unwrap_or("");
                let sans = name.contains("Sans") && !name.contains("Mono");
                (
                    !sans,
                    face.stretch != Stretch::Normal,
                    face.weight.0.abs_diff(weight),
                    name.to_string(),
                )
            })
            .map(|face| face.id)
    }
}

fn parse_families(css: &str) -> Vec<Family<'_>> {
    css.split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|name| !name.is_empty())
        .map(|name| match name {
            "sans-serif" | "system-ui" | "ui-sans-serif" => Family::SansSerif,
            "serif" | "ui-serif" => Family::Serif,
            "monospace" | "ui-monospace" => Family::Monospace,
            name => Family::Name(name),
        })
        .collect()
}
