use std::path::PathBuf;

use anyhow::Context;

use crate::foundation::error::{CardError, CardResult};
use crate::layout::plan::{WEIGHT_BOLD, WEIGHT_NORMAL};

/// A font file to register at startup, with optional overrides for how it is addressed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FontDescriptor {
    pub path: PathBuf,
    #[serde(default)]
    pub options: FontOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FontOptions {
    /// Family alias; defaults to the family name stored in the font.
    #[serde(default)]
    pub family: Option<String>,
    /// `normal`, `bold` or a numeric weight such as `300`.
    #[serde(default)]
    pub weight: Option<String>,
    /// `normal` or `italic`.
    #[serde(default)]
    pub style: Option<String>,
}

/// A registered font face: shared font data plus the attributes used to pick it.
///
/// The blob handles are built once at load time; cloning a face never copies font bytes.
#[derive(Clone)]
pub struct FontFace {
    pub family: String,
    /// Name embedded in the font file.
    pub native_family: String,
    pub weight: u16,
    pub italic: bool,
    pub(crate) blob: parley::fontique::Blob<u8>,
    pub(crate) draw_font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("native_family", &self.native_family)
            .field("weight", &self.weight)
            .field("italic", &self.italic)
            .field("bytes_len", &self.blob.data().len())
            .finish()
    }
}

/// Process-wide set of registered fonts. Immutable once loaded.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: Vec<FontFace>,
}

impl FontBook {
    /// Load every descriptor, logging and skipping the ones that fail.
    pub fn load(descriptors: &[FontDescriptor]) -> Self {
        let mut book = Self::default();
        for desc in descriptors {
            match load_face(desc) {
                Ok(face) => {
                    tracing::info!(
                        path = %desc.path.display(),
                        family = %face.family,
                        weight = face.weight,
                        "registered font"
                    );
                    book.faces.push(face);
                }
                Err(e) => {
                    tracing::error!(path = %desc.path.display(), error = %e, "font registration failed");
                }
            }
        }
        book
    }

    /// Register a font from memory.
    pub fn add_bytes(&mut self, bytes: Vec<u8>, options: &FontOptions) -> CardResult<()> {
        let face = face_from_bytes(bytes, options)?;
        self.faces.push(face);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }

    /// Family used when a layout does not ask for one: `preferred` when it names a registered
    /// alias or native family, otherwise the first registered face.
    pub fn default_family(&self, preferred: Option<&str>) -> Option<&str> {
        if let Some(want) = preferred {
            if let Some(face) = self.faces.iter().find(|f| {
                f.family.eq_ignore_ascii_case(want) || f.native_family.eq_ignore_ascii_case(want)
            }) {
                return Some(&face.family);
            }
        }
        self.faces.first().map(|f| f.family.as_str())
    }

    /// Index of the upright face in `family` whose weight is closest to `weight`.
    pub fn select(&self, family: &str, weight: u16) -> Option<usize> {
        let in_family = |f: &FontFace| f.family.eq_ignore_ascii_case(family);
        let candidates: Vec<usize> = if self.faces.iter().any(in_family) {
            (0..self.faces.len())
                .filter(|&i| in_family(&self.faces[i]))
                .collect()
        } else {
            (0..self.faces.len()).collect()
        };

        candidates.into_iter().min_by_key(|&i| {
            let f = &self.faces[i];
            (f.italic, f.weight.abs_diff(weight))
        })
    }
}

fn load_face(desc: &FontDescriptor) -> CardResult<FontFace> {
    let bytes = std::fs::read(&desc.path)
        .with_context(|| format!("read font file '{}'", desc.path.display()))?;
    face_from_bytes(bytes, &desc.options)
}

fn face_from_bytes(bytes: Vec<u8>, options: &FontOptions) -> CardResult<FontFace> {
    // parley and vello_cpu share one blob type; both sides hold the same bytes.
    let blob = parley::fontique::Blob::from(bytes);
    let draw_font = vello_cpu::peniko::FontData::new(blob.clone(), 0);
    let native_family = native_family_name(&blob)?;
    let weight = match options.weight.as_deref() {
        Some(w) => parse_weight(w)?,
        None => WEIGHT_NORMAL,
    };
    let italic = match options.style.as_deref() {
        None | Some("normal") => false,
        Some("italic") | Some("oblique") => true,
        Some(other) => {
            return Err(CardError::validation(format!(
                "unknown font style '{other}'"
            )));
        }
    };
    let family = options
        .family
        .clone()
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| native_family.clone());

    Ok(FontFace {
        family,
        native_family,
        weight,
        italic,
        blob,
        draw_font,
    })
}

fn native_family_name(blob: &parley::fontique::Blob<u8>) -> CardResult<String> {
    let mut font_ctx = parley::FontContext::default();
    let families = font_ctx.collection.register_fonts(blob.clone(), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| CardError::validation("no font families registered from font bytes"))?;
    font_ctx
        .collection
        .family_name(family_id)
        .map(str::to_string)
        .ok_or_else(|| CardError::validation("registered font family has no name"))
}

/// Parse a CSS-style weight keyword or number.
pub fn parse_weight(s: &str) -> CardResult<u16> {
    match s.trim() {
        "normal" | "regular" => Ok(WEIGHT_NORMAL),
        "bold" => Ok(WEIGHT_BOLD),
        other => {
            let w: u16 = other
                .parse()
                .map_err(|_| CardError::validation(format!("invalid font weight '{s}'")))?;
            if !(1..=1000).contains(&w) {
                return Err(CardError::validation(format!(
                    "font weight {w} must be within 1..=1000"
                )));
            }
            Ok(w)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
