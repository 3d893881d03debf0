use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

/// Width of one character, in ems, when no font can be loaded.
const FALLBACK_CHAR_EM: f32 = 0.56;
const ELLIPSIS: &str = "...";

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Advance width of `text` in the first installed font of `font_family`, a CSS
/// style family list. `None` when no font matches.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family, bold)
}

/// Like [`measure_text_width`], estimating from the font size when no font is
/// available.
pub fn text_width(text: &str, font_size: f32, font_family: &str, bold: bool) -> f32 {
    measure_text_width(text, font_size, font_family, bold)
        .unwrap_or_else(|| fallback_width(text, font_size))
}

pub fn fallback_width(text: &str, font_size: f32) -> f32 {
    text.chars().filter(|ch| *ch != '\n').count() as f32 * font_size * FALLBACK_CHAR_EM
}

/// Shortens `text` so it fits into `max_width`, ending it with "..." when
/// anything was cut.
pub fn truncate_to_width(
    text: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    bold: bool,
) -> String {
    truncate_with(text, max_width, |part| {
        text_width(part, font_size, font_family, bold)
    })
}

/// Truncation with a caller-provided width function.
pub fn truncate_with(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> String {
    if measure(text) <= max_width {
        return text.to_string();
    }
    let mut fitted = 0usize;
    for (idx, ch) in text.char_indices() {
        let end = idx + ch.len_utf8();
        let candidate = format!("{}{ELLIPSIS}", &text[..end]);
        if measure(&candidate) > max_width {
            break;
        }
        fitted = end;
    }
    format!("{}{ELLIPSIS}", text[..fitted].trim_end())
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<(String, bool), Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
        let key = (normalize_family_key(font_family), bold);
        if !self.cache.contains_key(&key) {
            let face = self.load_face(font_family, bold);
            self.cache.insert(key.clone(), face);
        }
        let face = self.cache.get_mut(&key)?.as_mut()?;
        Some(face.measure_width(&text.replace('\t', "    "), font_size))
    }

    fn load_face(&mut self, font_family: &str, bold: bool) -> Option<FontFace> {
        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .copied()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(name),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::new(data.to_vec(), index))
            .flatten()
    }
}

/// Parsed advance widths of one font face.
struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * FALLBACK_CHAR_EM;
        let mut width = 0.0f32;
        // Parsed lazily, only when a non-ASCII character is not cached yet.
        let mut face: Option<Face<'_>> = None;

        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize]).filter(|adv| *adv > 0)
            } else if let Some(cached) = self.advance_cache.get(&ch) {
                *cached
            } else {
                if face.is_none() {
                    face = Face::parse(&self.data, self.index).ok();
                }
                let advance = face
                    .as_ref()
                    .and_then(|face| face.glyph_hor_advance(face.glyph_index(ch)?));
                self.advance_cache.insert(ch, advance);
                advance
            };
            width += advance.map_or(fallback, |adv| adv as f32 * scale);
        }
        width.max(0.0)
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(text: &str) -> f32 {
        text.chars().count() as f32 * 10.0
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_with("Roof", 40.0, mono), "Roof");
    }

    #[test]
    fn long_text_ends_with_ellipsis_and_fits() {
        let out = truncate_with("Foundation works", 100.0, mono);
        assert_eq!(out, "Foundat...");
        assert!(mono(&out) <= 100.0);
    }

    #[test]
    fn nothing_fits_but_the_ellipsis() {
        assert_eq!(truncate_with("Excavation", 20.0, mono), "...");
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let out = truncate_with("Détérioration", 60.0, mono);
        assert_eq!(out, "Dét...");
    }

    #[test]
    fn fallback_scales_with_font_size() {
        assert!((fallback_width("abcd", 10.0) - 22.4).abs() < 1e-4);
        assert_eq!(fallback_width("", 10.0), 0.0);
    }

    #[test]
    fn measured_width_is_positive_or_absent() {
        if let Some(width) = measure_text_width("Task", 11.0, "sans-serif", false) {
            assert!(width > 0.0);
        }
        assert_eq!(measure_text_width("", 11.0, "sans-serif", false), Some(0.0));
    }
}
