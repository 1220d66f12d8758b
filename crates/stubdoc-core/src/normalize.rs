//! Text normalization shared by local and reference page extraction

use unicode_normalization::UnicodeNormalization;

/// Private-use glyph the reference theme renders as a heading anchor.
const ANCHOR_GLYPH: char = '\u{f0c1}';

/// Pilcrow anchor used by older theme versions.
const PILCROW: char = '¶';

/// Normalize extracted page text for comparison.
///
/// Applies Unicode canonical composition (NFC) and removes the anchor
/// glyphs that heading permalinks leave in the visible text. Safe to apply
/// more than once.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.replace(ANCHOR_GLYPH, "").replace(PILCROW, "")
}
