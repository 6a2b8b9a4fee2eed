//! Arabic text preparation: contextual letterform shaping and bidirectional
//! reordering, plus width-aware wrapping for right-to-left paragraphs.
//!
//! PDF text operators draw glyphs exactly in the order given, so logical
//! Unicode order must be converted to visual order first, and joining
//! letters must be replaced by their presentation forms or they render
//! disconnected.

use crate::pdf::layout::width_of_text;
use crate::pdf::{Font, Pt};
use ar_reshaper::ArabicReshaper;
use unicode_bidi::BidiInfo;

/// Convert logical-order text to what should be drawn: contextual Arabic
/// presentation forms in visual order. Text without right-to-left content
/// passes through unchanged.
pub fn display(text: &str) -> String {
    let shaped = ArabicReshaper::default().reshape(text);
    let bidi = BidiInfo::new(&shaped, None);
    let mut visual = String::with_capacity(shaped.len());
    for paragraph in &bidi.paragraphs {
        visual.push_str(&bidi.reorder_line(paragraph, paragraph.range.clone()));
    }
    visual
}

/// Measured width of `text` once shaped for display
pub fn display_width(text: &str, font: &Font, size: Pt) -> Pt {
    width_of_text(&display(text), font, size)
}

/// Wrap a logical-order paragraph into lines no wider than `max_width`,
/// measuring each candidate in its shaped form. Returns logical-order
/// lines; shape each with [display] before drawing. A word that alone
/// exceeds the width gets its own line rather than being broken mid-word.
pub fn wrap_rtl(text: &str, font: &Font, size: Pt, max_width: Pt) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if current.is_empty() || display_width(&candidate, font, size) <= max_width {
            current = candidate;
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_text_passes_through() {
        assert_eq!(display("Trip No. TR-1042"), "Trip No. TR-1042");
    }

    #[test]
    fn arabic_text_is_shaped_into_presentation_forms() {
        // joining letters must leave the 0600–06FF base block for the
        // presentation-form blocks (FB50–FDFF, FE70–FEFF)
        let shaped = display("بسم");
        assert!(
            shaped.chars().any(|ch| ('\u{FB50}'..='\u{FEFF}').contains(&ch)),
            "no presentation forms in {shaped:?}"
        );
    }

    #[test]
    fn display_is_deterministic() {
        let text = "عقد نقل على الطرق البرية";
        assert_eq!(display(text), display(text));
    }
}
