//! Measurement helpers used when positioning text on pages.

use super::font::Font;
use super::page::Page;
use super::units::Pt;

/// Width of a string at the given size, summing horizontal advances.
/// Newlines contribute nothing.
pub fn width_of_text(text: &str, font: &Font, size: Pt) -> Pt {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(|ch| font.advance(ch, size))
        .sum()
}

/// The coordinates where a first baseline can start so that the ascender of
/// the text sits just inside the top-left corner of the page's content box
pub fn baseline_start(page: &Page, font: &Font, size: Pt) -> (Pt, Pt) {
    let x = page.content_box.x1;
    let y = page.content_box.y2 - font.ascent(size);
    (x, y)
}
