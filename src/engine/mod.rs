//! Layout engines. Both engines implement [LayoutEngine] and share the
//! bordered/headed section box arithmetic; they differ in where the content
//! comes from (markup template vs. procedural drawing) and when the
//! background is applied.

mod canvas;
mod markup;

pub use canvas::CanvasEngine;
pub use markup::MarkupEngine;

use crate::assets::AssetStore;
use crate::error::ContractError;
use crate::locator::LocatorCode;
use crate::pdf::layout::width_of_text;
use crate::pdf::{
    colours, Colour, Font, Image, Page, PanelBox, PlacedImage, Rect, SpanFont, TextSpan, Pt,
};
use crate::record::TripRecord;
use crate::shaping::display;
use crate::template::VariantTemplate;
use id_arena::{Arena, Id};

/// Vertical advance of one content line inside a section box
pub const LINE_HEIGHT: Pt = Pt(20.0);
/// Height of the grey header bar of a section box
pub const HEADER_HEIGHT: Pt = Pt(25.0);
/// Padding below the last content line of a section box
pub const SECTION_PADDING: Pt = Pt(10.0);
/// A section box never shrinks below this
pub const MIN_SECTION_HEIGHT: Pt = Pt(60.0);
/// A section box never grows beyond this; overflow continues in a new box
pub const MAX_SECTION_HEIGHT: Pt = Pt(200.0);
/// Vertical gap between two section boxes
pub const SECTION_GAP: Pt = Pt(10.0);

pub const TITLE_SIZE: Pt = Pt(16.0);
pub const HEADING_SIZE: Pt = Pt(12.0);
pub const BODY_SIZE: Pt = Pt(10.0);
/// Side length of the embedded locator code
pub const LOCATOR_SIZE: Pt = Pt(100.0);

/// The output of an engine: the finished PDF plus the merged logical text,
/// which the pipeline checks for the variant's company marker
pub struct RenderedContract {
    pub bytes: Vec<u8>,
    pub text: String,
}

/// One rendering strategy. `render` is the whole engine: record in,
/// paginated document out.
pub trait LayoutEngine {
    fn render(
        &self,
        record: &TripRecord,
        locator: &LocatorCode,
        variant: &VariantTemplate,
        assets: &AssetStore,
    ) -> Result<RenderedContract, ContractError>;
}

/// Fonts registered with the document being built
#[derive(Copy, Clone)]
pub(crate) struct EngineFonts {
    pub regular: Id<Font>,
    pub bold: Id<Font>,
}

/// Height of a section box holding `lines` content lines: grows with the
/// content, clamped between the minimum and the 200pt cap
pub fn section_height(lines: usize) -> Pt {
    (LINE_HEIGHT * lines as f32 + HEADER_HEIGHT + SECTION_PADDING)
        .max(MIN_SECTION_HEIGHT)
        .min(MAX_SECTION_HEIGHT)
}

/// How many content lines fit in a box at the height cap
pub fn section_capacity() -> usize {
    (((MAX_SECTION_HEIGHT - HEADER_HEIGHT - SECTION_PADDING).0) / LINE_HEIGHT.0) as usize
}

/// Split line groups into box-sized chunks without splitting a group (a
/// passenger's three lines stay together) unless a single group alone
/// exceeds a whole box.
pub fn chunk_groups(groups: &[Vec<String>], capacity: usize) -> Vec<Vec<String>> {
    let mut chunks: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for group in groups {
        if !current.is_empty() && current.len() + group.len() > capacity {
            chunks.push(std::mem::take(&mut current));
        }
        if group.len() > capacity {
            for line in group {
                if current.len() == capacity {
                    chunks.push(std::mem::take(&mut current));
                }
                current.push(line.clone());
            }
        } else {
            current.extend(group.iter().cloned());
        }
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Draw one bordered, grey-headed section box with right-aligned content.
/// `top` is the y coordinate of the box's upper edge; the returned value is
/// the y coordinate below the box and its trailing gap.
pub(crate) fn draw_section(
    page: &mut Page,
    fonts_arena: &Arena<Font>,
    fonts: EngineFonts,
    heading: &str,
    lines: &[String],
    top: Pt,
    panel_opacity: Option<f32>,
) -> Pt {
    let height = section_height(lines.len());
    let x1 = page.content_box.x1;
    let x2 = page.content_box.x2;
    let rect = Rect::new(x1, top - height, x2, top);

    // semi-opaque white panel under the whole box, so content stays
    // readable over a background image
    if let Some(alpha) = panel_opacity {
        page.add_box(PanelBox {
            rect,
            fill: Some(colours::WHITE),
            fill_opacity: Some(alpha),
            stroke: None,
            line_width: Pt(0.0),
        });
    }

    // header bar, then the outer border on top of it
    page.add_box(PanelBox {
        rect: Rect::new(x1, top - HEADER_HEIGHT, x2, top),
        fill: Some(colours::LIGHT_GREY),
        fill_opacity: None,
        stroke: None,
        line_width: Pt(0.0),
    });
    page.add_box(PanelBox {
        rect,
        fill: None,
        fill_opacity: None,
        stroke: Some(colours::BLACK),
        line_width: Pt(1.0),
    });

    page.add_span(TextSpan {
        text: display(heading),
        font: SpanFont {
            id: fonts.bold,
            size: HEADING_SIZE,
        },
        colour: colours::BLACK,
        at: (x1 + Pt(10.0), top - HEADER_HEIGHT + Pt(7.0)),
    });

    let mut baseline = top - HEADER_HEIGHT - LINE_HEIGHT;
    for line in lines {
        let shaped = display(line);
        let width = width_of_text(&shaped, &fonts_arena[fonts.regular], BODY_SIZE);
        page.add_span(TextSpan {
            text: shaped,
            font: SpanFont {
                id: fonts.regular,
                size: BODY_SIZE,
            },
            colour: colours::BLACK,
            at: (x2 - Pt(10.0) - width, baseline),
        });
        baseline = baseline - LINE_HEIGHT;
    }

    top - height - SECTION_GAP
}

/// Draw one right-aligned body line, shaped for display
pub(crate) fn draw_rtl_line(
    page: &mut Page,
    fonts_arena: &Arena<Font>,
    font: Id<Font>,
    size: Pt,
    colour: Colour,
    text: &str,
    right_edge: Pt,
    baseline: Pt,
) {
    let shaped = display(text);
    let width = width_of_text(&shaped, &fonts_arena[font], size);
    page.add_span(TextSpan {
        text: shaped,
        font: SpanFont { id: font, size },
        colour,
        at: (right_edge - width, baseline),
    });
}

/// The rectangle a background image covers: the whole page, scaled about
/// the page centre by the catalog's scale factor
pub(crate) fn background_rect(page: &Page, scale: f32) -> Rect {
    let width = page.media_box.width() * scale;
    let height = page.media_box.height() * scale;
    let x = (page.media_box.width() - width) / 2.0;
    let y = (page.media_box.height() - height) / 2.0;
    Rect::from_origin_size(x, y, width, height)
}

/// Paint the background image under the content of a page
pub(crate) fn paint_background(page: &mut Page, image: Id<Image>, opacity: f32, scale: f32) {
    let rect = background_rect(page, scale);
    page.underlay_image(PlacedImage {
        image,
        rect,
        opacity: Some(opacity),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_height_is_monotonic_and_capped() {
        let mut previous = Pt(0.0);
        for lines in 0..40 {
            let height = section_height(lines);
            assert!(height >= previous, "height shrank at {lines} lines");
            assert!(height <= MAX_SECTION_HEIGHT);
            previous = height;
        }
        assert_eq!(section_height(0), MIN_SECTION_HEIGHT);
        assert_eq!(section_height(100), MAX_SECTION_HEIGHT);
    }

    #[test]
    fn capacity_matches_the_cap() {
        let capacity = section_capacity();
        assert_eq!(capacity, 8);
        assert!(section_height(capacity) <= MAX_SECTION_HEIGHT);
    }

    #[test]
    fn chunking_keeps_groups_together() {
        let groups: Vec<Vec<String>> = (0..5)
            .map(|i| vec![format!("p{i} a"), format!("p{i} b"), format!("p{i} c")])
            .collect();
        let chunks = chunk_groups(&groups, section_capacity());
        // 8 lines per box, 3 lines per passenger: two passengers per box
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 6);
        assert_eq!(chunks[1].len(), 6);
        assert_eq!(chunks[2].len(), 3);
        // no passenger is split across boxes
        for chunk in &chunks {
            assert_eq!(chunk.len() % 3, 0);
        }
    }

    #[test]
    fn chunking_empty_input_yields_one_empty_box() {
        let chunks = chunk_groups(&[], section_capacity());
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_empty());
    }

    #[test]
    fn oversized_group_is_split_as_a_last_resort() {
        let big: Vec<Vec<String>> = vec![(0..20).map(|i| format!("line {i}")).collect()];
        let chunks = chunk_groups(&big, section_capacity());
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.len() <= section_capacity()));
    }
}
