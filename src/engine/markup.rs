//! The markup engine: renders a contract by flowing the blocks of a merged
//! `.tpl` template down the page, painting the variant's background image
//! under semi-opaque content panels and breaking to a new page whenever a
//! block no longer fits.

use super::{
    chunk_groups, draw_rtl_line, draw_section, paint_background, section_capacity,
    section_height, EngineFonts, LayoutEngine, RenderedContract, BODY_SIZE, LINE_HEIGHT,
    LOCATOR_SIZE, SECTION_GAP, TITLE_SIZE,
};
use crate::assets::AssetStore;
use crate::error::ContractError;
use crate::locator::LocatorCode;
use crate::pdf::pagesize::PageSize;
use crate::pdf::{
    colours, Document, Font, Image, Info, Margins, Page, PlacedImage, Pt, Rect, SpanFont,
    TextSpan,
};
use crate::record::TripRecord;
use crate::shaping::{display, wrap_rtl};
use crate::template::{merge_template, MergedBlock, VariantTemplate};
use id_arena::Id;
use image::DynamicImage;

/// Opacity of the white panels drawn between the background image and the
/// section content
const PANEL_ALPHA: f32 = 0.85;

pub struct MarkupEngine;

/// Tracks the page being filled and the vertical cursor on it; breaking to
/// a new page repaints the background before any content lands on it
struct PageFlow {
    size: PageSize,
    margins: Margins,
    background: Id<Image>,
    opacity: f32,
    scale: f32,
    pages: Vec<Page>,
    page: Page,
    cursor: Pt,
}

impl PageFlow {
    fn start(variant: &VariantTemplate, background: Id<Image>) -> PageFlow {
        let size = variant.page_size.dimensions();
        let margins = Margins::all(Pt(variant.margin));
        let mut page = Page::new(size, margins.clone());
        paint_background(&mut page, background, variant.background_opacity, variant.background_scale);
        let cursor = page.content_box.y2;
        PageFlow {
            size,
            margins,
            background,
            opacity: variant.background_opacity,
            scale: variant.background_scale,
            pages: Vec::new(),
            page,
            cursor,
        }
    }

    fn break_page(&mut self) {
        let mut fresh = Page::new(self.size, self.margins.clone());
        paint_background(&mut fresh, self.background, self.opacity, self.scale);
        self.cursor = fresh.content_box.y2;
        self.pages.push(std::mem::replace(&mut self.page, fresh));
    }

    /// Break to a new page unless `height` still fits above the bottom
    /// margin
    fn ensure(&mut self, height: Pt) {
        if self.cursor - height < self.page.content_box.y1 {
            self.break_page();
        }
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.page);
        self.pages
    }
}

/// Regroup a section's flat lines so that a row and its indented
/// continuation lines (a passenger's three lines) never split across boxes
fn group_section_lines(lines: &[String]) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    for line in lines {
        if line.starts_with("    ") {
            if let Some(last) = groups.last_mut() {
                last.push(line.clone());
                continue;
            }
        }
        groups.push(vec![line.clone()]);
    }
    groups
}

impl LayoutEngine for MarkupEngine {
    fn render(
        &self,
        record: &TripRecord,
        locator: &LocatorCode,
        variant: &VariantTemplate,
        assets: &AssetStore,
    ) -> Result<RenderedContract, ContractError> {
        let (source, template_path) = assets.template_source(&variant.template)?;
        let merged = merge_template(&source, &template_path, record, &variant.company)?;
        log::debug!(
            "merged template {} into {} blocks",
            variant.template,
            merged.blocks.len()
        );

        let background = assets.background(&variant.background)?;
        let (regular, bold) = assets.fonts()?;

        let mut doc = Document::new();
        doc.set_info(
            Info::new()
                .title(format!("عقد نقل - {}", record.trip_number))
                .author(&variant.company)
                .subject(format!("{} - {}", record.from_city, record.to_city)),
        );
        let fonts = EngineFonts {
            regular: doc.add_font(regular),
            bold: doc.add_font(bold),
        };
        let background = doc.add_image(background);
        let locator_image =
            doc.add_image(Image::from_dynamic(&DynamicImage::ImageLuma8(locator.image.clone())));

        let mut flow = PageFlow::start(variant, background);
        let content_width = flow.page.content_box.width();

        for block in &merged.blocks {
            match block {
                MergedBlock::Title(title) => {
                    flow.ensure(LINE_HEIGHT + LINE_HEIGHT);
                    flow.cursor = flow.cursor - TITLE_SIZE;
                    let shaped = display(title);
                    let width = title_width(&doc.fonts[fonts.bold], &shaped);
                    let centre = (flow.page.content_box.x1 + flow.page.content_box.x2) / 2.0;
                    flow.page.add_span(TextSpan {
                        text: shaped,
                        font: SpanFont {
                            id: fonts.bold,
                            size: TITLE_SIZE,
                        },
                        colour: colours::HEADER_BLUE,
                        at: (centre - width / 2.0, flow.cursor),
                    });
                    flow.cursor = flow.cursor - LINE_HEIGHT;
                }
                MergedBlock::Para(paragraph) => {
                    let lines = wrap_rtl(
                        paragraph,
                        &doc.fonts[fonts.regular],
                        BODY_SIZE,
                        content_width,
                    );
                    for line in lines {
                        flow.ensure(LINE_HEIGHT);
                        flow.cursor = flow.cursor - LINE_HEIGHT;
                        let right_edge = flow.page.content_box.x2;
                        draw_rtl_line(
                            &mut flow.page,
                            &doc.fonts,
                            fonts.regular,
                            BODY_SIZE,
                            colours::BLACK,
                            &line,
                            right_edge,
                            flow.cursor,
                        );
                    }
                }
                MergedBlock::Blank => {
                    flow.cursor = flow.cursor - LINE_HEIGHT;
                }
                MergedBlock::Qr => {
                    flow.ensure(LOCATOR_SIZE + SECTION_GAP);
                    let x2 = flow.page.content_box.x2;
                    flow.page.add_image(PlacedImage {
                        image: locator_image,
                        rect: Rect::new(
                            x2 - LOCATOR_SIZE,
                            flow.cursor - LOCATOR_SIZE,
                            x2,
                            flow.cursor,
                        ),
                        opacity: None,
                    });
                    flow.cursor = flow.cursor - LOCATOR_SIZE - SECTION_GAP;
                }
                MergedBlock::Section { heading, lines } => {
                    let groups = group_section_lines(lines);
                    let chunks = chunk_groups(&groups, section_capacity());
                    for (index, chunk) in chunks.iter().enumerate() {
                        let heading = if index == 0 {
                            heading.clone()
                        } else {
                            format!("{heading} (تابع / continued)")
                        };
                        flow.ensure(section_height(chunk.len()));
                        flow.cursor = draw_section(
                            &mut flow.page,
                            &doc.fonts,
                            fonts,
                            &heading,
                            chunk,
                            flow.cursor,
                            Some(PANEL_ALPHA),
                        );
                    }
                }
            }
        }

        for page in flow.finish() {
            doc.add_page(page);
        }
        log::debug!("markup layout produced {} page(s)", doc.page_count());

        let mut bytes: Vec<u8> = Vec::new();
        doc.write(&mut bytes).map_err(ContractError::Render)?;
        Ok(RenderedContract {
            bytes,
            text: merged.text,
        })
    }
}

fn title_width(font: &Font, shaped: &str) -> Pt {
    crate::pdf::layout::width_of_text(shaped, font, TITLE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indented_lines_stay_with_their_row() {
        let lines: Vec<String> = vec![
            "1. محمد".into(),
            "    ID / رقم الهوية: 123".into(),
            "    Nationality / الجنسية: مصري".into(),
            "2. سعيد".into(),
            "    ID / رقم الهوية: 456".into(),
            "    Nationality / الجنسية: سوري".into(),
        ];
        let groups = group_section_lines(&lines);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1].len(), 3);
    }

    #[test]
    fn plain_field_lines_form_singleton_groups() {
        let lines: Vec<String> = vec!["Date / التاريخ: x".into(), "From / من: y".into()];
        let groups = group_section_lines(&lines);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.len() == 1));
    }
}
