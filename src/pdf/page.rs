use super::colour::Colour;
use super::font::Font;
use super::image::Image;
use super::pagesize::PageSize;
use super::rect::Rect;
use super::refs::{ObjectReferences, RefType};
use super::units::Pt;
use id_arena::{Arena, Id};
use pdf_writer::{Content, Finish, Name, Pdf, Ref, Str};

/// Margins applied to a page to derive its content box
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    /// Individual components, clockwise from the top (CSS order)
    pub fn trbl(top: Pt, right: Pt, bottom: Pt, left: Pt) -> Margins {
        Margins {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn all<D: Into<Pt>>(value: D) -> Margins {
        let value: Pt = value.into();
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn symmetric(vertical: Pt, horizontal: Pt) -> Margins {
        Margins {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// Which font, at which size, a span is shown in
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub id: Id<Font>,
    pub size: Pt,
}

/// A single run of text anchored at a baseline coordinate
#[derive(Clone, Debug)]
pub struct TextSpan {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    /// Baseline origin of the first glyph
    pub at: (Pt, Pt),
}

/// An image stretched into a rectangle, optionally blended with the
/// content underneath it
#[derive(Clone, Debug)]
pub struct PlacedImage {
    pub image: Id<Image>,
    pub rect: Rect,
    pub opacity: Option<f32>,
}

/// A rectangle with an optional (possibly translucent) fill and an optional
/// stroked border. Used for section borders, header bars, and the
/// semi-opaque panels the markup engine places over the background.
#[derive(Clone, Debug)]
pub struct PanelBox {
    pub rect: Rect,
    pub fill: Option<Colour>,
    pub fill_opacity: Option<f32>,
    pub stroke: Option<Colour>,
    pub line_width: Pt,
}

#[derive(Clone, Debug)]
pub enum PageItem {
    Span(TextSpan),
    Image(PlacedImage),
    Box(PanelBox),
}

/// A single page: its geometry plus the items drawn onto it, in paint order
pub struct Page {
    pub media_box: Rect,
    pub content_box: Rect,
    items: Vec<PageItem>,
}

impl Page {
    pub fn new(size: PageSize, margins: Margins) -> Page {
        let (width, height) = size;
        Page {
            media_box: Rect::new(Pt(0.0), Pt(0.0), width, height),
            content_box: Rect::new(
                margins.left,
                margins.bottom,
                width - margins.right,
                height - margins.top,
            ),
            items: Vec::new(),
        }
    }

    pub fn add_span(&mut self, span: TextSpan) {
        self.items.push(PageItem::Span(span));
    }

    pub fn add_image(&mut self, image: PlacedImage) {
        self.items.push(PageItem::Image(image));
    }

    pub fn add_box(&mut self, panel: PanelBox) {
        self.items.push(PageItem::Box(panel));
    }

    /// Place an image underneath everything already drawn on the page
    pub fn underlay_image(&mut self, image: PlacedImage) {
        self.items.insert(0, PageItem::Image(image));
    }

    /// Every opacity value this page blends with, for ExtGState dedup
    pub(crate) fn opacities(&self) -> Vec<f32> {
        self.items
            .iter()
            .filter_map(|item| match item {
                PageItem::Image(image) => image.opacity,
                PageItem::Box(panel) => panel.fill_opacity,
                PageItem::Span(_) => None,
            })
            .collect()
    }

    fn set_fill(content: &mut Content, colour: Colour) {
        match colour {
            Colour::Rgb { r, g, b } => content.set_fill_rgb(r, g, b),
            Colour::Grey { g } => content.set_fill_gray(g),
        };
    }

    fn set_stroke(content: &mut Content, colour: Colour) {
        match colour {
            Colour::Rgb { r, g, b } => content.set_stroke_rgb(r, g, b),
            Colour::Grey { g } => content.set_stroke_gray(g),
        };
    }

    fn render(&self, fonts: &Arena<Font>, opacity_slot: &dyn Fn(f32) -> usize) -> Vec<u8> {
        let mut content = Content::new();

        for item in self.items.iter() {
            match item {
                PageItem::Box(panel) => {
                    content.save_state();
                    if let Some(alpha) = panel.fill_opacity {
                        let name = format!("G{}", opacity_slot(alpha));
                        content.set_parameters(Name(name.as_bytes()));
                    }
                    if let Some(fill) = panel.fill {
                        Self::set_fill(&mut content, fill);
                    }
                    if let Some(stroke) = panel.stroke {
                        Self::set_stroke(&mut content, stroke);
                        content.set_line_width(panel.line_width.into());
                    }
                    content.rect(
                        panel.rect.x1.into(),
                        panel.rect.y1.into(),
                        panel.rect.width().into(),
                        panel.rect.height().into(),
                    );
                    match (panel.fill.is_some(), panel.stroke.is_some()) {
                        (true, true) => content.fill_nonzero_and_stroke(),
                        (true, false) => content.fill_nonzero(),
                        (false, true) => content.stroke(),
                        (false, false) => content.end_path(),
                    };
                    content.restore_state();
                }
                PageItem::Image(image) => {
                    content.save_state();
                    if let Some(alpha) = image.opacity {
                        let name = format!("G{}", opacity_slot(alpha));
                        content.set_parameters(Name(name.as_bytes()));
                    }
                    content.transform([
                        image.rect.width().into(),
                        0.0,
                        0.0,
                        image.rect.height().into(),
                        image.rect.x1.into(),
                        image.rect.y1.into(),
                    ]);
                    let name = format!("I{}", image.image.index());
                    content.x_object(Name(name.as_bytes()));
                    content.restore_state();
                }
                PageItem::Span(span) => {
                    content.begin_text();
                    let font_name = format!("F{}", span.font.id.index());
                    content.set_font(Name(font_name.as_bytes()), span.font.size.into());
                    Self::set_fill(&mut content, span.colour);
                    content.next_line(span.at.0.into(), span.at.1.into());
                    let mut glyphs: Vec<u8> = Vec::with_capacity(span.text.len() * 2);
                    for ch in span.text.chars() {
                        let gid = fonts[span.font.id].glyph_or_replacement(ch);
                        glyphs.extend_from_slice(&gid.to_be_bytes());
                    }
                    content.show(Str(&glyphs));
                    content.end_text();
                }
            }
        }

        content.finish()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        id: Ref,
        page_tree_id: Ref,
        index: usize,
        fonts: &Arena<Font>,
        images: &Arena<Image>,
        opacity_slots: &[(u32, usize)],
        writer: &mut Pdf,
    ) {
        let content_id = refs.gen(RefType::ContentForPage(index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(page_tree_id);
        page.contents(content_id);

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (font_id, _) in fonts.iter() {
            if let Some(r) = refs.get(RefType::Font(font_id.index())) {
                resource_fonts.pair(Name(format!("F{}", font_id.index()).as_bytes()), r);
            }
        }
        resource_fonts.finish();
        let mut resource_xobjects = resources.x_objects();
        for (image_id, _) in images.iter() {
            if let Some(r) = refs.get(RefType::Image(image_id.index())) {
                resource_xobjects.pair(Name(format!("I{}", image_id.index()).as_bytes()), r);
            }
        }
        resource_xobjects.finish();
        let mut resource_gs = resources.ext_g_states();
        for &(_, slot) in opacity_slots.iter() {
            if let Some(r) = refs.get(RefType::Opacity(slot)) {
                resource_gs.pair(Name(format!("G{slot}").as_bytes()), r);
            }
        }
        resource_gs.finish();
        resources.finish();
        page.finish();

        let slot_of = |alpha: f32| -> usize {
            opacity_slots
                .iter()
                .find(|&&(bits, _)| bits == alpha.to_bits())
                .map(|&(_, slot)| slot)
                .unwrap_or(0)
        };
        let rendered = self.render(fonts, &slot_of);
        writer.stream(content_id, rendered.as_slice());
    }
}
