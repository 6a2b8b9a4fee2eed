use super::font::Font;
use super::image::Image;
use super::info::Info;
use super::page::Page;
use super::refs::{ObjectReferences, RefType};
use crate::error::RenderError;
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Pdf, Ref};
use std::io::Write;

/// A document collects pages, fonts, and images, then renders the whole PDF
/// with a call to [Document::write]
#[derive(Default)]
pub struct Document {
    pub info: Option<Info>,
    pub fonts: Arena<Font>,
    pub images: Arena<Image>,
    pages: Vec<Page>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Register a font with the document. Fonts are stored document-wide;
    /// any page can use any registered font.
    pub fn add_font(&mut self, font: Font) -> Id<Font> {
        self.fonts.alloc(font)
    }

    /// Register an image with the document for re-use across pages
    pub fn add_image(&mut self, image: Image) -> Id<Image> {
        self.images.alloc(image)
    }

    /// Append a page, returning its 0-based index
    pub fn add_page(&mut self, page: Page) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Mutable access to the pages, in document order. The background
    /// compositor uses this to paint under the content of every page.
    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// Render the document to the writer. The PDF is assembled fully in
    /// memory before any byte is written.
    pub fn write<W: Write>(self, mut w: W) -> Result<(), RenderError> {
        let Document {
            info,
            fonts,
            images,
            pages,
        } = self;

        let mut refs = ObjectReferences::new();
        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info {
            info.write(&mut refs, &mut writer);
        }

        let page_refs: Vec<Ref> = (0..pages.len())
            .map(|i| refs.gen(RefType::Page(i)))
            .collect();
        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs.iter().copied());

        for (id, font) in fonts.iter() {
            font.write(&mut refs, id.index(), &mut writer);
        }
        for (id, image) in images.iter() {
            image.write(&mut refs, id.index(), &mut writer);
        }

        // one ExtGState per distinct opacity used anywhere in the document
        let mut opacity_slots: Vec<(u32, usize)> = Vec::new();
        for page in pages.iter() {
            for alpha in page.opacities() {
                if !opacity_slots.iter().any(|&(bits, _)| bits == alpha.to_bits()) {
                    let slot = opacity_slots.len();
                    let id = refs.gen(RefType::Opacity(slot));
                    writer
                        .ext_graphics(id)
                        .non_stroking_alpha(alpha)
                        .stroking_alpha(alpha);
                    opacity_slots.push((alpha.to_bits(), slot));
                }
            }
        }

        for (index, page) in pages.iter().enumerate() {
            page.write(
                &mut refs,
                page_refs[index],
                page_tree_id,
                index,
                &fonts,
                &images,
                &opacity_slots,
                &mut writer,
            );
        }

        let mut catalog = writer.catalog(catalog_id);
        catalog.pages(page_tree_id);
        catalog.finish();

        w.write_all(writer.finish().as_slice())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::page::{Margins, Page};
    use crate::pdf::pagesize;
    use crate::pdf::units::Pt;

    #[test]
    fn writes_a_minimal_document() {
        let mut doc = Document::new();
        doc.add_page(Page::new(pagesize::A4, Margins::all(Pt(36.0))));
        let mut out: Vec<u8> = Vec::new();
        doc.write(&mut out).expect("write succeeds");
        assert!(out.starts_with(b"%PDF-"));
        assert!(!out.is_empty());
    }
}
