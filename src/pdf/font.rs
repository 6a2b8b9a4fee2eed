use super::refs::{ObjectReferences, RefType};
use super::units::Pt;
use crate::error::RenderError;
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo};
use pdf_writer::{Finish, Name, Pdf, Ref, Str};
use std::collections::HashMap;

/// A parsed TTF/OTF font. The whole face is embedded in the generated PDF as
/// a Type0/CID font with an Identity-H encoding, so any glyph the face
/// carries (including Arabic presentation forms) can be shown.
pub struct Font {
    face: OwnedFace,
}

impl Font {
    /// Parse a font from raw bytes
    pub fn load(bytes: Vec<u8>) -> Result<Font, RenderError> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font { face })
    }

    fn scale(&self, size: Pt) -> Pt {
        size / self.face.as_face_ref().units_per_em() as f32
    }

    /// Distance from the baseline to the top of the font at `size`
    pub fn ascent(&self, size: Pt) -> Pt {
        self.scale(size) * self.face.as_face_ref().ascender() as f32
    }

    /// Distance from the baseline to the bottom of the font at `size`;
    /// usually negative
    pub fn descent(&self, size: Pt) -> Pt {
        self.scale(size) * self.face.as_face_ref().descender() as f32
    }

    /// How much to advance the pen vertically between two rows of text
    pub fn line_height(&self, size: Pt) -> Pt {
        let leading = self.scale(size) * self.face.as_face_ref().line_gap() as f32;
        leading + self.ascent(size) - self.descent(size)
    }

    /// Horizontal advance of a single character at `size`. Characters the
    /// face has no glyph for advance by the replacement glyph's width.
    pub fn advance(&self, ch: char, size: Pt) -> Pt {
        let gid = owned_ttf_parser::GlyphId(self.glyph_or_replacement(ch));
        self.scale(size)
            * self
                .face
                .as_face_ref()
                .glyph_hor_advance(gid)
                .unwrap_or_default() as f32
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face.as_face_ref().glyph_index(ch).map(|i| i.0)
    }

    /// Glyph id for `ch`, falling back to U+FFFD, then '?', then glyph 0
    pub fn glyph_or_replacement(&self, ch: char) -> u16 {
        self.glyph_id(ch)
            .or_else(|| self.glyph_id('\u{FFFD}'))
            .or_else(|| self.glyph_id('?'))
            .unwrap_or(0)
    }

    fn family(&self) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == owned_ttf_parser::name_id::FAMILY && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// All glyph ids reachable from the unicode cmap, with the character
    /// each maps back to. Used for width tables and the ToUnicode cmap.
    fn charmap(&self) -> Vec<(u16, char)> {
        let mut map: HashMap<u16, char> = HashMap::new();
        if let Some(cmap) = self.face.as_face_ref().tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|t| t.is_unicode()) {
                subtable.codepoints(|codepoint: u32| {
                    if let Ok(ch) = char::try_from(codepoint) {
                        if let Some(gid) = subtable.glyph_index(codepoint).filter(|gid| gid.0 > 0) {
                            map.entry(gid.0).or_insert(ch);
                        }
                    }
                });
            }
        }
        let mut map: Vec<(u16, char)> = map.into_iter().collect();
        map.sort_by_key(|&(gid, _)| gid);
        map
    }

    /// Glyph widths in 1000-per-em units, sorted by glyph id
    fn glyph_widths(&self, charmap: &[(u16, char)]) -> Vec<(u16, f32)> {
        let scaling = 1000.0 / self.face.as_face_ref().units_per_em() as f32;
        charmap
            .iter()
            .filter_map(|&(gid, _)| {
                self.face
                    .as_face_ref()
                    .glyph_hor_advance(owned_ttf_parser::GlyphId(gid))
                    .map(|adv| (gid, adv as f32 * scaling))
            })
            .collect()
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let data_id = refs.gen(RefType::FontData(index));
        writer
            .stream(data_id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        let face = self.face.as_face_ref();
        let scaling = 1000.0 / face.units_per_em() as f32;
        let family = self.family().unwrap_or_else(|| format!("F{index}"));

        let id = refs.gen(RefType::FontDescriptor(index));
        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(family.as_bytes()));
        descriptor.family(Str(family.as_bytes()));
        descriptor.weight(face.weight().to_number());

        let mut flags = FontFlags::empty();
        if face.is_monospaced() {
            flags.set(FontFlags::FIXED_PITCH, true);
        }
        if face.is_italic() {
            flags.set(FontFlags::ITALIC, true);
        }
        descriptor.flags(flags);

        let bbox = face.global_bounding_box();
        descriptor.bbox(pdf_writer::Rect {
            x1: bbox.x_min as f32 * scaling,
            y1: bbox.y_min as f32 * scaling,
            x2: bbox.x_max as f32 * scaling,
            y2: bbox.y_max as f32 * scaling,
        });
        descriptor.italic_angle(face.italic_angle());
        descriptor.ascent(face.ascender() as f32 * scaling);
        descriptor.descent(face.descender() as f32 * scaling);
        descriptor.leading(face.line_gap() as f32 * scaling);
        descriptor.cap_height(
            face.capital_height()
                .map(|h| h as f32 * scaling)
                .unwrap_or(700.0),
        );
        descriptor.x_height(face.x_height().map(|h| h as f32 * scaling).unwrap_or(500.0));
        // ttf-parser exposes no stem information; a nominal value is enough
        // for viewers, which only use it for synthetic emboldening
        descriptor.stem_v(80.0);
        descriptor.font_file2(data_id);

        id
    }

    fn write_cid(&self, refs: &mut ObjectReferences, index: usize, writer: &mut Pdf) -> Ref {
        let descriptor_id = self.write_descriptor(refs, index, writer);

        let id = refs.gen(RefType::CidFont(index));
        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(CidFontType::Type2);
        cid_font.base_font(Name(format!("F{index}").as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(descriptor_id);

        let charmap = self.charmap();
        let glyph_widths = self.glyph_widths(&charmap);

        let mut widths = cid_font.widths();
        // emit widths as runs of consecutive glyph ids
        let mut run_start: u16 = 0;
        let mut run: Vec<f32> = Vec::new();
        for &(gid, width) in glyph_widths.iter() {
            if run.is_empty() || gid as usize == run_start as usize + run.len() {
                if run.is_empty() {
                    run_start = gid;
                }
                run.push(width);
            } else {
                widths.consecutive(run_start, run.drain(..));
                run_start = gid;
                run.push(width);
            }
        }
        if !run.is_empty() {
            widths.consecutive(run_start, run);
        }
        widths.finish();

        cid_font.default_width(1000.0);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        id
    }

    fn write_to_unicode(&self, refs: &mut ObjectReferences, index: usize, writer: &mut Pdf) -> Ref {
        let id = refs.gen(RefType::ToUnicode(index));

        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo\n\
             << /Registry (Adobe)\n\
             /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        for block in self.charmap().chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", block.len()));
            for &(gid, ch) in block {
                cmap.push_str(&format!("<{gid:04x}> <{:04x}>\n", u32::from(ch)));
            }
            cmap.push_str("endbfchar\n");
        }
        cmap.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            cmap.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultLevel as u8,
        );
        writer
            .stream(id, compressed.as_slice())
            .filter(pdf_writer::Filter::FlateDecode);

        id
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, index: usize, writer: &mut Pdf) {
        let font_id = refs.gen(RefType::Font(index));
        let cid_id = self.write_cid(refs, index, writer);
        let to_unicode_id = self.write_to_unicode(refs, index, writer);

        let mut font = writer.type0_font(font_id);
        font.base_font(Name(format!("F{index}").as_bytes()));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_id);
        font.to_unicode(to_unicode_id);
    }
}
