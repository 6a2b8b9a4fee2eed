//! The canvas engine: a fixed, procedural layout kept as the fallback when
//! a markup template cannot be trusted. Content is drawn first on plain
//! pages; the variant's background is then composited under every page, and
//! a missing background aborts the render rather than shipping a plain
//! white contract.

use super::{
    chunk_groups, draw_rtl_line, draw_section, paint_background, section_capacity,
    section_height, EngineFonts, LayoutEngine, RenderedContract, BODY_SIZE, LINE_HEIGHT,
    LOCATOR_SIZE, TITLE_SIZE,
};
use crate::assets::AssetStore;
use crate::error::ContractError;
use crate::locator::LocatorCode;
use crate::pdf::{
    colours, Document, Image, Info, Margins, Page, PlacedImage, Pt, Rect, SpanFont, TextSpan,
};
use crate::record::TripRecord;
use crate::shaping::{display, display_width, wrap_rtl};
use crate::template::{passenger_lines, VariantTemplate};
use crate::record::Passenger;

pub struct CanvasEngine;

const TITLE: &str = "عقد نقل على الطرق البرية";
const TRIP_HEADING: &str = "Trip Information / معلومات الرحلة";
const DRIVER_HEADING: &str = "Driver Information / معلومات السائق";
const PASSENGER_HEADING: &str = "Passenger Information / معلومات الركاب";

fn clauses(record: &TripRecord, company: &str) -> Vec<String> {
    vec![
        "تم ابرام هذا العقد بناء على المادة (39) التاسعة والثلاثون من اللائحة المنظمة لنشاط \
         تأجير الحافلات وسيارات الأجرة العاملة على الطرق البرية"
            .to_string(),
        "وبناء على طلب الطرف الثاني تم الاتفاق على نقله مع مرافقيه وفق البيانات الموضحة أدناه"
            .to_string(),
        String::new(),
        format!("الطرف الاول : {company}"),
        format!("الطرف الثاني : {}", record.main_passenger),
    ]
}

fn trip_lines(record: &TripRecord) -> Vec<String> {
    vec![
        format!("Date / التاريخ: {}", record.date),
        format!("From / من: {}", record.from_city),
        format!("To / إلى: {}", record.to_city),
        format!("Visa Type / نوع التأشيرة: {}", record.visa_type),
        format!("Trip No. / رقم الرحلة: {}", record.trip_number),
    ]
}

fn driver_lines(record: &TripRecord) -> Vec<String> {
    vec![
        format!("Driver Name / اسم السائق: {}", record.driver_name),
        format!("ID Number / رقم الهوية: {}", record.driver_id),
        format!("License No. / رقم الرخصة: {}", record.license_number),
    ]
}

fn passenger_groups(passengers: &[Passenger]) -> Vec<Vec<String>> {
    passengers
        .iter()
        .enumerate()
        .map(|(i, p)| passenger_lines(i, p))
        .collect()
}

impl LayoutEngine for CanvasEngine {
    fn render(
        &self,
        record: &TripRecord,
        locator: &LocatorCode,
        variant: &VariantTemplate,
        assets: &AssetStore,
    ) -> Result<RenderedContract, ContractError> {
        // load the background before drawing anything so a missing asset
        // fails the whole render up front
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
        let locator_image = doc.add_image(Image::from_dynamic(
            &image::DynamicImage::ImageLuma8(locator.image.clone()),
        ));

        let size = variant.page_size.dimensions();
        let margins = Margins::all(Pt(variant.margin));
        let mut pages: Vec<Page> = Vec::new();
        let mut page = Page::new(size, margins.clone());
        let mut text = String::new();
        let push_text = |text: &mut String, line: &str| {
            if !line.is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(line);
            }
        };

        // centred title
        let mut cursor = page.content_box.y2 - TITLE_SIZE;
        let shaped_title = display(TITLE);
        let title_width = display_width(TITLE, &doc.fonts[fonts.bold], TITLE_SIZE);
        let centre = (page.content_box.x1 + page.content_box.x2) / 2.0;
        page.add_span(TextSpan {
            text: shaped_title,
            font: SpanFont {
                id: fonts.bold,
                size: TITLE_SIZE,
            },
            colour: colours::HEADER_BLUE,
            at: (centre - title_width / 2.0, cursor),
        });
        push_text(&mut text, TITLE);
        cursor = cursor - LINE_HEIGHT - LINE_HEIGHT;

        // contract clauses, right-aligned
        for clause in clauses(record, &variant.company) {
            if clause.is_empty() {
                cursor = cursor - LINE_HEIGHT;
                continue;
            }
            push_text(&mut text, &clause);
            let right_edge = page.content_box.x2;
            for line in wrap_rtl(
                &clause,
                &doc.fonts[fonts.regular],
                BODY_SIZE,
                page.content_box.width(),
            ) {
                cursor = cursor - LINE_HEIGHT;
                draw_rtl_line(
                    &mut page,
                    &doc.fonts,
                    fonts.regular,
                    BODY_SIZE,
                    colours::BLACK,
                    &line,
                    right_edge,
                    cursor,
                );
            }
        }
        cursor = cursor - LINE_HEIGHT;

        // fixed section order: trip, driver, then passengers
        push_text(&mut text, TRIP_HEADING);
        let trip = trip_lines(record);
        for line in &trip {
            push_text(&mut text, line);
        }
        cursor = draw_section(&mut page, &doc.fonts, fonts, TRIP_HEADING, &trip, cursor, None);

        push_text(&mut text, DRIVER_HEADING);
        let driver = driver_lines(record);
        for line in &driver {
            push_text(&mut text, line);
        }
        cursor = draw_section(
            &mut page,
            &doc.fonts,
            fonts,
            DRIVER_HEADING,
            &driver,
            cursor,
            None,
        );

        push_text(&mut text, PASSENGER_HEADING);
        let groups = passenger_groups(&record.passengers);
        for group in &groups {
            for line in group {
                push_text(&mut text, line);
            }
        }
        let chunks = chunk_groups(&groups, section_capacity());
        for (index, chunk) in chunks.iter().enumerate() {
            let heading = if index == 0 {
                PASSENGER_HEADING.to_string()
            } else {
                format!("{PASSENGER_HEADING} (تابع / continued)")
            };
            if cursor - section_height(chunk.len()) < page.content_box.y1 {
                pages.push(std::mem::replace(&mut page, Page::new(size, margins.clone())));
                cursor = page.content_box.y2;
            }
            cursor = draw_section(&mut page, &doc.fonts, fonts, &heading, chunk, cursor, None);
        }

        // locator in the bottom-left corner of the first page
        let first = pages.first_mut().unwrap_or(&mut page);
        let origin = (first.content_box.x1, first.content_box.y1);
        first.add_image(PlacedImage {
            image: locator_image,
            rect: Rect::new(
                origin.0,
                origin.1,
                origin.0 + LOCATOR_SIZE,
                origin.1 + LOCATOR_SIZE,
            ),
            opacity: None,
        });

        pages.push(page);
        for page in pages {
            doc.add_page(page);
        }

        // composite the background under the content of every page,
        // continuation pages included
        for page in doc.pages_mut() {
            paint_background(
                page,
                background,
                variant.background_opacity,
                variant.background_scale,
            );
        }
        log::debug!("canvas layout produced {} page(s)", doc.page_count());

        let mut bytes: Vec<u8> = Vec::new();
        doc.write(&mut bytes).map_err(ContractError::Render)?;
        Ok(RenderedContract { bytes, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Passenger;

    fn passenger(n: usize) -> Passenger {
        Passenger {
            name: format!("passenger {n}"),
            id_number: format!("24567890{n:02}"),
            nationality: "مصري".into(),
        }
    }

    #[test]
    fn passenger_groups_are_three_lines_each() {
        let groups = passenger_groups(&[passenger(1), passenger(2)]);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.len() == 3));
        assert!(groups[0][0].starts_with("1. "));
        assert!(groups[1][0].starts_with("2. "));
    }

    #[test]
    fn clauses_name_both_parties() {
        let record = TripRecord {
            date: "2025-03-14".into(),
            from_city: "الرياض".into(),
            to_city: "جدة".into(),
            visa_type: "عمرة".into(),
            trip_number: "TR-1042".into(),
            main_passenger: "محمد عبدالله".into(),
            driver_name: "خالد أحمد".into(),
            driver_id: "1098765432".into(),
            license_number: "DL-55671".into(),
            passengers: vec![],
            vehicle_type: String::new(),
            vehicle_model: String::new(),
        };
        let clauses = clauses(&record, "GMC CO");
        assert!(clauses.iter().any(|c| c.contains("GMC CO")));
        assert!(clauses.iter().any(|c| c.contains("محمد عبدالله")));
    }
}
