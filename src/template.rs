//! The template catalog: which layout variant a record selects, the company
//! marker each variant must carry, and the markup template format the
//! primary engine renders.

use crate::error::ContractError;
use crate::pdf::{pagesize, PageSize};
use crate::record::TripRecord;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Page formats the catalog can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSizeName {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl PageSizeName {
    pub fn dimensions(self) -> PageSize {
        match self {
            PageSizeName::A3 => pagesize::A3,
            PageSizeName::A4 => pagesize::A4,
            PageSizeName::A5 => pagesize::A5,
            PageSizeName::Letter => pagesize::LETTER,
            PageSizeName::Legal => pagesize::LEGAL,
        }
    }
}

/// One layout variant: a markup template, the company string that must
/// appear verbatim in its output, and the page/background geometry
#[derive(Debug, Clone, Deserialize)]
pub struct VariantTemplate {
    #[serde(skip)]
    pub key: String,
    pub template: String,
    pub company: String,
    pub background: String,
    pub page_size: PageSizeName,
    pub margin: f32,
    pub background_opacity: f32,
    pub background_scale: f32,
}

impl VariantTemplate {
    /// Post-render content-correctness guard: the rendered text must carry
    /// this variant's company string verbatim, or the template has drifted
    pub fn verify_marker(&self, rendered_text: &str) -> Result<(), ContractError> {
        if rendered_text.contains(&self.company) {
            Ok(())
        } else {
            Err(ContractError::TemplateIntegrity {
                variant: self.key.clone(),
                marker: self.company.clone(),
            })
        }
    }
}

/// The catalog maps a vehicle-type key to a variant; unknown vehicles map
/// to the `default` entry
pub struct TemplateCatalog {
    variants: BTreeMap<String, VariantTemplate>,
}

impl TemplateCatalog {
    pub fn load(path: &Path) -> Result<TemplateCatalog, ContractError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ContractError::asset(path, format!("cannot read catalog: {e}")))?;
        Self::parse(&raw).map_err(|reason| ContractError::asset(path, reason))
    }

    fn parse(raw: &str) -> Result<TemplateCatalog, String> {
        let mut variants: BTreeMap<String, VariantTemplate> =
            serde_json::from_str(raw).map_err(|e| format!("catalog is not valid JSON: {e}"))?;
        for (key, variant) in variants.iter_mut() {
            variant.key = key.clone();
        }
        if !variants.contains_key("default") {
            return Err("catalog has no `default` entry".into());
        }
        Ok(TemplateCatalog { variants })
    }

    /// Select a variant from the vehicle fields, case-insensitively and
    /// ignoring surrounding whitespace. Only the Hyundai Staria has a
    /// dedicated variant; everything else is the default (GMC) layout.
    pub fn select(&self, record: &TripRecord) -> &VariantTemplate {
        let vehicle_type = record.vehicle_type.trim().to_lowercase();
        let vehicle_model = record.vehicle_model.trim().to_lowercase();

        if vehicle_type == "hyundai" && vehicle_model == "staria" {
            if let Some(variant) = self.variants.get("hyundai") {
                return variant;
            }
        }
        &self.variants["default"]
    }
}

/// A line inside a `section` block
#[derive(Debug, Clone, PartialEq)]
enum SectionLine {
    Field(String),
    Passengers,
}

/// One parsed markup block, before data is merged in
#[derive(Debug, Clone, PartialEq)]
enum Block {
    Title(String),
    Para(String),
    Blank,
    Qr,
    Section {
        heading: String,
        lines: Vec<SectionLine>,
    },
}

/// A block with all placeholders substituted, ready for layout
#[derive(Debug, Clone, PartialEq)]
pub enum MergedBlock {
    Title(String),
    Para(String),
    Blank,
    Qr,
    Section {
        heading: String,
        lines: Vec<String>,
    },
}

/// The merged template: layout blocks plus the full logical text used for
/// the integrity check
pub struct MergedTemplate {
    pub blocks: Vec<MergedBlock>,
    pub text: String,
}

fn parse_blocks(source: &str, path: &Path) -> Result<Vec<Block>, ContractError> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut section: Option<(String, Vec<SectionLine>)> = None;

    for (number, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((heading, lines)) = section.as_mut() {
            if line == "end" {
                let (heading, lines) = (heading.clone(), std::mem::take(lines));
                blocks.push(Block::Section { heading, lines });
                section = None;
            } else if line == "passengers" {
                lines.push(SectionLine::Passengers);
            } else if let Some(rest) = line.strip_prefix("field:") {
                lines.push(SectionLine::Field(rest.trim().to_string()));
            } else {
                return Err(ContractError::asset(
                    path,
                    format!("line {}: unexpected `{line}` inside section", number + 1),
                ));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("title:") {
            blocks.push(Block::Title(rest.trim().to_string()));
        } else if let Some(rest) = line.strip_prefix("para:") {
            blocks.push(Block::Para(rest.trim().to_string()));
        } else if line == "blank" {
            blocks.push(Block::Blank);
        } else if line == "qr" {
            blocks.push(Block::Qr);
        } else if let Some(rest) = line.strip_prefix("section:") {
            section = Some((rest.trim().to_string(), Vec::new()));
        } else {
            return Err(ContractError::asset(
                path,
                format!("line {}: unknown directive `{line}`", number + 1),
            ));
        }
    }

    if section.is_some() {
        return Err(ContractError::asset(path, "unterminated section block"));
    }
    Ok(blocks)
}

fn placeholder_value<'a>(
    name: &str,
    record: &'a TripRecord,
    company: &'a str,
) -> Option<&'a str> {
    Some(match name {
        "date" => &record.date,
        "from_city" => &record.from_city,
        "to_city" => &record.to_city,
        "visa_type" => &record.visa_type,
        "trip_number" => &record.trip_number,
        "main_passenger" => &record.main_passenger,
        "driver_name" => &record.driver_name,
        "driver_id" => &record.driver_id,
        "license_number" => &record.license_number,
        "company" => company,
        _ => return None,
    })
}

fn substitute(
    text: &str,
    record: &TripRecord,
    company: &str,
    path: &Path,
) -> Result<String, ContractError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| {
            ContractError::asset(path, format!("unterminated placeholder in `{text}`"))
        })?;
        let name = after[..end].trim();
        let value = placeholder_value(name, record, company).ok_or_else(|| {
            ContractError::asset(path, format!("unknown placeholder `{{{{{name}}}}}`"))
        })?;
        out.push_str(value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// The three display lines of one passenger row, numbered from 1
pub fn passenger_lines(index: usize, passenger: &crate::record::Passenger) -> Vec<String> {
    vec![
        format!("{}. {}", index + 1, passenger.name),
        format!("    ID / رقم الهوية: {}", passenger.id_number),
        format!("    Nationality / الجنسية: {}", passenger.nationality),
    ]
}

/// Parse a markup template and merge the record into it
pub fn merge_template(
    source: &str,
    path: &Path,
    record: &TripRecord,
    company: &str,
) -> Result<MergedTemplate, ContractError> {
    let blocks = parse_blocks(source, path)?;
    let mut merged: Vec<MergedBlock> = Vec::with_capacity(blocks.len());
    let mut text = String::new();

    let push_text = |text: &mut String, line: &str| {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(line);
    };

    for block in blocks {
        match block {
            Block::Title(t) => {
                let t = substitute(&t, record, company, path)?;
                push_text(&mut text, &t);
                merged.push(MergedBlock::Title(t));
            }
            Block::Para(p) => {
                let p = substitute(&p, record, company, path)?;
                push_text(&mut text, &p);
                merged.push(MergedBlock::Para(p));
            }
            Block::Blank => merged.push(MergedBlock::Blank),
            Block::Qr => merged.push(MergedBlock::Qr),
            Block::Section { heading, lines } => {
                let heading = substitute(&heading, record, company, path)?;
                push_text(&mut text, &heading);
                let mut content: Vec<String> = Vec::new();
                for line in lines {
                    match line {
                        SectionLine::Field(f) => {
                            content.push(substitute(&f, record, company, path)?);
                        }
                        SectionLine::Passengers => {
                            for (i, passenger) in record.passengers.iter().enumerate() {
                                content.extend(passenger_lines(i, passenger));
                            }
                        }
                    }
                }
                for line in &content {
                    push_text(&mut text, line);
                }
                merged.push(MergedBlock::Section {
                    heading,
                    lines: content,
                });
            }
        }
    }

    Ok(MergedTemplate {
        blocks: merged,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_record;

    const CATALOG: &str = r#"{
        "hyundai": {
            "template": "hyundai.tpl",
            "company": "HYUNDAI CO",
            "background": "staria.png",
            "page_size": "a4",
            "margin": 42.0,
            "background_opacity": 0.18,
            "background_scale": 1.0
        },
        "default": {
            "template": "default.tpl",
            "company": "GMC CO",
            "background": "gmc.png",
            "page_size": "a4",
            "margin": 42.0,
            "background_opacity": 0.18,
            "background_scale": 1.0
        }
    }"#;

    fn record(vehicle_type: &str, vehicle_model: &str) -> TripRecord {
        parse_record(
            &serde_json::json!({
                "date": "2025-03-14",
                "from_city": "الرياض",
                "to_city": "جدة",
                "visa_type": "عمرة",
                "trip_number": "TR-1042",
                "main_passenger": "محمد عبدالله",
                "driver_name": "خالد أحمد",
                "driver_id": "1098765432",
                "license_number": "DL-55671",
                "passengers": [
                    { "name": "محمد عبدالله", "id_number": "2456789012", "nationality": "مصري" }
                ],
                "vehicle_type": vehicle_type,
                "vehicle_model": vehicle_model
            })
            .to_string(),
        )
        .expect("record parses")
    }

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::parse(CATALOG).expect("catalog parses")
    }

    #[test]
    fn hyundai_staria_selects_the_hyundai_variant() {
        let catalog = catalog();
        for (t, m) in [
            ("hyundai", "staria"),
            ("Hyundai", "Staria"),
            ("  HYUNDAI  ", " STARIA "),
        ] {
            assert_eq!(catalog.select(&record(t, m)).key, "hyundai");
        }
    }

    #[test]
    fn everything_else_selects_the_default_variant() {
        let catalog = catalog();
        for (t, m) in [
            ("gmc", "yukon"),
            ("hyundai", "sonata"),
            ("toyota", "staria"),
            ("", ""),
        ] {
            assert_eq!(catalog.select(&record(t, m)).key, "default");
        }
    }

    #[test]
    fn catalog_without_default_is_rejected() {
        let result = TemplateCatalog::parse(
            r#"{ "hyundai": { "template": "h.tpl", "company": "x", "background": "b.png",
                 "page_size": "a4", "margin": 40.0,
                 "background_opacity": 0.2, "background_scale": 1.0 } }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn marker_verification() {
        let catalog = catalog();
        let variant = catalog.select(&record("gmc", "yukon"));
        assert!(variant.verify_marker("الطرف الاول : GMC CO").is_ok());
        assert!(matches!(
            variant.verify_marker("no marker here"),
            Err(ContractError::TemplateIntegrity { ref variant, .. }) if variant == "default"
        ));
    }

    const TEMPLATE: &str = "\
title: عقد نقل على الطرق البرية
qr
para: الطرف الاول : {{company}}
para: الطرف الثاني : {{main_passenger}}
blank
section: Trip Information / معلومات الرحلة
field: Date / التاريخ: {{date}}
field: From / من: {{from_city}}
end
section: Passenger Information / معلومات الركاب
passengers
end
";

    #[test]
    fn merges_record_into_template() {
        let record = record("gmc", "yukon");
        let merged = merge_template(TEMPLATE, Path::new("t.tpl"), &record, "GMC CO")
            .expect("template merges");
        assert!(merged.text.contains("GMC CO"));
        assert!(!merged.text.contains("TR-1042")); // not referenced by the template
        assert!(merged.text.contains("2025-03-14"));
        assert!(merged.text.contains("محمد عبدالله"));

        // passengers expand to three lines each
        let section = merged
            .blocks
            .iter()
            .find_map(|b| match b {
                MergedBlock::Section { heading, lines }
                    if heading.contains("Passenger") =>
                {
                    Some(lines.clone())
                }
                _ => None,
            })
            .expect("passenger section exists");
        assert_eq!(section.len(), 3);
        assert!(section[0].starts_with("1. "));
    }

    #[test]
    fn unknown_placeholder_is_an_asset_error() {
        let record = record("gmc", "yukon");
        let result = merge_template(
            "para: {{no_such_field}}",
            Path::new("t.tpl"),
            &record,
            "GMC CO",
        );
        assert!(matches!(result, Err(ContractError::Asset { .. })));
    }

    #[test]
    fn unterminated_section_is_an_asset_error() {
        let record = record("gmc", "yukon");
        let result = merge_template(
            "section: Trip\nfield: a",
            Path::new("t.tpl"),
            &record,
            "GMC CO",
        );
        assert!(matches!(result, Err(ContractError::Asset { .. })));
    }
}
