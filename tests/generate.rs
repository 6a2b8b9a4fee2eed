//! End-to-end pipeline tests against the bundled asset directory. Rendering
//! needs a real TTF face; when neither bundled nor system fonts exist the
//! rendering tests skip rather than fail.

use contract_gen::assets::AssetStore;
use contract_gen::engine::{LayoutEngine, MarkupEngine};
use contract_gen::error::ContractError;
use contract_gen::locator::LocatorCode;
use contract_gen::pipeline::{generate, EngineKind};
use contract_gen::record::parse_record;
use contract_gen::template::TemplateCatalog;
use std::path::Path;

fn record_json(passengers: usize) -> String {
    let passengers: Vec<serde_json::Value> = (0..passengers)
        .map(|i| {
            serde_json::json!({
                "name": format!("راكب {}", i + 1),
                "id_number": format!("24567890{i:02}"),
                "nationality": "مصري"
            })
        })
        .collect();
    serde_json::json!({
        "date": "2025-03-14",
        "from_city": "الرياض",
        "to_city": "جدة",
        "visa_type": "عمرة",
        "trip_number": "TR-1042",
        "main_passenger": "محمد عبدالله",
        "driver_name": "خالد أحمد",
        "driver_id": "1098765432",
        "license_number": "DL-55671",
        "passengers": passengers,
        "vehicle_type": "gmc",
        "vehicle_model": "yukon"
    })
    .to_string()
}

fn hyundai_record_json(passengers: usize) -> String {
    let mut value: serde_json::Value = serde_json::from_str(&record_json(passengers)).unwrap();
    value["vehicle_type"] = serde_json::json!("Hyundai");
    value["vehicle_model"] = serde_json::json!("Staria");
    value.to_string()
}

fn no_env(_: &str) -> Option<String> {
    None
}

fn fonts_available() -> bool {
    AssetStore::open(Path::new("assets")).is_ok()
}

#[test]
fn generates_a_pdf_and_returns_the_hosted_filename() {
    if !fonts_available() {
        eprintln!("skipping: no usable font on this machine");
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("trip.json");
    let output = dir.path().join("contract_tr_1042.pdf");
    std::fs::write(&input, record_json(2)).expect("write record");

    let filename =
        generate(&input, &output, Path::new("assets"), EngineKind::Markup, no_env)
            .expect("generation succeeds");

    assert_eq!(filename, "contract_tr_1042.pdf");
    let bytes = std::fs::read(&output).expect("output exists");
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn hyundai_staria_renders_the_hyundai_variant_end_to_end() {
    if !fonts_available() {
        eprintln!("skipping: no usable font on this machine");
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("trip.json");
    let output = dir.path().join("contract.pdf");
    std::fs::write(&input, hyundai_record_json(1)).expect("write record");

    generate(&input, &output, Path::new("assets"), EngineKind::Markup, no_env)
        .expect("generation succeeds");
    assert!(std::fs::read(&output).expect("output exists").starts_with(b"%PDF-"));

    // the shipped catalog must route the Staria to its own variant, and
    // the rendered text must carry that variant's company marker
    let assets = AssetStore::open(Path::new("assets")).expect("assets open");
    let catalog = TemplateCatalog::load(&assets.catalog_path()).expect("catalog loads");
    let record = parse_record(&hyundai_record_json(1)).expect("record parses");
    let variant = catalog.select(&record);
    assert_eq!(variant.key, "hyundai");

    let locator = LocatorCode::generate("http://localhost:5000/uploads/contract.pdf".into())
        .expect("locator generates");
    let rendered = MarkupEngine
        .render(&record, &locator, variant, &assets)
        .expect("render succeeds");
    assert!(rendered.text.contains(&variant.company));
    variant.verify_marker(&rendered.text).expect("marker present");
}

#[test]
fn canvas_engine_renders_the_same_record() {
    if !fonts_available() {
        eprintln!("skipping: no usable font on this machine");
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("trip.json");
    let output = dir.path().join("contract.pdf");
    std::fs::write(&input, record_json(1)).expect("write record");

    generate(&input, &output, Path::new("assets"), EngineKind::Canvas, no_env)
        .expect("generation succeeds");
    assert!(std::fs::read(&output).expect("output exists").starts_with(b"%PDF-"));
}

#[test]
fn many_passengers_overflow_onto_continuation_pages() {
    if !fonts_available() {
        eprintln!("skipping: no usable font on this machine");
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("trip.json");
    let output = dir.path().join("contract.pdf");
    std::fs::write(&input, record_json(25)).expect("write record");

    generate(&input, &output, Path::new("assets"), EngineKind::Markup, no_env)
        .expect("generation succeeds");
    let bytes = std::fs::read(&output).expect("output exists");
    assert!(bytes.starts_with(b"%PDF-"));
    // 25 passengers cannot fit in one 200pt box; the document must carry
    // more than one page object
    let haystack = String::from_utf8_lossy(&bytes);
    assert!(haystack.matches("/Parent").count() > 2);
}

#[test]
fn zero_passengers_is_a_valid_record() {
    if !fonts_available() {
        eprintln!("skipping: no usable font on this machine");
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("trip.json");
    let output = dir.path().join("contract.pdf");
    std::fs::write(&input, record_json(0)).expect("write record");

    generate(&input, &output, Path::new("assets"), EngineKind::Markup, no_env)
        .expect("generation succeeds");
    assert!(output.is_file());
}

#[test]
fn missing_field_fails_before_anything_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("trip.json");
    let output = dir.path().join("contract.pdf");
    let mut record: serde_json::Value = serde_json::from_str(&record_json(1)).unwrap();
    record.as_object_mut().unwrap().remove("driver_name");
    std::fs::write(&input, record.to_string()).expect("write record");

    let result = generate(&input, &output, Path::new("assets"), EngineKind::Markup, no_env);
    assert!(matches!(result, Err(ContractError::Data(_))));
    assert!(!output.exists(), "no partial output may exist");
    // the temporary file must be cleaned up too
    let leftovers = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path() != input)
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn unreadable_input_is_a_data_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = generate(
        &dir.path().join("absent.json"),
        &dir.path().join("contract.pdf"),
        Path::new("assets"),
        EngineKind::Markup,
        no_env,
    );
    assert!(matches!(result, Err(ContractError::Data(_))));
}
