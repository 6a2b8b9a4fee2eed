//! The generation pipeline: record in, finished PDF on disk, hosted
//! filename out. Every stage either completes or aborts the run; the output
//! file only ever appears atomically, after a successful render.

use crate::assets::AssetStore;
use crate::baseurl::resolve_base_url;
use crate::engine::{CanvasEngine, LayoutEngine, MarkupEngine};
use crate::error::{ContractError, RenderError};
use crate::locator::{locator_url, LocatorCode};
use crate::record::load_record;
use crate::template::TemplateCatalog;
use std::io::Write;
use std::path::Path;

/// Which layout engine renders the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// Flow the variant's markup template
    #[default]
    Markup,
    /// Fixed procedural layout, kept as a fallback
    Canvas,
}

impl EngineKind {
    fn engine(self) -> &'static dyn LayoutEngine {
        match self {
            EngineKind::Markup => &MarkupEngine,
            EngineKind::Canvas => &CanvasEngine,
        }
    }
}

/// Generate the contract for the record at `input` and write it to
/// `output`. `env` supplies environment lookups for base-URL resolution, so
/// tests can pin the hosting environment. Returns the output's filename,
/// the name the contract is hosted under.
pub fn generate<F>(
    input: &Path,
    output: &Path,
    assets_dir: &Path,
    engine: EngineKind,
    env: F,
) -> Result<String, ContractError>
where
    F: Fn(&str) -> Option<String>,
{
    let record = load_record(input)?;
    log::info!(
        "loaded trip {} with {} passenger(s)",
        record.trip_number,
        record.passengers.len()
    );

    let assets = AssetStore::open(assets_dir)?;

    let filename = output
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ContractError::asset(output, "output path has no usable file name"))?
        .to_string();

    let base = resolve_base_url(env);
    let url = locator_url(&base, &filename);
    log::debug!("locator URL: {url}");
    let locator = LocatorCode::generate(url)?;

    let catalog = TemplateCatalog::load(&assets.catalog_path())?;
    let variant = catalog.select(&record);
    log::info!(
        "vehicle `{} {}` selected variant `{}`",
        record.vehicle_type,
        record.vehicle_model,
        variant.key
    );

    let rendered = engine.engine().render(&record, &locator, variant, &assets)?;
    variant.verify_marker(&rendered.text)?;

    write_atomically(output, &rendered.bytes)?;
    log::info!("wrote {} ({} bytes)", output.display(), rendered.bytes.len());

    Ok(filename)
}

/// Write via a temporary file in the destination directory and rename into
/// place, so a failed run never leaves a partial contract behind
fn write_atomically(output: &Path, bytes: &[u8]) -> Result<(), ContractError> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(RenderError::Io)?;
    tmp.write_all(bytes).map_err(RenderError::Io)?;
    tmp.persist(output)
        .map_err(|e| RenderError::Io(e.error))?;
    Ok(())
}
