use std::path::PathBuf;
use thiserror::Error;

/// The input record is missing or malformed. Raised before any rendering
/// begins; nothing is written to disk when one of these surfaces.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("cannot read record {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("required field `{0}` is missing or empty")]
    MissingField(String),

    #[error("field `{field}` is malformed: {reason}")]
    Malformed { field: String, reason: String },
}

/// A failure inside the rendering machinery: fonts, images, locator-code
/// generation, or I/O while producing the document
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("font: {0}")]
    Face(#[from] owned_ttf_parser::FaceParsingError),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("locator code: {0}")]
    Locator(#[from] qrcode::types::QrError),
}

/// Everything the pipeline can fail with. Every stage either completes
/// fully or aborts the whole generation with one of these; no error is
/// swallowed and continued past.
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("input record: {0}")]
    Data(#[from] DataError),

    #[error("asset `{path}`: {reason}")]
    Asset { path: PathBuf, reason: String },

    #[error("template `{variant}`: rendered contract is missing required company marker `{marker}`")]
    TemplateIntegrity { variant: String, marker: String },

    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

impl ContractError {
    /// Shorthand for asset failures, which always carry the offending path
    pub fn asset<P: Into<PathBuf>, S: ToString>(path: P, reason: S) -> ContractError {
        ContractError::Asset {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
