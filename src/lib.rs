//! Bilingual (Arabic/English) ground-transport contract generation: a trip
//! record in JSON goes in, a paginated PDF with an embedded locator code
//! comes out.
//!
//! The public surface is [pipeline::generate]; the pieces underneath are
//! exported for callers that need finer control:
//!
//! - [record]: parsing and validation of the input trip record
//! - [template]: the variant catalog and the markup template format
//! - [engine]: the two layout engines behind [engine::LayoutEngine]
//! - [baseurl] and [locator]: hosting-environment detection and the QR
//!   locator code
//! - [pdf]: the document/page/font substrate the engines draw with

pub mod assets;
pub mod baseurl;
pub mod engine;
pub mod error;
pub mod locator;
pub mod pdf;
pub mod pipeline;
pub mod record;
pub mod shaping;
pub mod template;

pub use error::{ContractError, DataError, RenderError};
pub use pipeline::{generate, EngineKind};
