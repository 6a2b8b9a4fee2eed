//! The PDF rendering substrate: pages of text spans, images, and boxes,
//! written out with [pdf_writer]. Fonts are embedded as Type0/CID fonts so
//! Arabic presentation forms render correctly.

mod colour;
pub use colour::*;

mod document;
pub use document::*;

mod font;
pub use font::*;

mod image;
pub use self::image::*;

mod info;
pub use info::*;

pub mod layout;

mod page;
pub use page::*;

pub mod pagesize;
pub use pagesize::PageSize;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod units;
pub use units::*;
