//! Rendering module for converting documents to output formats.
//!
//! DOCX is the primary output. JSON and plain text are inspection views
//! of the same in-memory document.

mod docx;
mod json;
mod text;

pub use docx::{to_docx, write_docx, DocxWriter, HYPERLINK_COLOR};
pub use json::{to_json, JsonFormat};
pub use text::to_text;
