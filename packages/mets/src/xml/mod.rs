//! XML document model.
//!
//! - [`Element`]: detached tree produced by the builders
//! - [`Document`]: arena the assembler and amendment engine work on
//! - [`to_string`] / [`write_document`]: serialization with quick-xml
//! - [`parse_document`]: loading persisted documents with roxmltree

mod document;
mod reader;
mod writer;

pub use document::{Attribute, Descendants, Document, Element, NodeId, QName};
pub use reader::parse_document;
pub use writer::{to_string, write_document};
