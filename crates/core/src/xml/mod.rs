//! Minimal XML element tree and writer used by the launch handshake and the
//! SOAP client.

mod tree;
mod writer;

pub use tree::*;
pub use writer::*;

use thiserror::Error;

/// Errors produced while reading or writing XML.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("XML document has no root element")]
    NoRoot,

    #[error("Failed to write XML: {0}")]
    Write(String),
}
