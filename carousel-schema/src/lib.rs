#![doc = include_str!("../README.md")]
//! ## Feature flags
#![doc = document_features::document_features!()]
#![deny(unsafe_code)]
#![deny(clippy::all)]

use hard_xml::{XmlRead, XmlWrite};
use thiserror::Error;

pub mod process;
#[cfg(feature = "arrow")]
pub mod solution;

pub use process::CarouselProcess;

/// Version of the process-description format written by this crate.
///
/// Readers accept any document whose major version matches.
pub const FORMAT_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error parsing XML: {0}")]
    XmlParse(String),

    #[error("Error writing XML: {0}")]
    XmlWrite(String),

    #[error(transparent)]
    Semver(#[from] semver::Error),

    #[error("Unsupported format version {found}, this reader supports {supported}")]
    UnsupportedVersion { found: String, supported: String },
}

/// Serialize a schema element to an XML string.
pub fn serialize<T: XmlWrite>(value: &T) -> Result<String, Error> {
    value.to_string().map_err(|e| Error::XmlWrite(e.to_string()))
}

/// Deserialize a schema element from an XML string.
pub fn deserialize<'a, T: XmlRead<'a>>(xml: &'a str) -> Result<T, Error> {
    T::from_str(xml).map_err(|e| Error::XmlParse(e.to_string()))
}
