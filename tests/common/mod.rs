//! Common test utilities and helpers.
//!
//! - Custom assertions
//! - CV document builders (exact placement with lopdf, realistic with printpdf)
//! - Mapping and DOCX helpers

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
