//! Edition output: column layout and the PDF writer.
//!
//! # Submodules
//!
//! - [`metrics`]: glyph widths for the built-in fonts
//! - [`layout`]: page geometry and column flow, independent of PDF
//! - [`pdf`]: writes a flowed layout to `DD_MM_YYYY.pdf`

pub mod layout;
pub mod metrics;
pub mod pdf;
