//! Core definitions (error taxonomy and common result type), relied upon by all
//! trellis-* crates.

pub mod error;
pub mod result;

pub use result::Result;
