//! Core definitions (error taxonomy and common helpers), relied upon by all
//! cairn-* crates.

pub mod error;
pub mod result;

pub use error::{Error, ErrorKind};
pub use result::Result;
