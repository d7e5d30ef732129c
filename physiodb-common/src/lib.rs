//! Shared library for PhysioDB
//!
//! Holds the static sensor catalog, the common error type, and the SQLite
//! schema/connection layer used by both the extractor and the web service.

pub mod catalog;
pub mod db;
pub mod error;

pub use error::{Error, Result};
