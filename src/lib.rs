//! Finds developers with similar coding habits from their git history.
//!
//! `extractor` turns repositories into per-developer activity records,
//! `features` and `similarity` rank developers against each other, and
//! `stargazers` is the separate GitHub starred-repositories ranking.

pub mod cli;
pub mod error;
pub mod extractor;
pub mod features;
pub mod identifiers;
pub mod language;
pub mod model;
pub mod similarity;
pub mod stargazers;
pub mod store;

pub use error::{Result, SimDevError};
