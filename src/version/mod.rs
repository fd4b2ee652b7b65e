//! Version extraction and comparison
//!
//! The pure core of the audit: pull a dotted version out of a free-text
//! banner, then order it against a threshold.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ banner text │────▶│  Extractor  │────▶│  Comparator │──▶ vulnerable?
//! │ (flattened) │     │ (marker+re) │     │ (dotted int)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`extractor`]: Marker-anchored version extraction from text
//! - [`compare`]: Component-wise comparison of dotted versions
//! - [`error`]: Error types for extractor construction

pub mod compare;
pub mod error;
pub mod extractor;
