//! Local audio library: discovery, tag reading and row building.

pub mod discover;
pub mod rows;
pub mod tags;

pub use discover::{scan_files, SignatureClassifier};
pub use rows::{build_rows, Row};
pub use tags::{SymphoniaTagReader, TagKey, TagMap, TagReader};
