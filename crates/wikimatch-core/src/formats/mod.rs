//! # Formats Module
//!
//! Text and binary formats read and written by the pipeline.
//!
//! This module contains:
//! - WordNet is-a edge lists (`parent child` per line)
//! - Manual match CSV lines
//! - Binary ancestor-table snapshots (postcard + header)
//!
//! Note: File I/O operations remain in the app layer (apps/wikimatch).
//! This module only handles format conversion (pure transformations).

mod manual_csv;
mod persistence;
mod wordnet;

pub use manual_csv::*;
pub use persistence::*;
pub use wordnet::*;
