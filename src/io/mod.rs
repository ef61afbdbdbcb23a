//! IO modules - roster files in, CSV out
//!
//! This module contains all file IO:
//! - `roster` - JSONL roster reader
//! - `export` - CSV writer for overstay reports

pub mod export;
pub mod roster;

// Re-export commonly used types
pub use export::{write_csv, write_csv_to};
pub use roster::{parse_roster, read_roster};
