//! Gatepass library
//!
//! Visitor gate passes and overstay tracking: the sealed QR token codec,
//! the overstay classifier, and the scanner/report/monitor layers built on
//! them. Exposes modules for integration testing and binary reuse.

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;
