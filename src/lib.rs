//! Cotistas - fund movement reconciliation
//!
//! Matches every row of the exported movement batches to a client code from
//! the cotista roster and to a fund ID, and encodes the result as the
//! fixed-width PRN file the back-office system imports.

pub mod config;
pub mod cotistas;
pub mod error;
pub mod extractor;
pub mod funds;
pub mod importers;
pub mod normalize;
pub mod pipeline;
pub mod prn;
pub mod reconcile;
pub mod table;
