//! Content-addressed log store: the LMDBer/Baser persistence layer.
//!
//! `dbing` wraps the embedded ordered KV store (heed/LMDB), `subing` builds
//! typed sub-database facades (single value, sorted duplicates, insertion
//! ordered duplicates, ordinal append-only logs) on top of it, `koming`
//! adds a serde-typed single-value facade, and `basing` assembles the named
//! sub-databases that make up a KEL store (Baser).

pub mod basing;
pub mod dbing;
pub mod errors;
pub mod koming;
pub mod subing;
