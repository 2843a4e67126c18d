//! Fetches the MTA lost property advisory feed and exports it in two shapes:
//! a flat `frequencies.csv` of category/subcategory counts and a hierarchical
//! `flare.json` tree for visualization frontends.
//!
//! The binary in `main.rs` wires the pipeline together; the modules here are
//! exposed as a library so integration tests can drive each stage directly.

pub mod config;
pub mod export;
pub mod feed;
pub mod server;
