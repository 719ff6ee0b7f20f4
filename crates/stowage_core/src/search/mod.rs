//! Faceted item query engine.

pub mod filter;
