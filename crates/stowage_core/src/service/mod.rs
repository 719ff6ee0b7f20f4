//! Use-case service facades over the repository layer.
//!
//! # Responsibility
//! - Enforce cross-entity invariants above the store: reference checks,
//!   hierarchy cycle rejection, tag normalization.
//! - Keep the service layer storage-agnostic: everything goes through the
//!   repository traits.

pub mod bin_service;
pub mod category_service;
pub mod item_service;
pub mod tag_service;
