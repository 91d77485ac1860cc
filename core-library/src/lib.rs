//! # Library Module
//!
//! Track model and the catalog that supplies tracks to players.
//!
//! ## Overview
//!
//! This module provides:
//! - [`Track`], the immutable value every player and playlist works with
//! - [`TrackCatalog`], the read-only data source contract
//! - [`InMemoryCatalog`], a catalog backed by a `Vec`, seeded with sample
//!   tracks for development

pub mod catalog;
pub mod error;
pub mod models;

pub use catalog::{InMemoryCatalog, TrackCatalog};
pub use error::{LibraryError, Result};
pub use models::Track;
