//! Core traits for the widget
//!
//! This module defines the abstract interfaces the host must provide.
//!
//! - [`FieldStore`]: Per-field snapshot reads and asynchronous commits

pub mod field_store;

pub use field_store::FieldStore;
