// # Field Store Implementations
//
// This module provides implementations of the FieldStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::FileFieldStore;
pub use memory::MemoryFieldStore;
