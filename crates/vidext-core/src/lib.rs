// # vidext-core
//
// Core library for the video field editor widget.
//
// ## Architecture Overview
//
// The widget binds a small form (platform, video id, player options) to
// three fields of a host content entry:
// - **FieldStore**: Trait for the host's per-field get/set capability
// - **OptionSet**: Flat or split mapping of player option selections
// - **catalog**: Static table of the selectable player options
// - **FormController**: Local state plus change handlers with write-through
// - **FormView**: View-model derived from the controller state
// - **mount**: Location gate deciding whether the widget is shown at all
//
// ## Design Principles
//
// 1. **Optimistic UI**: Local state changes synchronously on every edit
// 2. **Serialized write-through**: One writer task applies writes in order
// 3. **Visible failures**: Every write outcome is reported, never swallowed
// 4. **Library-First**: The editor binary is a thin host over this crate

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod model;
pub mod store;
pub mod traits;
pub mod view;

// Re-export core types for convenience
pub use config::{FieldNames, OptionShape, WidgetConfig};
pub use controller::{FieldSync, FormController, FormState, PendingWrite, WriteEvent};
pub use error::{Error, Result};
pub use host::{HostLocation, MountedWidget, mount};
pub use model::{OptionSelection, OptionSet, Platform};
pub use store::{FileFieldStore, MemoryFieldStore};
pub use traits::FieldStore;
pub use view::FormView;
