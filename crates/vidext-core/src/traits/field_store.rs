// # Field Store Trait
//
// Defines the interface to the host entry's named fields.
//
// ## Purpose
//
// The host owns persistence. The widget only needs two capabilities per
// field:
// - A synchronous snapshot of the currently committed value
// - An asynchronous commit of a new value (or removal of the value)
//
// ## Implementations
//
// - Memory: `MemoryFieldStore` (tests, ephemeral editing)
// - File: `FileFieldStore` (JSON entry document on disk)
// - Host bridges: implemented by the embedding application
//
// ## Usage
//
// ```rust,ignore
// use vidext_core::FieldStore;
// use serde_json::json;
//
// #[tokio::main]
// async fn main() -> vidext_core::Result<()> {
//     let store = /* FieldStore implementation */;
//
//     // Snapshot read
//     let platform = store.get_value("platform");
//
//     // Commit a new value
//     store.set_value("platform", Some(json!("youtube"))).await?;
//
//     // Remove a value (the host's "undefined")
//     store.set_value("options", None).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde_json::Value;

/// Trait for host field store implementations
///
/// Field values are JSON values; `None` means the field holds no value.
///
/// # Thread Safety
///
/// The store is shared between the controller (reads at mount) and the
/// write-through worker task (commits), so implementations must be
/// `Send + Sync`.
///
/// ## Implementation Guidelines
///
/// - **Snapshot reads**: `get_value()` must not block on I/O; serve it from
///   memory
/// - **Independent fields**: Writes to different fields must not interfere
/// - **Report failures**: A rejected commit must return `Err`, the widget
///   surfaces it to the user
#[async_trait]
pub trait FieldStore: Send + Sync {
    /// Get the committed value of a field
    ///
    /// # Returns
    ///
    /// - `Some(Value)`: The current value
    /// - `None`: The field holds no value
    fn get_value(&self, field: &str) -> Option<Value>;

    /// Commit a new value for a field
    ///
    /// # Parameters
    ///
    /// - `field`: The field name
    /// - `value`: The new value, or `None` to clear the field
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Successfully committed
    /// - `Err(Error)`: The commit failed; the stored value is unchanged
    async fn set_value(&self, field: &str, value: Option<Value>) -> Result<(), crate::Error>;
}
