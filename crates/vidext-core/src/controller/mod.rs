//! Form controller
//!
//! The FormController is responsible for:
//! - Loading platform, video id and option set from the field store at mount
//! - Applying every edit to local state synchronously
//! - Queuing the matching field write on the write-through worker
//! - Exposing per-field sync status so failed writes stay visible
//!
//! ## Event Flow
//!
//! 1. User edits a control
//! 2. Local state is updated before the handler returns
//! 3. The new value is queued for the field store
//! 4. The worker commits it and reports the outcome
//!
//! Option edits are based on the controller's own copy of the option set,
//! never on a re-read of the store, so two quick edits cannot overwrite each
//! other.

mod writer;

pub use writer::{FieldSync, PendingWrite, WriteEvent};

use crate::catalog;
use crate::config::{FieldNames, OptionShape, WidgetConfig};
use crate::error::Result;
use crate::model::{OptionSelection, OptionSet, Platform};
use crate::traits::FieldStore;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use writer::FieldWriter;

/// Editable state mirrored from the three host fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub platform: Platform,
    pub video_id: String,
    /// `None` when the option field holds no value
    pub options: Option<OptionSet>,
}

impl FormState {
    /// Read the current field values from the store
    ///
    /// Values are not validated. Non-string platform or video id values are
    /// used through their JSON text.
    pub fn load(store: &dyn FieldStore, fields: &FieldNames, shape: OptionShape) -> Self {
        let platform = Platform::from(load_text(store, &fields.platform));
        let video_id = load_text(store, &fields.video_id);
        let options = store
            .get_value(&fields.options)
            .and_then(|value| OptionSet::from_value(shape, &value));

        Self {
            platform,
            video_id,
            options,
        }
    }
}

fn load_text(store: &dyn FieldStore, field: &str) -> String {
    match store.get_value(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => {
            warn!("Field {} holds a non-string value, using it as-is: {}", field, other);
            other.to_string()
        }
    }
}

/// Two-way binding between the form and the host fields
///
/// ## Lifecycle
///
/// 1. Create with [`FormController::new()`] inside a tokio runtime
/// 2. Drive with the `change_*` handlers
/// 3. Render with [`FormController::view()`]
/// 4. Finish with [`FormController::unmount()`] to drain outstanding writes,
///    or drop it and let queued writes complete in the background
pub struct FormController {
    shape: OptionShape,
    fields: FieldNames,
    state: FormState,
    writer: FieldWriter,
}

impl FormController {
    /// Mount a controller over a field store
    ///
    /// # Returns
    ///
    /// A tuple of (controller, event_receiver) where event_receiver yields
    /// write events
    pub fn new(
        store: Arc<dyn FieldStore>,
        config: WidgetConfig,
    ) -> Result<(Self, mpsc::Receiver<WriteEvent>)> {
        config.validate()?;

        let fields = config.resolved_fields();
        let state = FormState::load(store.as_ref(), &fields, config.option_shape);
        info!(
            "Mounted video form: platform={:?}, video_id={:?}, options={}",
            state.platform.as_str(),
            state.video_id,
            if state.options.is_some() { "set" } else { "absent" }
        );

        let (writer, events) = FieldWriter::spawn(store, config.event_channel_capacity)?;

        let controller = Self {
            shape: config.option_shape,
            fields,
            state,
            writer,
        };

        Ok((controller, events))
    }

    /// Current local state
    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn platform(&self) -> &Platform {
        &self.state.platform
    }

    pub fn video_id(&self) -> &str {
        &self.state.video_id
    }

    pub fn options(&self) -> Option<&OptionSet> {
        self.state.options.as_ref()
    }

    pub fn option_shape(&self) -> OptionShape {
        self.shape
    }

    pub fn field_names(&self) -> &FieldNames {
        &self.fields
    }

    /// Change the platform
    ///
    /// Instagram clears the option set; any other value resets it to an
    /// empty structure. The option write is queued before the platform
    /// write. Returns the handle of the platform write.
    pub fn change_platform(&mut self, value: impl Into<String>) -> PendingWrite {
        let value = value.into();
        debug!("Platform changed to {:?}", value);

        self.state.platform = Platform::from(value.as_str());

        let options = match self.state.platform {
            Platform::Instagram => None,
            _ => Some(OptionSet::empty(self.shape)),
        };
        let stored = options.as_ref().map(OptionSet::to_value);
        self.state.options = options;
        self.writer.enqueue(&self.fields.options, stored);

        self.writer
            .enqueue(&self.fields.platform, Some(Value::String(value)))
    }

    /// Change the video identifier
    pub fn change_video_id(&mut self, value: impl Into<String>) -> PendingWrite {
        let value = value.into();
        debug!("Video id changed to {:?}", value);

        self.state.video_id = value.clone();
        self.writer
            .enqueue(&self.fields.video_id, Some(Value::String(value)))
    }

    /// Change one player option
    ///
    /// The option name is not checked against the catalog. Selecting
    /// [`OptionSelection::Default`] removes the option.
    pub fn change_option(
        &mut self,
        name: &str,
        selection: impl Into<OptionSelection>,
    ) -> PendingWrite {
        let selection = selection.into();
        if catalog::lookup(name).is_none() {
            debug!("Option {} is not in the catalog, storing it anyway", name);
        }
        debug!("Option {} changed to {:?}", name, selection);

        let shape = self.shape;
        let options = self
            .state
            .options
            .get_or_insert_with(|| OptionSet::empty(shape));
        options.apply(name, selection);

        let stored = options.to_value();
        self.writer.enqueue(&self.fields.options, Some(stored))
    }

    /// Sync status of a field by name
    pub fn sync_status(&self, field: &str) -> FieldSync {
        self.writer.status(field)
    }

    /// Sync status of the three bound fields, in form order
    pub fn sync_report(&self) -> Vec<(String, FieldSync)> {
        [
            &self.fields.platform,
            &self.fields.video_id,
            &self.fields.options,
        ]
        .into_iter()
        .map(|field| (field.clone(), self.writer.status(field)))
        .collect()
    }

    /// Unmount the widget, waiting for every queued write to settle
    pub async fn unmount(self) -> Result<()> {
        info!("Unmounting video form");
        self.writer.drain().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryFieldStore;
    use serde_json::json;

    fn mount(store: &MemoryFieldStore, shape: OptionShape) -> FormController {
        let (controller, _events) =
            FormController::new(Arc::new(store.clone()), WidgetConfig::new(shape)).unwrap();
        controller
    }

    #[tokio::test]
    async fn test_load_defaults_when_fields_absent() {
        let store = MemoryFieldStore::new();
        let controller = mount(&store, OptionShape::Split);

        assert_eq!(controller.state(), &FormState::default());
        controller.unmount().await.unwrap();
    }

    #[tokio::test]
    async fn test_load_uses_values_as_is() {
        let store = MemoryFieldStore::with_fields([
            ("platform", json!("vimeo")),
            ("videoId", json!(42)),
            ("options", json!({ "loop": 1, "start": "30" })),
        ]);
        let controller = mount(&store, OptionShape::Flat);

        assert_eq!(controller.platform(), &Platform::Other("vimeo".to_string()));
        assert_eq!(controller.video_id(), "42");
        let options = controller.options().unwrap();
        assert_eq!(options.get("loop"), Some(&json!(1)));
        assert_eq!(options.get("start"), Some(&json!("30")));
        controller.unmount().await.unwrap();
    }

    #[tokio::test]
    async fn test_local_echo_is_immediate() {
        let store = MemoryFieldStore::new();
        let mut controller = mount(&store, OptionShape::Split);

        let pending = controller.change_video_id("dQw4w9WgXcQ");
        assert_eq!(controller.video_id(), "dQw4w9WgXcQ");
        assert_eq!(pending.field(), "videoId");

        pending.settled().await.unwrap();
        assert_eq!(store.get_value("videoId"), Some(json!("dQw4w9WgXcQ")));
        controller.unmount().await.unwrap();
    }

    #[tokio::test]
    async fn test_option_change_without_option_set_starts_empty() {
        let store = MemoryFieldStore::with_fields([("platform", json!("instagram"))]);
        let mut controller = mount(&store, OptionShape::Split);
        assert!(controller.options().is_none());

        controller.change_option("autoplay", "1");
        controller.unmount().await.unwrap();

        assert_eq!(
            store.get_value("youtubeOptions"),
            Some(json!({ "default": { "autoplay": "1" }, "custom": {} }))
        );
    }
}
