//! Host mount gate
//!
//! Hosts load the widget in several places; it only renders as a full
//! entry editor. Everywhere else it mounts nothing.

use crate::config::WidgetConfig;
use crate::controller::{FormController, WriteEvent};
use crate::error::{Error, Result};
use crate::traits::FieldStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Where the host is loading the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostLocation {
    EntryEditor,
    EntryField,
    EntrySidebar,
    Dialog,
    Page,
}

impl HostLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostLocation::EntryEditor => "entry-editor",
            HostLocation::EntryField => "entry-field",
            HostLocation::EntrySidebar => "entry-sidebar",
            HostLocation::Dialog => "dialog",
            HostLocation::Page => "page",
        }
    }
}

impl fmt::Display for HostLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "entry-editor" => Ok(HostLocation::EntryEditor),
            "entry-field" => Ok(HostLocation::EntryField),
            "entry-sidebar" => Ok(HostLocation::EntrySidebar),
            "dialog" => Ok(HostLocation::Dialog),
            "page" => Ok(HostLocation::Page),
            other => Err(Error::invalid_input(format!(
                "Unknown host location '{}'. Valid locations: entry-editor, entry-field, entry-sidebar, dialog, page",
                other
            ))),
        }
    }
}

/// A mounted widget: the controller and its write events
pub struct MountedWidget {
    pub controller: FormController,
    pub events: mpsc::Receiver<WriteEvent>,
}

/// Mount the widget if the host location is the entry editor
///
/// # Returns
///
/// - `Ok(Some(MountedWidget))`: Mounted
/// - `Ok(None)`: Location does not show the widget
/// - `Err(Error)`: Invalid configuration or no runtime
pub fn mount(
    location: HostLocation,
    store: Arc<dyn FieldStore>,
    config: WidgetConfig,
) -> Result<Option<MountedWidget>> {
    if location != HostLocation::EntryEditor {
        debug!("Not mounting video form at location {}", location);
        return Ok(None);
    }

    let (controller, events) = FormController::new(store, config)?;
    Ok(Some(MountedWidget { controller, events }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryFieldStore;

    #[test]
    fn test_location_parsing() {
        assert_eq!(
            "entry-editor".parse::<HostLocation>().unwrap(),
            HostLocation::EntryEditor
        );
        assert_eq!(" Dialog ".parse::<HostLocation>().unwrap(), HostLocation::Dialog);
        assert!("sidebar".parse::<HostLocation>().is_err());

        for location in [
            HostLocation::EntryEditor,
            HostLocation::EntryField,
            HostLocation::EntrySidebar,
            HostLocation::Dialog,
            HostLocation::Page,
        ] {
            assert_eq!(location.as_str().parse::<HostLocation>().unwrap(), location);
        }
    }

    #[tokio::test]
    async fn test_mount_only_in_entry_editor() {
        let store: Arc<dyn FieldStore> = Arc::new(MemoryFieldStore::new());

        for location in [
            HostLocation::EntryField,
            HostLocation::EntrySidebar,
            HostLocation::Dialog,
            HostLocation::Page,
        ] {
            let mounted = mount(location, Arc::clone(&store), WidgetConfig::default()).unwrap();
            assert!(mounted.is_none(), "{} should not mount", location);
        }

        let mounted = mount(HostLocation::EntryEditor, store, WidgetConfig::default())
            .unwrap()
            .expect("entry editor mounts");
        mounted.controller.unmount().await.unwrap();
    }
}
