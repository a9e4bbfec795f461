//! Form view-model
//!
//! A [`FormView`] is derived from controller state on demand and holds
//! everything a toolkit needs to draw the form. `Display` renders it as
//! plain text for line-oriented hosts.

use crate::catalog::{self, CatalogEntry, CatalogGroup};
use crate::config::OptionShape;
use crate::controller::{FieldSync, FormController, FormState};
use crate::model::{DEFAULT_CHOICE, OptionSet};
use std::fmt;

pub const FORM_TITLE: &str = "Video Extension";
pub const PLAYER_OPTIONS_HEADING: &str = "Player Options";
pub const VIDEO_ID_PLACEHOLDER: &str = "video id";

const PLATFORM_CHOICES: &[(&str, &str)] = &[
    ("", "Select a Platform"),
    ("youtube", "Youtube"),
    ("instagram", "Instagram"),
];

/// One selectable choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
}

/// A select control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectView {
    pub name: String,
    pub choices: Vec<ChoiceView>,
    /// Bound value; may match none of the choices
    pub selected: String,
}

impl SelectView {
    /// Choice matching the bound value
    pub fn selected_choice(&self) -> Option<&ChoiceView> {
        self.choices.iter().find(|c| c.value == self.selected)
    }

    /// Whether the bound value matches an offered choice
    pub fn is_matched(&self) -> bool {
        self.selected_choice().is_some()
    }
}

/// Text input control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInputView {
    pub name: String,
    pub value: String,
    pub placeholder: String,
}

/// Player option selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSelectorView {
    pub group: CatalogGroup,
    pub select: SelectView,
}

/// Block of player option selectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerOptionsView {
    pub heading: String,
    pub selectors: Vec<OptionSelectorView>,
}

/// A field whose latest write failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncErrorView {
    pub field: String,
    pub error: String,
}

/// Complete form view-model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub title: String,
    pub platform: SelectView,
    pub video_id: TextInputView,
    /// Present only when the platform is exactly `youtube`
    pub player_options: Option<PlayerOptionsView>,
    pub sync_errors: Vec<SyncErrorView>,
}

impl FormView {
    /// Build the view for a state and option shape
    pub fn build(state: &FormState, shape: OptionShape, sync: &[(String, FieldSync)]) -> Self {
        let platform = SelectView {
            name: "platform-select".to_string(),
            choices: PLATFORM_CHOICES
                .iter()
                .map(|(value, label)| ChoiceView {
                    value: value.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            selected: state.platform.as_str().to_string(),
        };

        let video_id = TextInputView {
            name: "videoId-input".to_string(),
            value: state.video_id.clone(),
            placeholder: VIDEO_ID_PLACEHOLDER.to_string(),
        };

        let player_options = state.platform.has_player_options().then(|| PlayerOptionsView {
            heading: PLAYER_OPTIONS_HEADING.to_string(),
            selectors: catalog::entries(shape)
                .into_iter()
                .map(|(group, entry)| option_selector(group, entry, state.options.as_ref()))
                .collect(),
        });

        let sync_errors = sync
            .iter()
            .filter_map(|(field, status)| match status {
                FieldSync::Failed { error, .. } => Some(SyncErrorView {
                    field: field.clone(),
                    error: error.clone(),
                }),
                _ => None,
            })
            .collect();

        Self {
            title: FORM_TITLE.to_string(),
            platform,
            video_id,
            player_options,
            sync_errors,
        }
    }

    /// Selector for an option name, if the block is shown
    pub fn option_selector(&self, name: &str) -> Option<&OptionSelectorView> {
        self.player_options
            .as_ref()?
            .selectors
            .iter()
            .find(|s| s.select.name == name)
    }
}

fn option_selector(
    group: CatalogGroup,
    entry: &CatalogEntry,
    options: Option<&OptionSet>,
) -> OptionSelectorView {
    let mut choices = vec![ChoiceView {
        value: DEFAULT_CHOICE.to_string(),
        label: "Default".to_string(),
    }];
    choices.extend(entry.choices.iter().map(|choice| ChoiceView {
        value: choice.value.serialized(),
        label: choice.label.to_string(),
    }));

    let selected = options
        .and_then(|set| set.get(entry.name))
        .map(catalog::serialize_stored)
        .unwrap_or_else(|| DEFAULT_CHOICE.to_string());

    OptionSelectorView {
        group,
        select: SelectView {
            name: entry.name.to_string(),
            choices,
            selected,
        },
    }
}

impl FormController {
    /// Render the current state
    pub fn view(&self) -> FormView {
        FormView::build(self.state(), self.option_shape(), &self.sync_report())
    }
}

impl fmt::Display for SelectView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selected_choice() {
            Some(choice) => write!(f, "[{}]", choice.label)?,
            None => write!(f, "[? {:?}]", self.selected)?,
        }
        let labels: Vec<&str> = self.choices.iter().map(|c| c.label.as_str()).collect();
        write!(f, " ({})", labels.join(" | "))
    }
}

impl fmt::Display for FormView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  Platform*: {}", self.platform)?;
        if self.video_id.value.is_empty() {
            writeln!(f, "  Video Id*: <{}>", self.video_id.placeholder)?;
        } else {
            writeln!(f, "  Video Id*: {:?}", self.video_id.value)?;
        }

        if let Some(block) = &self.player_options {
            writeln!(f, "  {}", block.heading)?;
            for selector in &block.selectors {
                writeln!(f, "    {}: {}", selector.select.name, selector.select)?;
            }
        }

        for sync_error in &self.sync_errors {
            writeln!(f, "  ! {} not saved: {}", sync_error.field, sync_error.error)?;
        }

        Ok(())
    }
}
