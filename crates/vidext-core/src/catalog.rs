//! Static catalog of YouTube player options
//!
//! The catalog is compiled in and never persisted. Each entry names an
//! option and lists its selectable choices in display order.

use crate::config::OptionShape;
use serde_json::Value;
use std::fmt;

/// Stored value of a catalog choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogValue {
    /// Numeric flag (0 or 1)
    Flag(u8),
    /// Text value such as a color name
    Text(&'static str),
}

impl CatalogValue {
    /// The serialized form used by selectors and written to the option set
    pub fn serialized(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CatalogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogValue::Flag(n) => write!(f, "{}", n),
            CatalogValue::Text(s) => f.write_str(s),
        }
    }
}

/// One selectable (label, value) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogChoice {
    pub label: &'static str,
    pub value: CatalogValue,
}

/// A named option and its choices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub choices: &'static [CatalogChoice],
}

impl CatalogEntry {
    /// Find the choice whose serialized value equals `value`
    pub fn choice_for(&self, value: &str) -> Option<&'static CatalogChoice> {
        self.choices
            .iter()
            .find(|choice| choice.value.serialized() == value)
    }
}

/// Which half of the split option set an option belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogGroup {
    Default,
    Custom,
}

const fn choice(label: &'static str, value: CatalogValue) -> CatalogChoice {
    CatalogChoice { label, value }
}

/// Options the player understands natively
pub static DEFAULT_OPTIONS: &[CatalogEntry] = &[
    CatalogEntry {
        name: "autoplay",
        choices: &[
            choice("No Auto Play", CatalogValue::Flag(0)),
            choice("Auto Play", CatalogValue::Flag(1)),
        ],
    },
    CatalogEntry {
        name: "color",
        choices: &[
            choice("white", CatalogValue::Text("white")),
            choice("red", CatalogValue::Text("red")),
        ],
    },
    CatalogEntry {
        name: "controls",
        choices: &[
            choice("Enable Controls", CatalogValue::Flag(1)),
            choice("Disable Controls", CatalogValue::Flag(0)),
        ],
    },
    CatalogEntry {
        name: "loop",
        choices: &[
            choice("SinglePlay", CatalogValue::Flag(0)),
            choice("Loop", CatalogValue::Flag(1)),
        ],
    },
];

/// Options applied by the embedding site rather than the player URL
pub static CUSTOM_OPTIONS: &[CatalogEntry] = &[CatalogEntry {
    name: "mute",
    choices: &[
        choice("Sound On", CatalogValue::Flag(0)),
        choice("Muted", CatalogValue::Flag(1)),
    ],
}];

/// Look up an option by name across both groups
pub fn lookup(name: &str) -> Option<(CatalogGroup, &'static CatalogEntry)> {
    DEFAULT_OPTIONS
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| (CatalogGroup::Default, entry))
        .or_else(|| {
            CUSTOM_OPTIONS
                .iter()
                .find(|entry| entry.name == name)
                .map(|entry| (CatalogGroup::Custom, entry))
        })
}

/// Group an option name is routed to in the split shape
///
/// Anything outside the default catalog, including unknown names, is custom.
pub fn group_of(name: &str) -> CatalogGroup {
    if DEFAULT_OPTIONS.iter().any(|entry| entry.name == name) {
        CatalogGroup::Default
    } else {
        CatalogGroup::Custom
    }
}

/// Catalog entries offered for a given option shape, in display order
///
/// The flat shape predates the custom group and only offers default options.
pub fn entries(shape: OptionShape) -> Vec<(CatalogGroup, &'static CatalogEntry)> {
    let defaults = DEFAULT_OPTIONS
        .iter()
        .map(|entry| (CatalogGroup::Default, entry));

    match shape {
        OptionShape::Flat => defaults.collect(),
        OptionShape::Split => defaults
            .chain(
                CUSTOM_OPTIONS
                    .iter()
                    .map(|entry| (CatalogGroup::Custom, entry)),
            )
            .collect(),
    }
}

/// Serialized selector form of a stored option value
///
/// Stored values may be strings (written by the widget) or numbers (written
/// by older tooling); both compare against catalog values as text.
pub fn serialize_stored(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
