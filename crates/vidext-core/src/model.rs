//! Data model: platform, option set and option selections

use crate::catalog::{self, CatalogGroup};
use crate::config::OptionShape;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Mapping of option name to stored value
pub type OptionMap = BTreeMap<String, Value>;

/// Selector value of the synthetic "Default" choice
pub const DEFAULT_CHOICE: &str = "default";

/// Video platform
///
/// Platform strings are not validated; anything other than the known
/// values is carried through as [`Platform::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Platform {
    /// `""`
    #[default]
    Unset,
    /// `"youtube"`
    Youtube,
    /// `"instagram"`
    Instagram,
    /// Any other string
    Other(String),
}

impl Platform {
    /// The persisted string for this platform
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Unset => "",
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Other(s) => s,
        }
    }

    /// Whether player options apply to this platform
    pub fn has_player_options(&self) -> bool {
        matches!(self, Platform::Youtube)
    }
}

impl From<&str> for Platform {
    fn from(s: &str) -> Self {
        match s {
            "" => Platform::Unset,
            "youtube" => Platform::Youtube,
            "instagram" => Platform::Instagram,
            other => Platform::Other(other.to_string()),
        }
    }
}

impl From<String> for Platform {
    fn from(s: String) -> Self {
        Platform::from(s.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selector choice for one option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSelection {
    /// The synthetic "Default" choice: the option is unset
    Default,
    /// A serialized option value
    Value(String),
}

impl OptionSelection {
    /// Parse a selector value, mapping `"default"` to [`OptionSelection::Default`]
    pub fn parse(s: &str) -> Self {
        if s == DEFAULT_CHOICE {
            OptionSelection::Default
        } else {
            OptionSelection::Value(s.to_string())
        }
    }
}

impl From<&str> for OptionSelection {
    fn from(s: &str) -> Self {
        OptionSelection::parse(s)
    }
}

/// Player option selections in one of the two persisted shapes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionSet {
    /// Flat mapping of option name to value
    Flat(OptionMap),
    /// Options split by catalog group
    ///
    /// Top-level keys other than the two groups are carried in `extra` and
    /// written back untouched.
    Split {
        default: OptionMap,
        custom: OptionMap,
        #[serde(flatten)]
        extra: OptionMap,
    },
}

impl OptionSet {
    /// An empty option set of the given shape
    pub fn empty(shape: OptionShape) -> Self {
        match shape {
            OptionShape::Flat => OptionSet::Flat(OptionMap::new()),
            OptionShape::Split => OptionSet::Split {
                default: OptionMap::new(),
                custom: OptionMap::new(),
                extra: OptionMap::new(),
            },
        }
    }

    /// Shape of this option set
    pub fn shape(&self) -> OptionShape {
        match self {
            OptionSet::Flat(_) => OptionShape::Flat,
            OptionSet::Split { .. } => OptionShape::Split,
        }
    }

    /// Interpret a stored field value as an option set of the given shape
    ///
    /// Unknown option names are kept. Returns `None` for `null` and for
    /// values that are not JSON objects.
    pub fn from_value(shape: OptionShape, value: &Value) -> Option<Self> {
        let object = match value {
            Value::Null => return None,
            Value::Object(object) => object,
            other => {
                warn!("Ignoring option set that is not an object: {}", other);
                return None;
            }
        };

        match shape {
            OptionShape::Flat => Some(OptionSet::Flat(
                object
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )),
            OptionShape::Split => Some(OptionSet::Split {
                default: split_half(object, "default"),
                custom: split_half(object, "custom"),
                extra: object
                    .iter()
                    .filter(|(k, _)| !matches!(k.as_str(), "default" | "custom"))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            }),
        }
    }

    /// Persisted JSON form
    pub fn to_value(&self) -> Value {
        match self {
            OptionSet::Flat(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            ),
            OptionSet::Split {
                default,
                custom,
                extra,
            } => {
                let mut object: serde_json::Map<String, Value> =
                    extra.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                object.insert("default".to_string(), group_value(default));
                object.insert("custom".to_string(), group_value(custom));
                Value::Object(object)
            }
        }
    }

    /// Stored value for an option name
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            OptionSet::Flat(map) => map.get(name),
            OptionSet::Split {
                default, custom, ..
            } => match catalog::group_of(name) {
                CatalogGroup::Default => default.get(name).or_else(|| custom.get(name)),
                CatalogGroup::Custom => custom.get(name).or_else(|| default.get(name)),
            },
        }
    }

    /// Set an option, routing it to its catalog group in the split shape
    pub fn set(&mut self, name: &str, value: Value) {
        self.target_mut(name).insert(name.to_string(), value);
    }

    /// Remove an option, clearing it from both groups in the split shape
    ///
    /// Returns the value [`get`](Self::get) reported before the removal.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let previous = self.get(name).cloned();
        match self {
            OptionSet::Flat(map) => {
                map.remove(name);
            }
            OptionSet::Split {
                default, custom, ..
            } => {
                default.remove(name);
                custom.remove(name);
            }
        }
        previous
    }

    /// Apply a selector choice
    pub fn apply(&mut self, name: &str, selection: OptionSelection) {
        match selection {
            OptionSelection::Value(value) => self.set(name, Value::String(value)),
            OptionSelection::Default => {
                self.remove(name);
            }
        }
    }

    /// Whether no option is set
    pub fn is_empty(&self) -> bool {
        match self {
            OptionSet::Flat(map) => map.is_empty(),
            OptionSet::Split {
                default, custom, ..
            } => default.is_empty() && custom.is_empty(),
        }
    }

    fn target_mut(&mut self, name: &str) -> &mut OptionMap {
        match self {
            OptionSet::Flat(map) => map,
            OptionSet::Split {
                default, custom, ..
            } => match catalog::group_of(name) {
                CatalogGroup::Default => default,
                CatalogGroup::Custom => custom,
            },
        }
    }
}

fn group_value(group: &OptionMap) -> Value {
    Value::Object(group.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

fn split_half(object: &serde_json::Map<String, Value>, key: &str) -> OptionMap {
    match object.get(key) {
        None | Some(Value::Null) => OptionMap::new(),
        Some(Value::Object(half)) => half.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(other) => {
            warn!("Ignoring option group '{}' that is not an object: {}", key, other);
            OptionMap::new()
        }
    }
}
