//! Configuration types for the widget
//!
//! This module defines the configuration structures used by the controller.

use serde::{Deserialize, Serialize};

/// Main widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Persisted shape of the option set
    #[serde(default)]
    pub option_shape: OptionShape,

    /// Field name overrides (defaults depend on the option shape)
    #[serde(default)]
    pub fields: Option<FieldNames>,

    /// Capacity of the write event channel
    ///
    /// When full, new events are dropped (with a warning log) so the
    /// writer never blocks on a slow consumer.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl WidgetConfig {
    /// Create a configuration for the given option shape
    pub fn new(option_shape: OptionShape) -> Self {
        Self {
            option_shape,
            fields: None,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Override the field names
    pub fn with_fields(mut self, fields: FieldNames) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Set the event channel capacity
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// Field names in effect, falling back to the shape defaults
    pub fn resolved_fields(&self) -> FieldNames {
        self.fields
            .clone()
            .unwrap_or_else(|| FieldNames::for_shape(self.option_shape))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "Event channel capacity must be > 0",
            ));
        }

        self.resolved_fields().validate()
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self::new(OptionShape::default())
    }
}

/// Persisted shape of the option set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionShape {
    /// Single flat mapping of option name to value
    Flat,
    /// `{ "default": {...}, "custom": {...} }`
    #[default]
    Split,
}

impl OptionShape {
    /// Parse a shape name (`flat` or `split`)
    pub fn parse(s: &str) -> Result<Self, crate::Error> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Ok(OptionShape::Flat),
            "split" => Ok(OptionShape::Split),
            other => Err(crate::Error::config(format!(
                "Unknown option shape '{}'. Valid shapes: flat, split",
                other
            ))),
        }
    }
}

/// Names of the three host fields the widget binds to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    #[serde(default = "default_platform_field")]
    pub platform: String,

    #[serde(default = "default_video_id_field")]
    pub video_id: String,

    /// Option set field; defaults to `options` (flat) or `youtubeOptions` (split)
    pub options: String,
}

impl FieldNames {
    /// Default field names for an option shape
    pub fn for_shape(shape: OptionShape) -> Self {
        let options = match shape {
            OptionShape::Flat => "options",
            OptionShape::Split => "youtubeOptions",
        };

        Self {
            platform: default_platform_field(),
            video_id: default_video_id_field(),
            options: options.to_string(),
        }
    }

    /// Validate that names are present and distinct
    pub fn validate(&self) -> Result<(), crate::Error> {
        let names = [&self.platform, &self.video_id, &self.options];

        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(crate::Error::config("Field names cannot be empty"));
        }

        if self.platform == self.video_id
            || self.platform == self.options
            || self.video_id == self.options
        {
            return Err(crate::Error::config(format!(
                "Field names must be distinct, got platform={}, video_id={}, options={}",
                self.platform, self.video_id, self.options
            )));
        }

        Ok(())
    }
}

fn default_platform_field() -> String {
    "platform".to_string()
}

fn default_video_id_field() -> String {
    "videoId".to_string()
}

fn default_event_channel_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fields_follow_shape() {
        let flat = WidgetConfig::new(OptionShape::Flat);
        assert_eq!(flat.resolved_fields().options, "options");

        let split = WidgetConfig::default();
        assert_eq!(split.option_shape, OptionShape::Split);
        assert_eq!(split.resolved_fields().options, "youtubeOptions");
        assert_eq!(split.resolved_fields().video_id, "videoId");
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let config = WidgetConfig::default().with_event_channel_capacity(0);
        assert!(config.validate().is_err());

        let clash = FieldNames {
            platform: "platform".to_string(),
            video_id: "platform".to_string(),
            options: "options".to_string(),
        };
        assert!(WidgetConfig::default().with_fields(clash).validate().is_err());

        let empty = FieldNames {
            platform: " ".to_string(),
            ..FieldNames::for_shape(OptionShape::Split)
        };
        assert!(WidgetConfig::default().with_fields(empty).validate().is_err());

        assert!(WidgetConfig::default().validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: WidgetConfig =
            serde_json::from_str(r#"{ "option_shape": "flat" }"#).unwrap();
        assert_eq!(config.option_shape, OptionShape::Flat);
        assert_eq!(config.event_channel_capacity, 256);
        assert!(config.fields.is_none());

        let fields: FieldNames = serde_json::from_str(r#"{ "options": "opts" }"#).unwrap();
        assert_eq!(fields.platform, "platform");
        assert_eq!(fields.options, "opts");
    }

    #[test]
    fn test_parse_shape() {
        assert_eq!(OptionShape::parse("Flat").unwrap(), OptionShape::Flat);
        assert_eq!(OptionShape::parse("split").unwrap(), OptionShape::Split);
        assert!(OptionShape::parse("nested").is_err());
    }
}
