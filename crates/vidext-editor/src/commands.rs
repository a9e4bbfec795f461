//! Line commands understood by the editor

use anyhow::{Result, bail};

pub const HELP: &str = "\
Commands:
  platform [value]                 set platform (youtube, instagram, or empty)
  video-id [text]                  set the video id (rest of the line)
  option <name> <value|default>    set a player option
  show                             print the form
  status                           print field sync status
  help                             print this help
  quit | exit                      save pending writes and exit";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Platform(String),
    VideoId(String),
    Option { name: String, value: String },
    Show,
    Status,
    Help,
    Quit,
    /// Blank line
    Nothing,
}

impl Command {
    /// Parse one input line
    ///
    /// Values are taken verbatim after the first separating space, so an
    /// empty or padded video id can be entered.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.trim().is_empty() {
            return Ok(Command::Nothing);
        }

        let (word, rest) = match trimmed.split_once(' ') {
            Some((word, rest)) => (word, rest),
            None => (trimmed, ""),
        };

        match word {
            "platform" => Ok(Command::Platform(rest.trim().to_string())),
            "video-id" => Ok(Command::VideoId(rest.to_string())),
            "option" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(name), Some(value), None) => Ok(Command::Option {
                        name: name.to_string(),
                        value: value.to_string(),
                    }),
                    _ => bail!("Usage: option <name> <value|default>"),
                }
            }
            "show" => Ok(Command::Show),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => bail!("Unknown command '{}'. Type 'help' for a list.", other),
        }
    }
}
