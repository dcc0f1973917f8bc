//! Key bindings with help text.

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A set of keys that trigger one action.
#[derive(Debug, Clone)]
pub struct Binding {
    pub keys: Vec<(KeyCode, KeyModifiers)>,
    pub help: String,
    pub description: String,
}

impl Binding {
    /// Binds plain (unmodified) keys.
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self {
            keys: keys.into_iter().map(|k| (k, KeyModifiers::NONE)).collect(),
            help: String::new(),
            description: String::new(),
        }
    }

    /// Adds a key that must be pressed with `modifiers`.
    pub fn with_modified(mut self, key: KeyCode, modifiers: KeyModifiers) -> Self {
        self.keys.push((key, modifiers));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>, description: impl Into<String>) -> Self {
        self.help = help.into();
        self.description = description.into();
        self
    }

    /// True when the key press matches one of the bound keys.
    ///
    /// Shift is ignored for character keys, since terminals report it
    /// inconsistently for printable characters.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        let pressed = match msg.key {
            KeyCode::Char(_) => msg.modifiers.difference(KeyModifiers::SHIFT),
            _ => msg.modifiers,
        };
        self.keys
            .iter()
            .any(|(code, modifiers)| *code == msg.key && *modifiers == pressed)
    }

    /// `"key description"` for a help line.
    pub fn help_view(&self) -> String {
        format!("{} {}", self.help, self.description)
    }
}
