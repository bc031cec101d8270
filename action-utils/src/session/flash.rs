//! Flash messages: one-time notices keyed by type

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Conventional flash types
///
/// Any string works as a flash type; these are the ones templates usually
/// style.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    /// Success message (green)
    Success,
    /// Informational message (blue)
    Info,
    /// Warning message (yellow)
    Warning,
    /// Error message (red)
    Error,
}

impl FlashLevel {
    /// Flash type string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// CSS class for this level
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Info => "flash-info",
            Self::Warning => "flash-warning",
            Self::Error => "flash-error",
        }
    }
}

impl std::fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messages grouped by flash type
///
/// Reading with [`get`](Self::get) or [`all`](Self::all) removes what was
/// read; [`peek`](Self::peek) leaves it for the next reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlashBag {
    messages: BTreeMap<String, Vec<String>>,
}

impl FlashBag {
    /// Empty bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message under `kind`
    pub fn add(&mut self, kind: impl Into<String>, message: impl Into<String>) {
        self.messages
            .entry(kind.into())
            .or_default()
            .push(message.into());
    }

    /// Messages under `kind` without removing them
    #[must_use]
    pub fn peek(&self, kind: &str) -> &[String] {
        self.messages.get(kind).map_or(&[], Vec::as_slice)
    }

    /// Every message without removing any
    #[must_use]
    pub const fn peek_all(&self) -> &BTreeMap<String, Vec<String>> {
        &self.messages
    }

    /// Remove and return the messages under `kind`
    pub fn get(&mut self, kind: &str) -> Vec<String> {
        self.messages.remove(kind).unwrap_or_default()
    }

    /// Remove and return every message
    pub fn all(&mut self) -> BTreeMap<String, Vec<String>> {
        std::mem::take(&mut self.messages)
    }

    /// Replace the messages under `kind`
    pub fn set(&mut self, kind: impl Into<String>, messages: Vec<String>) {
        let kind = kind.into();
        if messages.is_empty() {
            self.messages.remove(&kind);
        } else {
            self.messages.insert(kind, messages);
        }
    }

    /// Whether `kind` has any message
    #[must_use]
    pub fn has(&self, kind: &str) -> bool {
        self.messages.get(kind).is_some_and(|m| !m.is_empty())
    }

    /// Types that have messages
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// Whether the bag is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Remove everything, returning what was there
    pub fn clear(&mut self) -> BTreeMap<String, Vec<String>> {
        self.all()
    }
}
