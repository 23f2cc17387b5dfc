use serde::{Deserialize, Serialize};

use super::lenient;
use super::task::Task;

/// Glyph given to newly created projects
pub const DEFAULT_EMOJI: &str = "📁";

/// A project and its ordered tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Opaque id, assigned at creation and never changed
    #[serde(default = "lenient::new_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default = "default_emoji", deserialize_with = "emoji")]
    pub emoji: String,
    /// Palette slot chosen at creation. Stable across reorders, so a
    /// project keeps its colour wherever it is moved.
    #[serde(default, deserialize_with = "lenient::index")]
    pub color_idx: Option<usize>,
    /// Tasks in display order
    #[serde(default, deserialize_with = "lenient::tasks")]
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn new(name: String, color_idx: usize) -> Self {
        Project {
            id: lenient::new_id(),
            name,
            emoji: default_emoji(),
            color_idx: Some(color_idx),
            tasks: Vec::new(),
        }
    }
}

fn default_emoji() -> String {
    DEFAULT_EMOJI.to_string()
}

fn emoji<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let s = lenient::string(d)?;
    Ok(if s.is_empty() { default_emoji() } else { s })
}
