//! Entity discovery in catalog JSON: products (`p_…`) and resources
//! (`a_…` audio, `v_…` video).

mod dedup;
mod walk;

pub use dedup::unique_by_id;
pub use walk::{walk_entities, WalkOutcome, ID_KEYS, TITLE_KEYS};

use serde::{Deserialize, Serialize};

/// A product or resource record found in a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub title: Option<String>,
    /// The JSON object the entity was read from.
    pub raw: serde_json::Value,
}

impl Entity {
    pub fn title_len(&self) -> usize {
        self.title.as_deref().map_or(0, |t| t.chars().count())
    }

    /// Title if present and non-empty, else the id.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.id)
    }
}

/// Which id prefixes count as an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScope {
    /// Shop catalog: products / columns.
    Products,
    /// Items inside one product: audio and video resources.
    Resources,
}

impl IdScope {
    pub fn prefixes(self) -> &'static [&'static str] {
        match self {
            IdScope::Products => &["p_"],
            IdScope::Resources => &["a_", "v_"],
        }
    }
}
