//! Category -> archetype label table.

use super::Category;
use serde::Serialize;
use std::collections::HashMap;

/// Label returned when the winning category has no entry.
pub const GENERAL_LABEL: &str = "General";

#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: HashMap<Category, String>,
}

/// Archetype label with its short blurb.
#[derive(Debug, Clone, Serialize)]
pub struct Archetype {
    #[serde(rename = "type")]
    pub label: &'static str,
    pub description: &'static str,
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::from_pairs([
            (Category::Thinker, "The Thinker"),
            (Category::Explorer, "The Explorer"),
            (Category::Dreamer, "The Dreamer"),
            (Category::Strategist, "The Strategist"),
        ])
    }
}

impl LabelTable {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Category, S)>,
        S: Into<String>,
    {
        Self {
            labels: pairs.into_iter().map(|(c, s)| (c, s.into())).collect(),
        }
    }

    pub fn label_for(&self, category: Category) -> &str {
        self.labels
            .get(&category)
            .map(String::as_str)
            .unwrap_or(GENERAL_LABEL)
    }
}

/// Descriptions shown alongside each result label, `General` last.
pub fn archetypes() -> [Archetype; 5] {
    [
        Archetype {
            label: "The Thinker",
            description: "You are logical, analytical, and love solving complex problems.",
        },
        Archetype {
            label: "The Explorer",
            description: "You are adventurous, curious, and open to new experiences.",
        },
        Archetype {
            label: "The Dreamer",
            description: "You are imaginative, creative, and thrive on inspiration.",
        },
        Archetype {
            label: "The Strategist",
            description: "You plan carefully, think ahead, and enjoy mastering systems.",
        },
        Archetype {
            label: GENERAL_LABEL,
            description: "You have a balanced mix of curiosity and logic!",
        },
    ]
}
