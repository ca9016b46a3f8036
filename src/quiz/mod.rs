//! Quiz module: categories, rule tables, and the personality scorer.
//! Deterministic and pure; every table is built once and shared read-only.

pub mod labels;
pub mod rules;

use labels::LabelTable;
use rules::RuleTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The four personality buckets, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Thinker,
    Explorer,
    Dreamer,
    Strategist,
}

impl Category {
    /// Declaration order; the first maximum in this order wins a tie.
    pub const ALL: [Category; 4] = [
        Category::Thinker,
        Category::Explorer,
        Category::Dreamer,
        Category::Strategist,
    ];
}

/// Per-category tallies. Field order is the serialized key order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreVector {
    pub thinker: u32,
    pub explorer: u32,
    pub dreamer: u32,
    pub strategist: u32,
}

impl ScoreVector {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Thinker => self.thinker,
            Category::Explorer => self.explorer,
            Category::Dreamer => self.dreamer,
            Category::Strategist => self.strategist,
        }
    }

    fn increment(&mut self, category: Category) {
        let slot = match category {
            Category::Thinker => &mut self.thinker,
            Category::Explorer => &mut self.explorer,
            Category::Dreamer => &mut self.dreamer,
            Category::Strategist => &mut self.strategist,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Category with the highest count; ties go to the earliest in `Category::ALL`.
    pub fn dominant(&self) -> Category {
        let mut best = Category::ALL[0];
        for category in Category::ALL.into_iter().skip(1) {
            // strict comparison keeps the earlier category on ties
            if self.get(category) > self.get(best) {
                best = category;
            }
        }
        best
    }
}

/// Final quiz result as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityResult {
    #[serde(rename = "type")]
    pub label: String,
    pub score: ScoreVector,
}

/// Scores answer sets against a rule table and names the winner via a label table.
#[derive(Debug, Clone)]
pub struct Scorer {
    rules: RuleTable,
    labels: LabelTable,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(RuleTable::canonical(), LabelTable::default())
    }
}

impl Scorer {
    pub fn new(rules: RuleTable, labels: LabelTable) -> Self {
        Self { rules, labels }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Tally every recognized (question, answer) pair. Unknown questions and
    /// unknown answers are skipped without error.
    pub fn score<'a, I>(&self, answers: I) -> PersonalityResult
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut score = ScoreVector::default();
        for (question, answer) in answers {
            if let Some(category) = self.rules.category_for(question, answer) {
                score.increment(category);
            }
        }

        let winner = score.dominant();
        PersonalityResult {
            label: self.labels.label_for(winner).to_string(),
            score,
        }
    }

    /// Convenience wrapper over [`Scorer::score`] for an owned answer map.
    pub fn score_map(&self, answers: &HashMap<String, String>) -> PersonalityResult {
        self.score(answers.iter().map(|(q, a)| (q.as_str(), a.as_str())))
    }
}
