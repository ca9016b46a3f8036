//! Personality label -> keyword query -> catalog results.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use super::{BookCatalog, BookListing, BookSummary, VolumeDetail, VolumeInfo};
use crate::config::CatalogConfig;
use crate::error::Result;

/// Immutable label -> search keyword mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    keywords: BTreeMap<String, Vec<String>>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        let defaults: [(&str, &[&str]); 5] = [
            ("The Thinker", &["psychology", "logical", "thinking"]),
            ("The Explorer", &["adventure", "discovery", "travel"]),
            ("The Dreamer", &["creativity", "imagination", "inspiration"]),
            ("The Strategist", &["strategy", "leadership", "planning"]),
            (
                Self::FALLBACK_LABEL,
                &["personal", "development", "self", "improvement"],
            ),
        ];
        Self {
            keywords: defaults
                .into_iter()
                .map(|(label, words)| {
                    (
                        label.to_string(),
                        words.iter().map(|w| w.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl KeywordTable {
    pub const FALLBACK_LABEL: &'static str = "General";

    pub fn new(keywords: BTreeMap<String, Vec<String>>) -> Self {
        Self { keywords }
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.keywords
    }

    /// Keywords for a label; unknown labels use the `General` entry.
    pub fn keywords_for(&self, label: &str) -> &[String] {
        self.keywords
            .get(label)
            .or_else(|| self.keywords.get(Self::FALLBACK_LABEL))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn query_for(&self, label: &str) -> String {
        self.keywords_for(label).join(" ")
    }
}

/// Turns personality labels and categories into catalog lookups.
#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<dyn BookCatalog>,
    keywords: KeywordTable,
    recommend_max_results: u32,
    search_max_results: u32,
}

impl Recommender {
    pub fn new(
        catalog: Arc<dyn BookCatalog>,
        keywords: KeywordTable,
        recommend_max_results: u32,
        search_max_results: u32,
    ) -> Self {
        Self {
            catalog,
            keywords,
            recommend_max_results,
            search_max_results,
        }
    }

    pub fn from_config(catalog: Arc<dyn BookCatalog>, config: &CatalogConfig) -> Self {
        Self::new(
            catalog,
            KeywordTable::new(config.keywords.clone()),
            config.recommend_max_results,
            config.search_max_results,
        )
    }

    async fn volumes_for_label(&self, label: &str) -> Result<Vec<VolumeInfo>> {
        let query = self.keywords.query_for(label);
        let volumes = self
            .catalog
            .search_volumes(&query, self.recommend_max_results)
            .await?;
        info!(
            "Recommendation lookup for {:?} returned {} books",
            label,
            volumes.len()
        );
        Ok(volumes)
    }

    pub async fn recommend_by_personality(&self, label: &str) -> Result<Vec<BookSummary>> {
        let volumes = self.volumes_for_label(label).await?;
        Ok(volumes.into_iter().map(BookSummary::from).collect())
    }

    pub async fn volumes_for_personality(&self, label: &str) -> Result<Vec<VolumeDetail>> {
        let volumes = self.volumes_for_label(label).await?;
        Ok(volumes.into_iter().map(VolumeDetail::from).collect())
    }

    pub async fn search_by_category(&self, category: &str) -> Result<Vec<BookListing>> {
        let volumes = self
            .catalog
            .search_volumes(category, self.search_max_results)
            .await?;
        Ok(volumes.into_iter().map(BookListing::from).collect())
    }
}
