pub mod accounts;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod quiz;

use anyhow::Result;
use std::sync::Arc;

use accounts::{AccountStore, password::PasswordHashing};
use catalog::{google::GoogleBooksClient, recommend::Recommender};
use config::Config;
use http::AppState;
use quiz::Scorer;

/// Build the shared handler state: tables, catalog client, and account store.
pub fn build_state(config: &Config) -> Result<AppState> {
    let catalog = GoogleBooksClient::new(
        &config.catalog,
        config.runtime.google_books_api_key.clone(),
    )?;
    if config.runtime.google_books_api_key.is_none() {
        tracing::info!("GOOGLE_BOOKS_API_KEY not set; catalog requests are unauthenticated");
    }

    let recommender = Recommender::from_config(Arc::new(catalog), &config.catalog);
    let hashing = PasswordHashing::new(&config.auth)?;
    let accounts = AccountStore::open(&config.runtime.database_path, hashing)?;

    Ok(AppState {
        scorer: Arc::new(Scorer::default()),
        recommender: Arc::new(recommender),
        accounts,
    })
}
