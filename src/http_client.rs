use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// Auth header for the football API, empty when no key is configured so that
/// callers can still hit cached responses offline.
pub fn api_headers() -> Vec<(&'static str, String)> {
    match env::var("APP_FOOTBALL_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            vec![("x-apisports-key", key.trim().to_string())]
        }
        _ => Vec::new(),
    }
}
