//! HTTP client for the published dataset.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::dataset::ReferenceDataset;
use crate::error::DatasetError;

/// Where the dataset is published.
pub const DEFAULT_DATASET_URL: &str = "https://cmu-student-government.github.io/fce-data/fce.json";

/// Fetches and parses the reference dataset. One request per `load`, no retries.
#[derive(Debug, Clone)]
pub struct DatasetClient {
    client: Client,
    url: Url,
    aliases: BTreeMap<String, String>,
}

impl DatasetClient {
    /// Create a client for `url` with a request timeout.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, DatasetError> {
        let url = Url::parse(url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fceplus/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url,
            aliases: BTreeMap::new(),
        })
    }

    /// Renumbered-course aliases (`new → old`) applied after parsing.
    pub fn with_aliases(mut self, aliases: BTreeMap<String, String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch and parse the dataset.
    pub async fn load(&self) -> Result<ReferenceDataset, DatasetError> {
        debug!(url = %self.url, "Fetching reference dataset");

        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DatasetError::Status {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.text().await?;
        let dataset = ReferenceDataset::parse(&body)?.with_aliases(&self.aliases);
        info!(entries = dataset.len(), "Reference dataset loaded");
        Ok(dataset)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
