//! Minimal GraphQL client for The Graph gateway.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::SubgraphConfig;

#[derive(Serialize)]
struct GraphQuery<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphError>>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

/// Sends GraphQL queries to one subgraph.
///
/// Cloning is cheap and clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl SubgraphClient {
    pub fn new(client: Client, config: SubgraphConfig) -> Result<Self> {
        let endpoint = config.endpoint()?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Runs `query` with `variables` and decodes its `data` member.
    pub async fn query<V, T>(&self, query: &str, variables: V) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        debug!(endpoint = %self.endpoint, "subgraph query");
        let response: GraphResponse<T> = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&GraphQuery { query, variables })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decode subgraph response")?;

        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            bail!("subgraph errors: {}", messages.join("; "));
        }

        response
            .data
            .ok_or_else(|| anyhow!("subgraph response has no data"))
    }
}
