//! Configuration types for subgraph clients.

use anyhow::{Context, Result};
use url::Url;

/// Public gateway serving subgraphs by deployment id.
pub const THE_GRAPH_GATEWAY: &str = "https://gateway.thegraph.com/";

/// Configuration for SubgraphClient
#[derive(Debug, Clone)]
pub struct SubgraphConfig {
    /// Gateway base URL, normally [`THE_GRAPH_GATEWAY`]
    pub gateway_url: Url,
    /// The Graph API key sent as a bearer token
    pub api_key: String,
    /// Id of the subgraph to query
    pub subgraph_id: String,
}

impl SubgraphConfig {
    /// Builds a configuration pointing at the public gateway.
    pub fn new(api_key: String, subgraph_id: String) -> Result<Self> {
        let gateway_url = Url::parse(THE_GRAPH_GATEWAY)?;
        Ok(Self {
            gateway_url,
            api_key,
            subgraph_id,
        })
    }

    /// Full query URL of the configured subgraph.
    pub fn endpoint(&self) -> Result<Url> {
        self.gateway_url
            .join(&format!("api/subgraphs/id/{}", self.subgraph_id))
            .with_context(|| format!("invalid subgraph id {:?}", self.subgraph_id))
    }
}
