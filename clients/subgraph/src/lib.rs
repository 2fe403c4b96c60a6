//! Position sources backed by The Graph subgraphs.

mod client;
mod config;
mod positions;
mod sources;

pub use client::SubgraphClient;
pub use config::{SubgraphConfig, THE_GRAPH_GATEWAY};
pub use sources::{AerodromeSource, UniswapV3Source};
