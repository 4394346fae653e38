//! Process-environment configuration.
//!
//! A single typed read of the environment at process start, mirroring the
//! per-stage controllers' `os.getenv(name, default)` pattern. Missing
//! required values surface as `Error::Config`, which is fatal at stage
//! start (§7).

use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub bus_bootstrap_servers: Vec<String>,
    pub sasl_username: Option<String>,
    pub sasl_password: Option<String>,
    pub environment: String,
    pub service_name: String,
    pub max_workers: usize,
    pub inbound_events: Vec<String>,
    pub outbound_event: String,
    pub graph_db_uri: String,
    pub graph_db_user: String,
    pub graph_db_password: String,
    pub staging_store_uri: String,
    pub taxonomy_artifact_dir: PathBuf,
    pub tenant_topic_prefix: String,
    pub max_expansion_depth: u32,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn env_required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("missing required env var {name}")))
}

fn env_list(name: &str, default: &str) -> Vec<String> {
    env_or(name, default)
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

impl PipelineConfig {
    /// Load configuration for a stage named `service_env_prefix`, e.g.
    /// `PIPELINE_CONTROLLER` reads `KAFKA_PIPELINE_CONTROLLER_SERVICE` and
    /// `KAFKA_PIPELINE_CONTROLLER_MAX_WORKERS`.
    pub fn from_env(service_env_prefix: &str) -> Result<Self> {
        let max_workers_var = format!("KAFKA_{service_env_prefix}_MAX_WORKERS");
        let service_var = format!("KAFKA_{service_env_prefix}_SERVICE");
        let inbound_var = format!("KAFKA_{service_env_prefix}_INBOUND_EVENTS");
        let outbound_var = format!("KAFKA_{service_env_prefix}_OUTBOUND_EVENT");

        let max_workers: usize = env_or(&max_workers_var, "1")
            .parse()
            .map_err(|_| Error::Config(format!("{max_workers_var} must be a non-negative integer")))?;

        Ok(Self {
            bus_bootstrap_servers: env_list("KAFKA_BOOTSTRAP_SERVERS", "localhost:29092"),
            sasl_username: std::env::var("KAFKA_SASL_USERNAME").ok(),
            sasl_password: std::env::var("KAFKA_SASL_PASSWORD").ok(),
            environment: env_or("KAFKA_ENVIRONMENT", "dev"),
            service_name: env_required(&service_var)?,
            max_workers,
            inbound_events: env_list(&inbound_var, ""),
            outbound_event: env_or(&outbound_var, ""),
            graph_db_uri: env_or("GRAPH_DB_URI", "bolt://localhost:7687"),
            graph_db_user: env_or("GRAPH_DB_USER", "neo4j"),
            graph_db_password: env_or("GRAPH_DB_PASSWORD", "test"),
            staging_store_uri: env_or("STAGING_STORE_URI", "http://localhost:9200"),
            taxonomy_artifact_dir: PathBuf::from(env_or("TAXONOMY_ARTIFACT_DIR", "./taxonomies")),
            tenant_topic_prefix: env_or("TENANT_TOPIC_PREFIX", ""),
            max_expansion_depth: env_or("MAX_EXPANSION_DEPTH", "5")
                .parse()
                .map_err(|_| Error::Config("MAX_EXPANSION_DEPTH must be an integer".into()))?,
        })
    }
}
