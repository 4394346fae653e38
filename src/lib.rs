//! # kg-discovery-pipeline — event-driven knowledge-graph discovery
//!
//! A taxonomy-driven search planner, an event-pipeline runtime, and a
//! graph-write projector, wired together around a small shared data model.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `TaxonomyStore`, `EventConsumer`/`EventProducer`,
//!    `Handler`, `GraphDatabase`, `DocumentStream` are the seams between
//!    this crate's logic and whatever backs it in a real deployment.
//! 2. **Clean DTOs**: `Value`, `PropertyMap`, `TaxonomyNode`,
//!    `CloudEvent` cross every module boundary.
//! 3. **Append-only layering**: a `Search` only ever adds constraints on
//!    top of its `Taxonomy`; the taxonomy itself is loaded once and never
//!    mutated.
//! 4. **Bounded concurrency everywhere**: the pipeline stage caps in-flight
//!    handlers with a semaphore; the graph writer caps buffered writes with
//!    a chunk size.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kg_discovery_pipeline::taxonomy::{Taxonomy, TaxonomyNode, TaxonomyNodeId, NodeType};
//! use kg_discovery_pipeline::taxonomy::search::Search;
//! use kg_discovery_pipeline::planner::{plan_expansion_queries, DataSource};
//!
//! # fn example() -> kg_discovery_pipeline::Result<()> {
//! let start = TaxonomyNode::new("p1", NodeType::Person);
//! let taxonomy = std::sync::Arc::new(Taxonomy::new(
//!     "t1", "people", TaxonomyNodeId::from("p1"), vec![start], vec![], vec![], vec![],
//! )?);
//! let search = Search::new("s1", taxonomy);
//! let queries = plan_expansion_queries(&search, &[DataSource::DataScraper]);
//! let _ = queries;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod graphdb;
pub mod graphwrite;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod planner;
pub mod taxonomy;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use model::{PropertyMap, Value};
