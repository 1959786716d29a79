//! Paper Proxy
//!
//! A read-only HTTP gateway over PubMed (NCBI E-utilities) and arXiv.
//! Both sources are normalized into one [`Paper`](models::Paper) record so
//! downstream consumers never see upstream XML, Atom or MEDLINE payloads.
//!
//! # Features
//!
//! - **Single-paper fetch**: PubMed by PMID with PMC full text, arXiv by id with optional PDF text
//! - **Search**: free-text search against either source, returning partial records
//! - **Best-effort enrichment**: full-text failures degrade to an empty field
//!
//! # Example
//!
//! ```no_run
//! use paper_proxy::{Config, SourceRegistry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let sources = SourceRegistry::new(&config)?;
//!
//!     let paper = sources.pubmed().fetch_by_pmid("31452104").await?;
//!     println!("{}", paper.title);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod sources;
pub mod text;
pub mod xml;

pub use client::UpstreamClient;
pub use config::Config;
pub use error::{ClientError, GatewayError};
pub use sources::{PaperSource, SourceRegistry};
