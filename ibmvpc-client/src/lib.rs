//! IBM Cloud VPC API client
//!
//! A thin typed client for the subset of the VPC REST API the provider uses.
//!
//! ## Module Structure
//!
//! - `config` - Endpoint, region and credential configuration
//! - `auth` - IAM API key to bearer token exchange
//! - `api` - `VpcApi` trait, the seam the provider is written against
//! - `client` - `VpcClient`, the reqwest implementation of `VpcApi`
//! - `pager` - `next`-cursor pagination helper
//! - `models` - Request/response types

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pager;

pub use api::VpcApi;
pub use client::VpcClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use pager::{Paginated, Pager};
