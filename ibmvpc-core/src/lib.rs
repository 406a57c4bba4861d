//! ibmvpc core
//!
//! Host-facing abstractions shared by the IBM Cloud VPC provider and the
//! `ibmvpc` CLI: the attribute value protocol, resource/state records,
//! attribute schemas, the `Provider` trait and the desired-vs-current differ.

pub mod differ;
pub mod effect;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
