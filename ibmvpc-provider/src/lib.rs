//! IBM Cloud VPC Provider
//!
//! Manages the DNS resolver configuration of VPCs, DNS resolution bindings
//! and endpoint gateways, and exposes read-only listings as data sources.
//!
//! ## Module Structure
//!
//! - `dns_config` - VPC DNS resolver configurator (system / manual / delegated)
//! - `dns_resolution_binding` - Standalone bindings and the bindings listing
//! - `endpoint_gateway` - Virtual private endpoint gateways
//! - `data_sources` - Network attachments and routing table routes
//! - `provider` - IbmVpcProvider dispatch
//! - `resources` - Resource type definitions
//! - `schemas` - Attribute schemas
//! - `utils` - Attribute extraction helpers

pub mod data_sources;
pub mod dns_config;
pub mod dns_resolution_binding;
pub mod endpoint_gateway;
pub mod provider;
pub mod resources;
pub mod schemas;
pub mod utils;

#[cfg(test)]
mod testing;

pub use provider::IbmVpcProvider;

use ibmvpc_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use ibmvpc_core::resource::{Resource, ResourceId, State};

use resources::resource_types;

impl Provider for IbmVpcProvider {
    fn name(&self) -> &'static str {
        "ibm"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        prior: Option<&State>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(|s| s.to_string());
        let prior = prior.cloned();
        Box::pin(async move {
            self.read_resource(&id, identifier.as_deref(), prior.as_ref())
                .await
        })
    }

    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { IbmVpcProvider::read_data_source(self, &resource).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&id, &identifier, &from, &to).await })
    }

    fn delete(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
    ) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        Box::pin(async move { self.delete_resource(&id, &identifier, &from).await })
    }
}
