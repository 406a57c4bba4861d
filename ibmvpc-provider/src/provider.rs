//! IBM VPC Provider implementation
//!
//! Routes each operation to the module owning the resource type. All remote
//! access goes through the injected [`VpcApi`].

use std::sync::Arc;

use ibmvpc_client::VpcApi;
use ibmvpc_core::provider::{ProviderError, ProviderResult};
use ibmvpc_core::resource::{Resource, ResourceId, State};

use crate::dns_config::DnsConfigSpec;
use crate::dns_resolution_binding::ResolutionBindingSpec;
use crate::endpoint_gateway::EndpointGatewaySpec;
use crate::resources::{
    BARE_METAL_NETWORK_ATTACHMENTS, DNS_CONFIG, DNS_RESOLUTION_BINDING, DNS_RESOLUTION_BINDINGS,
    ENDPOINT_GATEWAY, ROUTING_TABLE_ROUTES,
};
use crate::{data_sources, dns_config, dns_resolution_binding, endpoint_gateway};

/// IBM Cloud VPC Provider
pub struct IbmVpcProvider {
    api: Arc<dyn VpcApi>,
}

fn unsupported(id: &ResourceId) -> ProviderError {
    ProviderError::new(format!("Unsupported resource type: {}", id.resource_type))
        .for_resource(id.clone())
}

impl IbmVpcProvider {
    pub fn new(api: Arc<dyn VpcApi>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &dyn VpcApi {
        self.api.as_ref()
    }

    pub async fn read_resource(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        prior: Option<&State>,
    ) -> ProviderResult<State> {
        // Nothing recorded yet means nothing to look up
        let Some(identifier) = identifier else {
            return Ok(State::not_found(id.clone()));
        };
        match id.resource_type.as_str() {
            DNS_CONFIG => dns_config::read(self.api(), id, identifier, prior).await,
            DNS_RESOLUTION_BINDING => {
                dns_resolution_binding::read(self.api(), id, identifier).await
            }
            ENDPOINT_GATEWAY => endpoint_gateway::read(self.api(), id, identifier, prior).await,
            _ => Err(unsupported(id)),
        }
    }

    pub async fn read_data_source(&self, resource: &Resource) -> ProviderResult<State> {
        match resource.id.resource_type.as_str() {
            DNS_RESOLUTION_BINDINGS => dns_resolution_binding::read_all(self.api(), resource).await,
            BARE_METAL_NETWORK_ATTACHMENTS => {
                data_sources::read_network_attachments(self.api(), resource).await
            }
            ROUTING_TABLE_ROUTES => {
                data_sources::read_routing_table_routes(self.api(), resource).await
            }
            _ => Err(unsupported(&resource.id)),
        }
    }

    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        let id = &resource.id;
        let attrs = &resource.attributes;
        match id.resource_type.as_str() {
            DNS_CONFIG => {
                let spec =
                    DnsConfigSpec::from_attributes(attrs).map_err(|e| e.for_resource(id.clone()))?;
                dns_config::create(self.api(), id, &spec).await
            }
            DNS_RESOLUTION_BINDING => {
                let spec = ResolutionBindingSpec::from_attributes(attrs)
                    .map_err(|e| e.for_resource(id.clone()))?;
                dns_resolution_binding::create(self.api(), id, &spec).await
            }
            ENDPOINT_GATEWAY => {
                let spec = EndpointGatewaySpec::from_attributes(attrs)
                    .map_err(|e| e.for_resource(id.clone()))?;
                endpoint_gateway::create(self.api(), id, &spec, attrs.get("ips")).await
            }
            _ => Err(unsupported(id)),
        }
    }

    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let attrs = &to.attributes;
        match id.resource_type.as_str() {
            DNS_CONFIG => {
                let spec =
                    DnsConfigSpec::from_attributes(attrs).map_err(|e| e.for_resource(id.clone()))?;
                if spec.vpc_id != identifier {
                    return Err(ProviderError::validation(format!(
                        "vpc_id cannot change from {} to {}",
                        identifier, spec.vpc_id
                    ))
                    .for_resource(id.clone()));
                }
                dns_config::update(self.api(), id, from, &spec).await
            }
            DNS_RESOLUTION_BINDING => {
                let spec = ResolutionBindingSpec::from_attributes(attrs)
                    .map_err(|e| e.for_resource(id.clone()))?;
                dns_resolution_binding::update(self.api(), id, identifier, from, &spec).await
            }
            ENDPOINT_GATEWAY => {
                let spec = EndpointGatewaySpec::from_attributes(attrs)
                    .map_err(|e| e.for_resource(id.clone()))?;
                endpoint_gateway::update(self.api(), id, identifier, from, &spec, attrs.get("ips"))
                    .await
            }
            _ => Err(unsupported(id)),
        }
    }

    pub async fn delete_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
    ) -> ProviderResult<()> {
        match id.resource_type.as_str() {
            DNS_CONFIG => dns_config::delete(self.api(), id, identifier, from).await,
            DNS_RESOLUTION_BINDING => {
                dns_resolution_binding::delete(self.api(), id, identifier).await
            }
            ENDPOINT_GATEWAY => endpoint_gateway::delete(self.api(), id, identifier).await,
            _ => Err(unsupported(id)),
        }
    }
}
