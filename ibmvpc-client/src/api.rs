//! The VPC API surface used by the provider

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    BareMetalServerNetworkAttachmentCollection, DnsResolutionBinding,
    DnsResolutionBindingCollection, DnsResolutionBindingPatch, DnsResolutionBindingPrototype,
    EndpointGateway, EndpointGatewayPatch, EndpointGatewayPrototype, RouteCollection, Vpc,
    VpcPatch,
};

/// Operations against the IBM Cloud VPC API
///
/// `VpcClient` implements this over HTTP; tests substitute an in-memory
/// implementation. List methods return one page starting at `start`.
#[async_trait]
pub trait VpcApi: Send + Sync {
    async fn get_vpc(&self, id: &str) -> Result<Vpc>;

    async fn update_vpc(&self, id: &str, patch: &VpcPatch) -> Result<Vpc>;

    async fn create_dns_resolution_binding(
        &self,
        vpc_id: &str,
        prototype: &DnsResolutionBindingPrototype,
    ) -> Result<DnsResolutionBinding>;

    async fn get_dns_resolution_binding(
        &self,
        vpc_id: &str,
        id: &str,
    ) -> Result<DnsResolutionBinding>;

    async fn update_dns_resolution_binding(
        &self,
        vpc_id: &str,
        id: &str,
        patch: &DnsResolutionBindingPatch,
    ) -> Result<DnsResolutionBinding>;

    async fn delete_dns_resolution_binding(&self, vpc_id: &str, id: &str) -> Result<()>;

    async fn list_dns_resolution_bindings(
        &self,
        vpc_id: &str,
        start: Option<String>,
    ) -> Result<DnsResolutionBindingCollection>;

    async fn create_endpoint_gateway(
        &self,
        prototype: &EndpointGatewayPrototype,
    ) -> Result<EndpointGateway>;

    async fn get_endpoint_gateway(&self, id: &str) -> Result<EndpointGateway>;

    async fn update_endpoint_gateway(
        &self,
        id: &str,
        patch: &EndpointGatewayPatch,
    ) -> Result<EndpointGateway>;

    async fn delete_endpoint_gateway(&self, id: &str) -> Result<()>;

    async fn list_bare_metal_server_network_attachments(
        &self,
        bare_metal_server_id: &str,
        start: Option<String>,
    ) -> Result<BareMetalServerNetworkAttachmentCollection>;

    async fn list_vpc_routing_table_routes(
        &self,
        vpc_id: &str,
        routing_table_id: &str,
        start: Option<String>,
    ) -> Result<RouteCollection>;
}
