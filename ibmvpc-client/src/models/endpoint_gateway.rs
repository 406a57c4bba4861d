//! Virtual private endpoint gateways (`/endpoint_gateways`)

use serde::{Deserialize, Serialize};

use super::{
    ReservedIpReference, ResourceGroupIdentity, ResourceGroupReference, SubnetIdentity,
    VpcIdentity, VpcReference,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndpointGateway {
    pub id: String,
    pub crn: String,
    pub name: String,
    pub href: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub allow_dns_resolution_binding: bool,
    pub health_state: String,
    pub lifecycle_state: String,
    #[serde(default)]
    pub ips: Vec<ReservedIpReference>,
    #[serde(default)]
    pub service_endpoints: Vec<String>,
    pub target: EndpointGatewayTarget,
    pub vpc: VpcReference,
    pub resource_group: Option<ResourceGroupReference>,
}

/// Service an endpoint gateway connects to, discriminated by `resource_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resource_type", rename_all = "snake_case")]
pub enum EndpointGatewayTarget {
    ProviderCloudService { crn: String },
    ProviderInfrastructureService { name: String },
}

impl EndpointGatewayTarget {
    pub fn resource_type(&self) -> &'static str {
        match self {
            EndpointGatewayTarget::ProviderCloudService { .. } => "provider_cloud_service",
            EndpointGatewayTarget::ProviderInfrastructureService { .. } => {
                "provider_infrastructure_service"
            }
        }
    }
}

/// Reserved IP to bind when creating an endpoint gateway
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointGatewayReservedIpPrototype {
    pub subnet: SubnetIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of `POST /endpoint_gateways`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointGatewayPrototype {
    pub name: String,
    pub target: EndpointGatewayTarget,
    pub vpc: VpcIdentity,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<EndpointGatewayReservedIpPrototype>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceGroupIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_dns_resolution_binding: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EndpointGatewayPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_dns_resolution_binding: Option<bool>,
}

impl EndpointGatewayPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.allow_dns_resolution_binding.is_none()
    }
}
