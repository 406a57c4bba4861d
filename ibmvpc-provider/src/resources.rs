//! Resource type definitions
//!
//! Each resource and data source type is a unit struct implementing
//! `ResourceType`, pairing its name with its schema.

use ibmvpc_core::provider::ResourceType;
use ibmvpc_core::schema::ResourceSchema;

use crate::schemas::{data_sources, dns, endpoint_gateway};

pub const DNS_CONFIG: &str = "is_vpc_dns_config";
pub const DNS_RESOLUTION_BINDING: &str = "is_vpc_dns_resolution_binding";
pub const ENDPOINT_GATEWAY: &str = "is_virtual_endpoint_gateway";
pub const DNS_RESOLUTION_BINDINGS: &str = "is_vpc_dns_resolution_bindings";
pub const BARE_METAL_NETWORK_ATTACHMENTS: &str = "is_bare_metal_server_network_attachments";
pub const ROUTING_TABLE_ROUTES: &str = "is_vpc_routing_table_routes";

// =============================================================================
// Resource Type Definitions
// =============================================================================

macro_rules! define_resource_type {
    ($name:ident, $type_name:expr, $schema:path) => {
        define_resource_type!($name, $type_name, $schema, false);
    };
    ($name:ident, $type_name:expr, $schema:path, $data_source:expr) => {
        pub struct $name;
        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $type_name
            }
            fn schema(&self) -> ResourceSchema {
                $schema()
            }
            fn is_data_source(&self) -> bool {
                $data_source
            }
        }
    };
}

define_resource_type!(VpcDnsConfigType, DNS_CONFIG, dns::vpc_dns_config);
define_resource_type!(
    VpcDnsResolutionBindingType,
    DNS_RESOLUTION_BINDING,
    dns::vpc_dns_resolution_binding
);
define_resource_type!(
    VirtualEndpointGatewayType,
    ENDPOINT_GATEWAY,
    endpoint_gateway::virtual_endpoint_gateway
);
define_resource_type!(
    VpcDnsResolutionBindingsType,
    DNS_RESOLUTION_BINDINGS,
    data_sources::vpc_dns_resolution_bindings,
    true
);
define_resource_type!(
    BareMetalServerNetworkAttachmentsType,
    BARE_METAL_NETWORK_ATTACHMENTS,
    data_sources::bare_metal_server_network_attachments,
    true
);
define_resource_type!(
    VpcRoutingTableRoutesType,
    ROUTING_TABLE_ROUTES,
    data_sources::vpc_routing_table_routes,
    true
);

/// Returns all resource and data source types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![
        Box::new(VpcDnsConfigType),
        Box::new(VpcDnsResolutionBindingType),
        Box::new(VirtualEndpointGatewayType),
        Box::new(VpcDnsResolutionBindingsType),
        Box::new(BareMetalServerNetworkAttachmentsType),
        Box::new(VpcRoutingTableRoutesType),
    ]
}

/// Look up a type by name
pub fn find_resource_type(name: &str) -> Option<Box<dyn ResourceType>> {
    resource_types().into_iter().find(|t| t.name() == name)
}
