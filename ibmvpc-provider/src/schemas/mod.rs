//! Attribute schemas for IBM VPC resources and data sources

pub mod data_sources;
pub mod dns;
pub mod endpoint_gateway;

use ibmvpc_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

/// Returns every resource and data source schema
pub fn all_schemas() -> Vec<ResourceSchema> {
    vec![
        dns::vpc_dns_config(),
        dns::vpc_dns_resolution_binding(),
        endpoint_gateway::virtual_endpoint_gateway(),
        data_sources::vpc_dns_resolution_bindings(),
        data_sources::bare_metal_server_network_attachments(),
        data_sources::vpc_routing_table_routes(),
    ]
}

/// Nested object whose fields are all computed
pub(crate) fn computed_object(fields: &[(&str, AttributeType)]) -> AttributeType {
    AttributeType::Object(
        fields
            .iter()
            .map(|(name, t)| AttributeSchema::new(*name, t.clone()).computed())
            .collect(),
    )
}

/// Reference block shared by several computed attributes: `{id, crn, href, name, resource_type}`
pub(crate) fn reference_object() -> AttributeType {
    computed_object(&[
        ("id", AttributeType::String),
        ("crn", AttributeType::String),
        ("href", AttributeType::String),
        ("name", AttributeType::String),
        ("resource_type", AttributeType::String),
    ])
}
