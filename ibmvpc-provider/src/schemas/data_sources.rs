//! Data source schemas

use ibmvpc_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use super::dns::{endpoint_gateway_reference_object, health_reason_object};
use super::{computed_object, reference_object};
use crate::resources::{BARE_METAL_NETWORK_ATTACHMENTS, DNS_RESOLUTION_BINDINGS, ROUTING_TABLE_ROUTES};

fn computed_list(name: &str, item: AttributeType) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::List(Box::new(item))).computed()
}

pub fn vpc_dns_resolution_bindings() -> ResourceSchema {
    ResourceSchema::new(DNS_RESOLUTION_BINDINGS)
        .with_description("Lists the DNS resolution bindings of a VPC")
        .attribute(AttributeSchema::new("vpc_id", AttributeType::String).required())
        .attribute(computed_list(
            "dns_resolution_bindings",
            computed_object(&[
                ("id", AttributeType::String),
                ("name", AttributeType::String),
                ("href", AttributeType::String),
                ("created_at", AttributeType::String),
                ("health_state", AttributeType::String),
                ("lifecycle_state", AttributeType::String),
                ("resource_type", AttributeType::String),
                ("vpc", reference_object()),
                (
                    "endpoint_gateways",
                    AttributeType::List(Box::new(endpoint_gateway_reference_object())),
                ),
                (
                    "health_reasons",
                    AttributeType::List(Box::new(health_reason_object())),
                ),
            ]),
        ))
}

pub fn bare_metal_server_network_attachments() -> ResourceSchema {
    ResourceSchema::new(BARE_METAL_NETWORK_ATTACHMENTS)
        .with_description("Lists the network attachments of a bare metal server")
        .attribute(AttributeSchema::new("bare_metal_server_id", AttributeType::String).required())
        .attribute(computed_list(
            "network_attachments",
            computed_object(&[
                ("id", AttributeType::String),
                ("name", AttributeType::String),
                ("href", AttributeType::String),
                ("created_at", AttributeType::String),
                ("interface_type", AttributeType::String),
                ("lifecycle_state", AttributeType::String),
                ("port_speed", AttributeType::Int),
                ("type", AttributeType::String),
                ("resource_type", AttributeType::String),
                (
                    "primary_ip",
                    computed_object(&[
                        ("id", AttributeType::String),
                        ("address", AttributeType::String),
                        ("href", AttributeType::String),
                        ("name", AttributeType::String),
                        ("resource_type", AttributeType::String),
                    ]),
                ),
                ("subnet", reference_object()),
                ("virtual_network_interface", reference_object()),
                (
                    "allowed_vlans",
                    AttributeType::List(Box::new(AttributeType::Int)),
                ),
                ("allow_to_float", AttributeType::Bool),
                ("vlan", AttributeType::Int),
            ]),
        ))
}

pub fn vpc_routing_table_routes() -> ResourceSchema {
    ResourceSchema::new(ROUTING_TABLE_ROUTES)
        .with_description("Lists the routes of a VPC routing table")
        .attribute(AttributeSchema::new("vpc_id", AttributeType::String).required())
        .attribute(AttributeSchema::new("routing_table_id", AttributeType::String).required())
        .attribute(computed_list(
            "routes",
            computed_object(&[
                ("id", AttributeType::String),
                ("name", AttributeType::String),
                ("href", AttributeType::String),
                ("action", AttributeType::String),
                ("advertise", AttributeType::Bool),
                ("created_at", AttributeType::String),
                ("destination", AttributeType::String),
                ("lifecycle_state", AttributeType::String),
                (
                    "next_hop",
                    computed_object(&[
                        ("address", AttributeType::String),
                        ("id", AttributeType::String),
                        ("name", AttributeType::String),
                        ("href", AttributeType::String),
                        ("resource_type", AttributeType::String),
                    ]),
                ),
                ("origin", AttributeType::String),
                ("priority", AttributeType::Int),
                ("zone", AttributeType::String),
            ]),
        ))
}
