//! Virtual private endpoint gateway schema

use ibmvpc_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::computed_object;
use crate::resources::ENDPOINT_GATEWAY;

pub const TARGET_RESOURCE_TYPES: &[&str] =
    &["provider_cloud_service", "provider_infrastructure_service"];

pub fn virtual_endpoint_gateway() -> ResourceSchema {
    ResourceSchema::new(ENDPOINT_GATEWAY)
        .with_description("Virtual private endpoint gateway connecting a VPC to a service")
        .attribute(AttributeSchema::new("name", AttributeType::String).required())
        .attribute(AttributeSchema::new("vpc_id", AttributeType::String).required())
        .attribute(
            AttributeSchema::new(
                "target",
                AttributeType::Object(vec![
                    AttributeSchema::new(
                        "resource_type",
                        types::enumeration(TARGET_RESOURCE_TYPES),
                    )
                    .required(),
                    AttributeSchema::new("crn", types::crn())
                        .optional()
                        .with_description("Required for provider_cloud_service"),
                    AttributeSchema::new("name", AttributeType::String)
                        .optional()
                        .with_description("Required for provider_infrastructure_service"),
                ]),
            )
            .required()
            .with_description("Service the gateway connects to"),
        )
        .attribute(
            AttributeSchema::new(
                "ips",
                AttributeType::List(Box::new(AttributeType::Object(vec![
                    AttributeSchema::new("subnet_id", AttributeType::String).required(),
                ]))),
            )
            .optional()
            .with_description("Subnets to reserve an IP in when the gateway is created"),
        )
        .attribute(AttributeSchema::new("resource_group_id", AttributeType::String).optional())
        .attribute(
            AttributeSchema::new("allow_dns_resolution_binding", AttributeType::Bool).optional(),
        )
        .attribute(AttributeSchema::new("crn", AttributeType::String).computed())
        .attribute(AttributeSchema::new("created_at", AttributeType::String).computed())
        .attribute(AttributeSchema::new("health_state", AttributeType::String).computed())
        .attribute(AttributeSchema::new("lifecycle_state", AttributeType::String).computed())
        .attribute(
            AttributeSchema::new(
                "service_endpoints",
                AttributeType::List(Box::new(AttributeType::String)),
            )
            .computed(),
        )
        .attribute(
            AttributeSchema::new(
                "reserved_ips",
                AttributeType::List(Box::new(computed_object(&[
                    ("id", AttributeType::String),
                    ("name", AttributeType::String),
                    ("address", AttributeType::String),
                ]))),
            )
            .computed(),
        )
}
