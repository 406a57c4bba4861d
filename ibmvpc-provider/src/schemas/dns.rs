//! Schemas for VPC DNS resolver configuration and DNS resolution bindings

use ibmvpc_client::models::ResolverType;
use ibmvpc_core::resource::Value;
use ibmvpc_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{computed_object, reference_object};
use crate::resources::{DNS_CONFIG, DNS_RESOLUTION_BINDING};

/// `{address, zone_affinity}` entry of a server list
fn dns_server_object(computed: bool) -> AttributeType {
    if computed {
        return computed_object(&[
            ("address", AttributeType::String),
            ("zone_affinity", AttributeType::String),
        ]);
    }
    AttributeType::Object(vec![
        AttributeSchema::new("address", types::ip_address())
            .required()
            .with_description("IP address of the DNS server"),
        AttributeSchema::new("zone_affinity", AttributeType::String)
            .optional()
            .with_description("Zone name (e.g., us-south-1) the server is preferred in"),
    ])
}

/// Endpoint gateway reference as listed on a binding
pub(crate) fn endpoint_gateway_reference_object() -> AttributeType {
    reference_object()
}

pub(crate) fn health_reason_object() -> AttributeType {
    computed_object(&[
        ("code", AttributeType::String),
        ("message", AttributeType::String),
        ("more_info", AttributeType::String),
    ])
}

pub fn vpc_dns_config() -> ResourceSchema {
    ResourceSchema::new(DNS_CONFIG)
        .with_description(
            "DNS resolver configuration of a VPC. The VPC itself is not created; \
             deleting this resource resets the VPC to the system resolver.",
        )
        .attribute(
            AttributeSchema::new("vpc_id", AttributeType::String)
                .required()
                .with_description("ID of the VPC whose resolver is configured"),
        )
        .attribute(
            AttributeSchema::new("enable_hub", AttributeType::Bool)
                .optional()
                .with_default(Value::Bool(false))
                .with_description(
                    "Whether this VPC is a DNS hub. Must be false when resolver_type is delegated.",
                ),
        )
        .attribute(
            AttributeSchema::new("resolver_type", types::enumeration(&ResolverType::ALL))
                .optional()
                .with_default(Value::String(ResolverType::System.to_string()))
                .with_description("Resolver mode: system, manual or delegated"),
        )
        .attribute(
            AttributeSchema::new(
                "manual_servers",
                AttributeType::List(Box::new(dns_server_object(false))),
            )
            .optional()
            .with_description("DNS servers to use; required when resolver_type is manual"),
        )
        .attribute(
            AttributeSchema::new("resolver_vpc_id", AttributeType::String)
                .optional()
                .with_description("Hub VPC to delegate to, by ID"),
        )
        .attribute(
            AttributeSchema::new("resolver_vpc_crn", types::crn())
                .optional()
                .with_description("Hub VPC to delegate to, by CRN"),
        )
        .attribute(
            AttributeSchema::new("dns_binding_name", AttributeType::String)
                .optional()
                .computed()
                .with_description("Name of the DNS resolution binding created for delegation"),
        )
        .attribute(
            AttributeSchema::new("dns_resolution_binding_id", AttributeType::String)
                .computed()
                .with_description("ID of the DNS resolution binding created for delegation"),
        )
        .attribute(
            AttributeSchema::new("resolution_binding_count", AttributeType::Int)
                .computed()
                .with_description("Number of bindings referencing this VPC"),
        )
        .attribute(
            AttributeSchema::new("resolver_configuration", AttributeType::String)
                .computed()
                .with_description("default, custom_resolver or private_resolver"),
        )
        .attribute(
            AttributeSchema::new(
                "resolver_servers",
                AttributeType::List(Box::new(dns_server_object(true))),
            )
            .computed()
            .with_description("Effective DNS servers of the VPC"),
        )
}

pub fn vpc_dns_resolution_binding() -> ResourceSchema {
    ResourceSchema::new(DNS_RESOLUTION_BINDING)
        .with_description("Binding delegating DNS resolution of a VPC to a hub VPC")
        .attribute(
            AttributeSchema::new("vpc_id", AttributeType::String)
                .required()
                .with_description("VPC that owns the binding"),
        )
        .attribute(
            AttributeSchema::new("name", AttributeType::String)
                .optional()
                .computed(),
        )
        .attribute(
            AttributeSchema::new("target_vpc_id", AttributeType::String)
                .optional()
                .with_description("Hub VPC by ID; exactly one of target_vpc_id/target_vpc_crn"),
        )
        .attribute(
            AttributeSchema::new("target_vpc_crn", types::crn())
                .optional()
                .with_description("Hub VPC by CRN"),
        )
        .attribute(AttributeSchema::new("binding_id", AttributeType::String).computed())
        .attribute(AttributeSchema::new("created_at", AttributeType::String).computed())
        .attribute(AttributeSchema::new("health_state", AttributeType::String).computed())
        .attribute(AttributeSchema::new("lifecycle_state", AttributeType::String).computed())
        .attribute(AttributeSchema::new("href", AttributeType::String).computed())
        .attribute(AttributeSchema::new("resource_type", AttributeType::String).computed())
        .attribute(AttributeSchema::new("target_vpc_name", AttributeType::String).computed())
        .attribute(
            AttributeSchema::new(
                "endpoint_gateways",
                AttributeType::List(Box::new(endpoint_gateway_reference_object())),
            )
            .computed(),
        )
        .attribute(
            AttributeSchema::new(
                "health_reasons",
                AttributeType::List(Box::new(health_reason_object())),
            )
            .computed(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn dns_config_defaults() {
        let schema = vpc_dns_config();
        let mut a = attrs(&[("vpc_id", Value::from("r006-spoke"))]);
        schema.apply_defaults(&mut a);

        assert_eq!(a["enable_hub"], Value::Bool(false));
        assert_eq!(a["resolver_type"], Value::from("system"));
        assert!(schema.validate(&a).is_ok());
    }

    #[test]
    fn dns_config_rejects_unknown_resolver_type() {
        let a = attrs(&[
            ("vpc_id", Value::from("r006-spoke")),
            ("resolver_type", Value::from("hub")),
        ]);
        assert!(vpc_dns_config().validate(&a).is_err());
    }

    #[test]
    fn dns_config_rejects_computed_only_attribute() {
        let a = attrs(&[
            ("vpc_id", Value::from("r006-spoke")),
            ("dns_resolution_binding_id", Value::from("r006-b1")),
        ]);
        assert!(vpc_dns_config().validate(&a).is_err());
    }

    #[test]
    fn dns_config_validates_manual_server_addresses() {
        let server = |address: &str| {
            Value::Map(attrs(&[
                ("address", Value::from(address)),
                ("zone_affinity", Value::from("us-south-1")),
            ]))
        };
        let schema = vpc_dns_config();

        let good = attrs(&[
            ("vpc_id", Value::from("r006-spoke")),
            ("resolver_type", Value::from("manual")),
            ("manual_servers", Value::List(vec![server("192.168.3.4")])),
        ]);
        assert!(schema.validate(&good).is_ok());

        let bad = attrs(&[
            ("vpc_id", Value::from("r006-spoke")),
            ("resolver_type", Value::from("manual")),
            ("manual_servers", Value::List(vec![server("not-an-ip")])),
        ]);
        assert!(schema.validate(&bad).is_err());
    }

    #[test]
    fn binding_name_is_settable() {
        let schema = vpc_dns_resolution_binding();
        assert!(schema.attributes["name"].is_settable());
        assert!(!schema.attributes["binding_id"].is_settable());
    }
}
