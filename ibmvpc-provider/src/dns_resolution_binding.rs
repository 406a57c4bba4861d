//! `is_vpc_dns_resolution_binding` resource and `is_vpc_dns_resolution_bindings` data source

use std::collections::HashMap;

use ibmvpc_client::models::{
    DnsResolutionBinding, DnsResolutionBindingPatch, DnsResolutionBindingPrototype,
    EndpointGatewayReferenceRemote, HealthReason, VpcIdentity, VpcReference,
};
use ibmvpc_client::{Pager, VpcApi};
use ibmvpc_core::provider::{ProviderError, ProviderResult};
use ibmvpc_core::resource::{Resource, ResourceId, State, Value};

use crate::utils::{
    Attributes, insert_opt, insert_str, optional_string, remote_error, required_string,
    split_identifier,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionBindingSpec {
    pub vpc_id: String,
    pub name: Option<String>,
    pub target: VpcIdentity,
}

impl ResolutionBindingSpec {
    pub fn from_attributes(attrs: &Attributes) -> ProviderResult<Self> {
        let vpc_id = required_string(attrs, "vpc_id")?;
        let target = match (
            optional_string(attrs, "target_vpc_id")?,
            optional_string(attrs, "target_vpc_crn")?,
        ) {
            (Some(id), None) => VpcIdentity::by_id(id),
            (None, Some(crn)) => VpcIdentity::by_crn(crn),
            _ => {
                return Err(ProviderError::validation(
                    "exactly one of target_vpc_id and target_vpc_crn must be set",
                ));
            }
        };
        Ok(Self {
            vpc_id,
            name: optional_string(attrs, "name")?,
            target,
        })
    }
}

fn vpc_reference_to_map(vpc: &VpcReference) -> Value {
    let mut map = HashMap::new();
    insert_str(&mut map, "id", &vpc.id);
    insert_opt(&mut map, "crn", vpc.crn.as_deref());
    insert_opt(&mut map, "href", vpc.href.as_deref());
    insert_opt(&mut map, "name", vpc.name.as_deref());
    insert_opt(&mut map, "resource_type", vpc.resource_type.as_deref());
    Value::Map(map)
}

pub fn endpoint_gateway_reference_to_map(gateway: &EndpointGatewayReferenceRemote) -> Value {
    let mut map = HashMap::new();
    insert_str(&mut map, "id", &gateway.id);
    insert_str(&mut map, "crn", &gateway.crn);
    insert_str(&mut map, "name", &gateway.name);
    insert_opt(&mut map, "href", gateway.href.as_deref());
    insert_opt(&mut map, "resource_type", gateway.resource_type.as_deref());
    Value::Map(map)
}

pub fn health_reason_to_map(reason: &HealthReason) -> Value {
    let mut map = HashMap::new();
    insert_str(&mut map, "code", &reason.code);
    insert_str(&mut map, "message", &reason.message);
    insert_opt(&mut map, "more_info", reason.more_info.as_deref());
    Value::Map(map)
}

/// One element of the `dns_resolution_bindings` list
pub fn dns_resolution_binding_to_map(binding: &DnsResolutionBinding) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    insert_str(&mut map, "id", &binding.id);
    insert_str(&mut map, "name", &binding.name);
    insert_str(&mut map, "href", &binding.href);
    insert_str(&mut map, "created_at", &binding.created_at);
    insert_str(&mut map, "health_state", &binding.health_state);
    insert_str(&mut map, "lifecycle_state", &binding.lifecycle_state);
    insert_str(&mut map, "resource_type", &binding.resource_type);
    map.insert("vpc".to_string(), vpc_reference_to_map(&binding.vpc));
    map.insert(
        "endpoint_gateways".to_string(),
        Value::List(
            binding
                .endpoint_gateways
                .iter()
                .map(endpoint_gateway_reference_to_map)
                .collect(),
        ),
    );
    map.insert(
        "health_reasons".to_string(),
        Value::List(binding.health_reasons.iter().map(health_reason_to_map).collect()),
    );
    map
}

/// Attributes of the binding resource owned by `vpc_id`
fn binding_resource_attributes(vpc_id: &str, binding: &DnsResolutionBinding) -> HashMap<String, Value> {
    let mut attrs = HashMap::new();
    insert_str(&mut attrs, "vpc_id", vpc_id);
    insert_str(&mut attrs, "binding_id", &binding.id);
    insert_str(&mut attrs, "name", &binding.name);
    insert_str(&mut attrs, "target_vpc_id", &binding.vpc.id);
    insert_opt(&mut attrs, "target_vpc_crn", binding.vpc.crn.as_deref());
    insert_opt(&mut attrs, "target_vpc_name", binding.vpc.name.as_deref());
    insert_str(&mut attrs, "created_at", &binding.created_at);
    insert_str(&mut attrs, "health_state", &binding.health_state);
    insert_str(&mut attrs, "lifecycle_state", &binding.lifecycle_state);
    insert_str(&mut attrs, "href", &binding.href);
    insert_str(&mut attrs, "resource_type", &binding.resource_type);
    attrs.insert(
        "endpoint_gateways".to_string(),
        Value::List(
            binding
                .endpoint_gateways
                .iter()
                .map(endpoint_gateway_reference_to_map)
                .collect(),
        ),
    );
    attrs.insert(
        "health_reasons".to_string(),
        Value::List(binding.health_reasons.iter().map(health_reason_to_map).collect()),
    );
    attrs
}

fn to_state(id: &ResourceId, vpc_id: &str, binding: &DnsResolutionBinding) -> State {
    State::existing(id.clone(), binding_resource_attributes(vpc_id, binding))
        .with_identifier(format!("{}/{}", vpc_id, binding.id))
}

pub async fn create(
    api: &dyn VpcApi,
    id: &ResourceId,
    spec: &ResolutionBindingSpec,
) -> ProviderResult<State> {
    let prototype = DnsResolutionBindingPrototype {
        name: spec.name.clone(),
        vpc: spec.target.clone(),
    };
    let binding = api
        .create_dns_resolution_binding(&spec.vpc_id, &prototype)
        .await
        .map_err(|e| {
            remote_error("Failed to create DNS resolution binding", e).for_resource(id.clone())
        })?;
    log::info!(
        "Created DNS resolution binding {} for VPC {}",
        binding.id,
        spec.vpc_id
    );
    Ok(to_state(id, &spec.vpc_id, &binding))
}

pub async fn read(api: &dyn VpcApi, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
    let (vpc_id, binding_id) = split_identifier(identifier).map_err(|e| e.for_resource(id.clone()))?;
    match api.get_dns_resolution_binding(vpc_id, binding_id).await {
        Ok(binding) => Ok(to_state(id, vpc_id, &binding)),
        Err(e) if e.is_not_found() => Ok(State::not_found(id.clone())),
        Err(e) => Err(remote_error("Failed to read DNS resolution binding", e).for_resource(id.clone())),
    }
}

/// Only the name can change in place
pub async fn update(
    api: &dyn VpcApi,
    id: &ResourceId,
    identifier: &str,
    from: &State,
    spec: &ResolutionBindingSpec,
) -> ProviderResult<State> {
    let (vpc_id, binding_id) = split_identifier(identifier).map_err(|e| e.for_resource(id.clone()))?;

    let target_changed = match &spec.target {
        VpcIdentity::Id { id: target } => from.get_str("target_vpc_id") != Some(target.as_str()),
        VpcIdentity::Crn { crn } => from.get_str("target_vpc_crn") != Some(crn.as_str()),
    };
    if target_changed || vpc_id != spec.vpc_id {
        return Err(ProviderError::validation(
            "vpc_id and the target VPC of a DNS resolution binding cannot be changed in place",
        )
        .for_resource(id.clone()));
    }

    let binding = match &spec.name {
        Some(name) if from.get_str("name") != Some(name.as_str()) => api
            .update_dns_resolution_binding(
                vpc_id,
                binding_id,
                &DnsResolutionBindingPatch { name: name.clone() },
            )
            .await
            .map_err(|e| {
                remote_error("Failed to update DNS resolution binding", e).for_resource(id.clone())
            })?,
        _ => api
            .get_dns_resolution_binding(vpc_id, binding_id)
            .await
            .map_err(|e| {
                remote_error("Failed to read DNS resolution binding", e).for_resource(id.clone())
            })?,
    };
    Ok(to_state(id, vpc_id, &binding))
}

pub async fn delete(api: &dyn VpcApi, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
    let (vpc_id, binding_id) = split_identifier(identifier).map_err(|e| e.for_resource(id.clone()))?;
    api.delete_dns_resolution_binding(vpc_id, binding_id)
        .await
        .map_err(|e| {
            remote_error("Failed to delete DNS resolution binding", e).for_resource(id.clone())
        })
}

/// `is_vpc_dns_resolution_bindings`: every binding of a VPC
pub async fn read_all(api: &dyn VpcApi, resource: &Resource) -> ProviderResult<State> {
    let id = &resource.id;
    let vpc_id = required_string(&resource.attributes, "vpc_id").map_err(|e| e.for_resource(id.clone()))?;

    let bindings = Pager::new(|start: Option<String>| api.list_dns_resolution_bindings(&vpc_id, start))
        .collect_all()
        .await
        .map_err(|e| {
            remote_error("Failed to list DNS resolution bindings", e).for_resource(id.clone())
        })?;

    let mut attrs = HashMap::new();
    insert_str(&mut attrs, "vpc_id", &vpc_id);
    attrs.insert(
        "dns_resolution_bindings".to_string(),
        Value::List(
            bindings
                .iter()
                .map(|b| Value::Map(dns_resolution_binding_to_map(b)))
                .collect(),
        ),
    );
    Ok(State::existing(id.clone(), attrs).with_identifier(vpc_id))
}
