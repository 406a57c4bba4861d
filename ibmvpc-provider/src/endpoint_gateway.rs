//! `is_virtual_endpoint_gateway` resource

use std::collections::HashMap;

use ibmvpc_client::VpcApi;
use ibmvpc_client::models::{
    EndpointGateway, EndpointGatewayPatch, EndpointGatewayPrototype,
    EndpointGatewayReservedIpPrototype, EndpointGatewayTarget, ReservedIpReference,
    ResourceGroupIdentity, SubnetIdentity, VpcIdentity,
};
use ibmvpc_core::provider::{ProviderError, ProviderResult};
use ibmvpc_core::resource::{ResourceId, State, Value};

use crate::utils::{
    Attributes, as_map, insert_opt, insert_str, list, optional_bool, optional_string,
    remote_error, required_string,
};

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointGatewaySpec {
    pub name: String,
    pub vpc_id: String,
    pub target: EndpointGatewayTarget,
    /// Subnets to reserve an IP in
    pub subnet_ids: Vec<String>,
    pub resource_group_id: Option<String>,
    pub allow_dns_resolution_binding: Option<bool>,
}

impl EndpointGatewaySpec {
    pub fn from_attributes(attrs: &Attributes) -> ProviderResult<Self> {
        let target = match attrs.get("target") {
            Some(value) => parse_target(as_map(value, "target")?)?,
            None => return Err(ProviderError::validation("Attribute 'target' is required")),
        };
        let subnet_ids = list(attrs, "ips")?
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let map = as_map(item, &format!("ips[{}]", i))?;
                optional_string(map, "subnet_id")?.ok_or_else(|| {
                    ProviderError::validation(format!("ips[{}].subnet_id is required", i))
                })
            })
            .collect::<ProviderResult<Vec<_>>>()?;

        Ok(Self {
            name: required_string(attrs, "name")?,
            vpc_id: required_string(attrs, "vpc_id")?,
            target,
            subnet_ids,
            resource_group_id: optional_string(attrs, "resource_group_id")?,
            allow_dns_resolution_binding: optional_bool(attrs, "allow_dns_resolution_binding")?,
        })
    }

    fn prototype(&self) -> EndpointGatewayPrototype {
        EndpointGatewayPrototype {
            name: self.name.clone(),
            target: self.target.clone(),
            vpc: VpcIdentity::by_id(&self.vpc_id),
            ips: self
                .subnet_ids
                .iter()
                .map(|id| EndpointGatewayReservedIpPrototype {
                    subnet: SubnetIdentity { id: id.clone() },
                    name: None,
                })
                .collect(),
            resource_group: self
                .resource_group_id
                .as_ref()
                .map(|id| ResourceGroupIdentity { id: id.clone() }),
            allow_dns_resolution_binding: self.allow_dns_resolution_binding,
        }
    }
}

fn parse_target(map: &Attributes) -> ProviderResult<EndpointGatewayTarget> {
    let resource_type = required_string(map, "resource_type")?;
    match resource_type.as_str() {
        "provider_cloud_service" => optional_string(map, "crn")?
            .map(|crn| EndpointGatewayTarget::ProviderCloudService { crn })
            .ok_or_else(|| {
                ProviderError::validation("target.crn is required for provider_cloud_service")
            }),
        "provider_infrastructure_service" => optional_string(map, "name")?
            .map(|name| EndpointGatewayTarget::ProviderInfrastructureService { name })
            .ok_or_else(|| {
                ProviderError::validation(
                    "target.name is required for provider_infrastructure_service",
                )
            }),
        other => Err(ProviderError::validation(format!(
            "Invalid target.resource_type '{}'",
            other
        ))),
    }
}

pub fn target_to_map(target: &EndpointGatewayTarget) -> Value {
    let mut map = HashMap::new();
    insert_str(&mut map, "resource_type", target.resource_type());
    match target {
        EndpointGatewayTarget::ProviderCloudService { crn } => insert_str(&mut map, "crn", crn),
        EndpointGatewayTarget::ProviderInfrastructureService { name } => {
            insert_str(&mut map, "name", name)
        }
    }
    Value::Map(map)
}

fn reserved_ip_to_map(ip: &ReservedIpReference) -> Value {
    let mut map = HashMap::new();
    insert_str(&mut map, "id", &ip.id);
    insert_str(&mut map, "address", &ip.address);
    insert_opt(&mut map, "name", ip.name.as_deref());
    Value::Map(map)
}

pub fn endpoint_gateway_to_map(gateway: &EndpointGateway) -> HashMap<String, Value> {
    let mut attrs = HashMap::new();
    insert_str(&mut attrs, "name", &gateway.name);
    insert_str(&mut attrs, "vpc_id", &gateway.vpc.id);
    attrs.insert("target".to_string(), target_to_map(&gateway.target));
    insert_opt(
        &mut attrs,
        "resource_group_id",
        gateway.resource_group.as_ref().map(|g| g.id.as_str()),
    );
    attrs.insert(
        "allow_dns_resolution_binding".to_string(),
        Value::Bool(gateway.allow_dns_resolution_binding),
    );
    insert_str(&mut attrs, "crn", &gateway.crn);
    insert_str(&mut attrs, "created_at", &gateway.created_at);
    insert_str(&mut attrs, "health_state", &gateway.health_state);
    insert_str(&mut attrs, "lifecycle_state", &gateway.lifecycle_state);
    attrs.insert(
        "service_endpoints".to_string(),
        Value::List(
            gateway
                .service_endpoints
                .iter()
                .map(|e| Value::String(e.clone()))
                .collect(),
        ),
    );
    attrs.insert(
        "reserved_ips".to_string(),
        Value::List(gateway.ips.iter().map(reserved_ip_to_map).collect()),
    );
    attrs
}

/// `ips` is create-only input the API does not echo back; keep the recorded value
fn to_state(id: &ResourceId, gateway: &EndpointGateway, ips: Option<&Value>) -> State {
    let mut attrs = endpoint_gateway_to_map(gateway);
    if let Some(ips) = ips {
        attrs.insert("ips".to_string(), ips.clone());
    }
    State::existing(id.clone(), attrs).with_identifier(gateway.id.clone())
}

pub async fn create(
    api: &dyn VpcApi,
    id: &ResourceId,
    spec: &EndpointGatewaySpec,
    ips: Option<&Value>,
) -> ProviderResult<State> {
    let gateway = api
        .create_endpoint_gateway(&spec.prototype())
        .await
        .map_err(|e| remote_error("Failed to create endpoint gateway", e).for_resource(id.clone()))?;
    log::info!("Created endpoint gateway {} ({})", gateway.id, gateway.name);
    Ok(to_state(id, &gateway, ips))
}

pub async fn read(
    api: &dyn VpcApi,
    id: &ResourceId,
    identifier: &str,
    prior: Option<&State>,
) -> ProviderResult<State> {
    match api.get_endpoint_gateway(identifier).await {
        Ok(gateway) => Ok(to_state(
            id,
            &gateway,
            prior.and_then(|s| s.attributes.get("ips")),
        )),
        Err(e) if e.is_not_found() => Ok(State::not_found(id.clone())),
        Err(e) => Err(remote_error("Failed to read endpoint gateway", e).for_resource(id.clone())),
    }
}

/// Name and `allow_dns_resolution_binding` change in place; everything else is fixed
pub async fn update(
    api: &dyn VpcApi,
    id: &ResourceId,
    identifier: &str,
    from: &State,
    spec: &EndpointGatewaySpec,
    ips: Option<&Value>,
) -> ProviderResult<State> {
    let mut immutable = Vec::new();
    if from.get_str("vpc_id") != Some(spec.vpc_id.as_str()) {
        immutable.push("vpc_id");
    }
    if from.attributes.get("target") != Some(&target_to_map(&spec.target)) {
        immutable.push("target");
    }
    if spec.resource_group_id.is_some()
        && from.get_str("resource_group_id") != spec.resource_group_id.as_deref()
    {
        immutable.push("resource_group_id");
    }
    if !immutable.is_empty() {
        return Err(ProviderError::validation(format!(
            "{} of an endpoint gateway cannot be changed in place",
            immutable.join(", ")
        ))
        .for_resource(id.clone()));
    }

    let mut patch = EndpointGatewayPatch::default();
    if from.get_str("name") != Some(spec.name.as_str()) {
        patch.name = Some(spec.name.clone());
    }
    if let Some(allow) = spec.allow_dns_resolution_binding
        && from.attributes.get("allow_dns_resolution_binding") != Some(&Value::Bool(allow))
    {
        patch.allow_dns_resolution_binding = Some(allow);
    }

    let result = if patch.is_empty() {
        api.get_endpoint_gateway(identifier).await
    } else {
        api.update_endpoint_gateway(identifier, &patch).await
    };
    let gateway = result
        .map_err(|e| remote_error("Failed to update endpoint gateway", e).for_resource(id.clone()))?;
    Ok(to_state(id, &gateway, ips))
}

pub async fn delete(api: &dyn VpcApi, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
    api.delete_endpoint_gateway(identifier)
        .await
        .map_err(|e| remote_error("Failed to delete endpoint gateway", e).for_resource(id.clone()))
}
