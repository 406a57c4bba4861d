//! VPC DNS resolver configuration
//!
//! A VPC's resolver runs in one of three modes. `system` uses the
//! provider-managed resolvers, `manual` uses a user-supplied server list and
//! `delegated` forwards resolution to a hub VPC through a DNS resolution
//! binding owned by the spoke VPC.
//!
//! The binding and the VPC `dns` block are updated by separate API calls, so
//! every transition is ordered:
//!
//! - create: binding first, then the VPC patch; if the patch fails the new
//!   binding is deleted again and the patch error is returned
//! - update: stale binding deleted, new binding created, VPC patched
//! - delete: binding deleted, then the VPC reset to `system`
//!
//! Deleting a stale binding is best effort: failures are logged and the
//! transition carries on.

use std::collections::HashMap;

use ibmvpc_client::models::{
    DnsResolutionBinding, DnsResolutionBindingPatch, DnsResolutionBindingPrototype,
    DnsResolver, DnsResolverPatch, DnsServer, DnsServerPrototype, ResolverType, Vpc,
    VpcDnsPatch, VpcIdentity, VpcPatch, ZoneIdentity,
};
use ibmvpc_client::{Pager, VpcApi};
use ibmvpc_core::provider::{ProviderError, ProviderResult};
use ibmvpc_core::resource::{ResourceId, State, Value};

use crate::utils::{
    Attributes, as_map, insert_opt, insert_str, list, optional_bool, optional_string,
    remote_error, required_string,
};

/// Validated configuration of an `is_vpc_dns_config` resource
#[derive(Debug, Clone, PartialEq)]
pub struct DnsConfigSpec {
    pub vpc_id: String,
    pub enable_hub: bool,
    pub resolver: ResolverSpec,
    pub dns_binding_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolverSpec {
    System,
    Manual { servers: Vec<ManualServer> },
    Delegated { vpc: VpcIdentity },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManualServer {
    pub address: String,
    pub zone_affinity: Option<String>,
}

impl ResolverSpec {
    pub fn resolver_type(&self) -> ResolverType {
        match self {
            ResolverSpec::System => ResolverType::System,
            ResolverSpec::Manual { .. } => ResolverType::Manual,
            ResolverSpec::Delegated { .. } => ResolverType::Delegated,
        }
    }

    fn delegated_vpc(&self) -> Option<&VpcIdentity> {
        match self {
            ResolverSpec::Delegated { vpc } => Some(vpc),
            _ => None,
        }
    }
}

impl DnsConfigSpec {
    /// Parse and validate resource attributes.
    ///
    /// Fails with a validation error when
    /// - `delegated` has neither or both of `resolver_vpc_id`/`resolver_vpc_crn`
    /// - `delegated` has `enable_hub = true`
    /// - `manual` has no `manual_servers`
    pub fn from_attributes(attrs: &Attributes) -> ProviderResult<Self> {
        let vpc_id = required_string(attrs, "vpc_id")?;
        let enable_hub = optional_bool(attrs, "enable_hub")?.unwrap_or(false);
        let resolver_type = match optional_string(attrs, "resolver_type")? {
            Some(s) => s.parse::<ResolverType>().map_err(ProviderError::validation)?,
            None => ResolverType::System,
        };
        let manual_servers = parse_manual_servers(attrs)?;
        let resolver_vpc_id = optional_string(attrs, "resolver_vpc_id")?;
        let resolver_vpc_crn = optional_string(attrs, "resolver_vpc_crn")?;
        let dns_binding_name = optional_string(attrs, "dns_binding_name")?;

        let resolver = match resolver_type {
            ResolverType::Delegated => {
                if enable_hub {
                    return Err(ProviderError::validation(
                        "enable_hub must be false when resolver_type is delegated",
                    ));
                }
                let vpc = match (resolver_vpc_id, resolver_vpc_crn) {
                    (Some(id), None) => VpcIdentity::by_id(id),
                    (None, Some(crn)) => VpcIdentity::by_crn(crn),
                    (None, None) => {
                        return Err(ProviderError::validation(
                            "resolver_type delegated requires resolver_vpc_id or resolver_vpc_crn",
                        ));
                    }
                    (Some(_), Some(_)) => {
                        return Err(ProviderError::validation(
                            "only one of resolver_vpc_id and resolver_vpc_crn may be set",
                        ));
                    }
                };
                if !manual_servers.is_empty() {
                    log::warn!(
                        "VPC {}: manual_servers is ignored when resolver_type is delegated",
                        vpc_id
                    );
                }
                ResolverSpec::Delegated { vpc }
            }
            ResolverType::Manual => {
                if manual_servers.is_empty() {
                    return Err(ProviderError::validation(
                        "resolver_type manual requires at least one entry in manual_servers",
                    ));
                }
                warn_ignored_resolver_vpc(
                    &vpc_id,
                    resolver_type,
                    resolver_vpc_id.as_deref(),
                    resolver_vpc_crn.as_deref(),
                );
                ResolverSpec::Manual {
                    servers: manual_servers,
                }
            }
            ResolverType::System => {
                if !manual_servers.is_empty() {
                    log::warn!(
                        "VPC {}: manual_servers is ignored when resolver_type is system",
                        vpc_id
                    );
                }
                warn_ignored_resolver_vpc(
                    &vpc_id,
                    resolver_type,
                    resolver_vpc_id.as_deref(),
                    resolver_vpc_crn.as_deref(),
                );
                ResolverSpec::System
            }
        };

        if dns_binding_name.is_some() && resolver.delegated_vpc().is_none() {
            log::warn!(
                "VPC {}: dns_binding_name is only used when resolver_type is delegated",
                vpc_id
            );
        }

        Ok(Self {
            vpc_id,
            enable_hub,
            resolver,
            dns_binding_name,
        })
    }

    /// Patch applying this configuration to the VPC.
    ///
    /// `clear_resolver_vpc` sends `resolver.vpc: null`, needed when leaving
    /// delegated mode.
    pub fn to_patch(&self, clear_resolver_vpc: bool) -> VpcPatch {
        let clear = clear_resolver_vpc.then_some(None);
        let resolver = match &self.resolver {
            ResolverSpec::System => DnsResolverPatch {
                resolver_type: ResolverType::System,
                manual_servers: None,
                vpc: clear,
            },
            ResolverSpec::Manual { servers } => DnsResolverPatch {
                resolver_type: ResolverType::Manual,
                manual_servers: Some(
                    servers
                        .iter()
                        .map(|s| DnsServerPrototype {
                            address: s.address.clone(),
                            zone_affinity: s.zone_affinity.clone().map(|name| ZoneIdentity { name }),
                        })
                        .collect(),
                ),
                vpc: clear,
            },
            ResolverSpec::Delegated { vpc } => DnsResolverPatch {
                resolver_type: ResolverType::Delegated,
                manual_servers: None,
                vpc: Some(Some(vpc.clone())),
            },
        };
        VpcPatch {
            dns: VpcDnsPatch {
                enable_hub: Some(self.enable_hub),
                resolver: Some(resolver),
            },
        }
    }

    fn binding_prototype(&self, vpc: &VpcIdentity) -> DnsResolutionBindingPrototype {
        DnsResolutionBindingPrototype {
            name: self.dns_binding_name.clone(),
            vpc: vpc.clone(),
        }
    }
}

fn parse_manual_servers(attrs: &Attributes) -> ProviderResult<Vec<ManualServer>> {
    list(attrs, "manual_servers")?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let map = as_map(item, &format!("manual_servers[{}]", i))?;
            let address = optional_string(map, "address")?.ok_or_else(|| {
                ProviderError::validation(format!("manual_servers[{}].address is required", i))
            })?;
            Ok(ManualServer {
                address,
                zone_affinity: optional_string(map, "zone_affinity")?,
            })
        })
        .collect()
}

fn warn_ignored_resolver_vpc(
    vpc_id: &str,
    resolver_type: ResolverType,
    id: Option<&str>,
    crn: Option<&str>,
) {
    if id.is_some() || crn.is_some() {
        log::warn!(
            "VPC {}: resolver_vpc_id/resolver_vpc_crn is ignored when resolver_type is {}",
            vpc_id,
            resolver_type
        );
    }
}

/// Binding tracked in the resource's computed attributes
#[derive(Debug, Clone, PartialEq)]
pub struct BoundBinding {
    pub id: String,
    pub name: String,
}

impl From<&DnsResolutionBinding> for BoundBinding {
    fn from(b: &DnsResolutionBinding) -> Self {
        Self {
            id: b.id.clone(),
            name: b.name.clone(),
        }
    }
}

fn dns_server_to_map(server: &DnsServer) -> Value {
    let mut map = HashMap::new();
    insert_str(&mut map, "address", &server.address);
    insert_opt(
        &mut map,
        "zone_affinity",
        server.zone_affinity.as_ref().map(|z| z.name.as_str()),
    );
    Value::Map(map)
}

/// Flatten a VPC's `dns` block into resource attributes
pub fn dns_config_to_map(vpc: &Vpc, binding: Option<&BoundBinding>) -> HashMap<String, Value> {
    let mut attrs = HashMap::new();
    insert_str(&mut attrs, "vpc_id", &vpc.id);

    if let Some(dns) = &vpc.dns {
        attrs.insert("enable_hub".to_string(), Value::Bool(dns.enable_hub));
        attrs.insert(
            "resolution_binding_count".to_string(),
            Value::Int(dns.resolution_binding_count),
        );
        insert_str(&mut attrs, "resolver_type", dns.resolver.resolver_type().as_str());
        insert_opt(&mut attrs, "resolver_configuration", dns.resolver.configuration());
        attrs.insert(
            "resolver_servers".to_string(),
            Value::List(dns.resolver.servers().iter().map(dns_server_to_map).collect()),
        );

        match &dns.resolver {
            DnsResolver::Manual { manual_servers, .. } => {
                attrs.insert(
                    "manual_servers".to_string(),
                    Value::List(manual_servers.iter().map(dns_server_to_map).collect()),
                );
            }
            DnsResolver::Delegated { vpc: Some(hub), .. } => {
                insert_str(&mut attrs, "resolver_vpc_id", &hub.id);
                insert_opt(&mut attrs, "resolver_vpc_crn", hub.crn.as_deref());
            }
            _ => {}
        }
    }

    if let Some(binding) = binding {
        insert_str(&mut attrs, "dns_resolution_binding_id", &binding.id);
        insert_str(&mut attrs, "dns_binding_name", &binding.name);
    }
    attrs
}

fn to_state(id: &ResourceId, vpc: &Vpc, binding: Option<&BoundBinding>) -> State {
    State::existing(id.clone(), dns_config_to_map(vpc, binding)).with_identifier(vpc.id.clone())
}

async fn create_binding(
    api: &dyn VpcApi,
    id: &ResourceId,
    spec: &DnsConfigSpec,
    hub: &VpcIdentity,
) -> ProviderResult<DnsResolutionBinding> {
    log::info!("Creating DNS resolution binding for VPC {}", spec.vpc_id);
    let binding = api
        .create_dns_resolution_binding(&spec.vpc_id, &spec.binding_prototype(hub))
        .await
        .map_err(|e| {
            remote_error("Failed to create DNS resolution binding", e).for_resource(id.clone())
        })?;
    log::info!(
        "Created DNS resolution binding {} ({}) for VPC {}",
        binding.id,
        binding.name,
        spec.vpc_id
    );
    Ok(binding)
}

/// Delete a binding, logging instead of failing
async fn delete_binding_best_effort(api: &dyn VpcApi, vpc_id: &str, binding_id: &str) {
    log::info!(
        "Deleting DNS resolution binding {} of VPC {}",
        binding_id,
        vpc_id
    );
    if let Err(e) = api.delete_dns_resolution_binding(vpc_id, binding_id).await {
        log::warn!(
            "Failed to delete DNS resolution binding {} of VPC {}: {}",
            binding_id,
            vpc_id,
            e
        );
    }
}

/// Patch the VPC, undoing `created` if the patch fails
async fn patch_or_rollback(
    api: &dyn VpcApi,
    id: &ResourceId,
    vpc_id: &str,
    patch: &VpcPatch,
    created: Option<&DnsResolutionBinding>,
) -> ProviderResult<Vpc> {
    match api.update_vpc(vpc_id, patch).await {
        Ok(vpc) => Ok(vpc),
        Err(e) => {
            if let Some(binding) = created {
                log::warn!(
                    "Updating DNS configuration of VPC {} failed; removing binding {}",
                    vpc_id,
                    binding.id
                );
                delete_binding_best_effort(api, vpc_id, &binding.id).await;
            }
            Err(remote_error("Failed to update VPC DNS configuration", e).for_resource(id.clone()))
        }
    }
}

pub async fn create(
    api: &dyn VpcApi,
    id: &ResourceId,
    spec: &DnsConfigSpec,
) -> ProviderResult<State> {
    let created = match spec.resolver.delegated_vpc() {
        Some(hub) => Some(create_binding(api, id, spec, hub).await?),
        None => None,
    };

    let vpc = patch_or_rollback(api, id, &spec.vpc_id, &spec.to_patch(false), created.as_ref())
        .await?;
    Ok(to_state(id, &vpc, created.as_ref().map(BoundBinding::from).as_ref()))
}

pub async fn read(
    api: &dyn VpcApi,
    id: &ResourceId,
    vpc_id: &str,
    prior: Option<&State>,
) -> ProviderResult<State> {
    let vpc = match api.get_vpc(vpc_id).await {
        Ok(vpc) => vpc,
        Err(e) if e.is_not_found() => return Ok(State::not_found(id.clone())),
        Err(e) => {
            return Err(remote_error("Failed to read VPC", e).for_resource(id.clone()));
        }
    };

    let hub_id = match vpc.dns.as_ref().map(|d| &d.resolver) {
        Some(DnsResolver::Delegated { vpc: hub, .. }) => Some(hub.as_ref().map(|h| h.id.clone())),
        _ => None,
    };
    let binding = match hub_id {
        Some(hub_id) => {
            let stored = prior.and_then(|s| s.get_str("dns_resolution_binding_id"));
            find_binding(api, id, vpc_id, stored, hub_id.as_deref()).await?
        }
        None => None,
    };

    Ok(to_state(id, &vpc, binding.as_ref()))
}

/// Locate the binding backing delegation: by stored id, else by hub VPC
async fn find_binding(
    api: &dyn VpcApi,
    id: &ResourceId,
    vpc_id: &str,
    stored_id: Option<&str>,
    hub_id: Option<&str>,
) -> ProviderResult<Option<BoundBinding>> {
    let bindings = Pager::new(move |start: Option<String>| api.list_dns_resolution_bindings(vpc_id, start))
        .collect_all()
        .await
        .map_err(|e| {
            remote_error("Failed to list DNS resolution bindings", e).for_resource(id.clone())
        })?;

    let found = match stored_id {
        Some(stored) => bindings.iter().find(|b| b.id == stored),
        None => bindings.iter().find(|b| Some(b.vpc.id.as_str()) == hub_id),
    };
    Ok(found.map(BoundBinding::from))
}

/// Resolver settings recorded in the last known state
struct PriorResolver<'a> {
    resolver_type: ResolverType,
    vpc_id: Option<&'a str>,
    vpc_crn: Option<&'a str>,
    binding: Option<BoundBinding>,
}

impl<'a> PriorResolver<'a> {
    fn from_state(state: &'a State) -> Self {
        let resolver_type = state
            .get_str("resolver_type")
            .and_then(|s| s.parse().ok())
            .unwrap_or(ResolverType::System);
        let binding = state
            .get_str("dns_resolution_binding_id")
            .map(|binding_id| BoundBinding {
                id: binding_id.to_string(),
                name: state.get_str("dns_binding_name").unwrap_or_default().to_string(),
            });
        Self {
            resolver_type,
            vpc_id: state.get_str("resolver_vpc_id"),
            vpc_crn: state.get_str("resolver_vpc_crn"),
            binding,
        }
    }

    fn is_delegated_to(&self, hub: &VpcIdentity) -> bool {
        self.resolver_type == ResolverType::Delegated
            && match hub {
                VpcIdentity::Id { id } => self.vpc_id == Some(id.as_str()),
                VpcIdentity::Crn { crn } => self.vpc_crn == Some(crn.as_str()),
            }
    }
}

pub async fn update(
    api: &dyn VpcApi,
    id: &ResourceId,
    from: &State,
    spec: &DnsConfigSpec,
) -> ProviderResult<State> {
    let prior = PriorResolver::from_state(from);
    let was_delegated = prior.resolver_type == ResolverType::Delegated;
    let hub = spec.resolver.delegated_vpc();
    let keep_binding = hub.is_some_and(|h| prior.is_delegated_to(h));

    let mut binding = prior.binding.clone();
    if was_delegated
        && !keep_binding
        && let Some(stale) = binding.take()
    {
        delete_binding_best_effort(api, &spec.vpc_id, &stale.id).await;
    }

    let mut created = None;
    match hub {
        Some(hub) if binding.is_none() => {
            let new_binding = create_binding(api, id, spec, hub).await?;
            binding = Some(BoundBinding::from(&new_binding));
            created = Some(new_binding);
        }
        Some(_) => binding = rename_binding(api, id, spec, binding).await?,
        None => {}
    }

    let clear_resolver_vpc = was_delegated && hub.is_none();
    let vpc = patch_or_rollback(
        api,
        id,
        &spec.vpc_id,
        &spec.to_patch(clear_resolver_vpc),
        created.as_ref(),
    )
    .await?;
    Ok(to_state(id, &vpc, binding.as_ref()))
}

/// Apply a changed `dns_binding_name` to a kept binding
async fn rename_binding(
    api: &dyn VpcApi,
    id: &ResourceId,
    spec: &DnsConfigSpec,
    binding: Option<BoundBinding>,
) -> ProviderResult<Option<BoundBinding>> {
    match (binding, &spec.dns_binding_name) {
        (Some(current), Some(name)) if &current.name != name => {
            log::info!(
                "Renaming DNS resolution binding {} to {}",
                current.id,
                name
            );
            let renamed = api
                .update_dns_resolution_binding(
                    &spec.vpc_id,
                    &current.id,
                    &DnsResolutionBindingPatch { name: name.clone() },
                )
                .await
                .map_err(|e| {
                    remote_error("Failed to rename DNS resolution binding", e)
                        .for_resource(id.clone())
                })?;
            Ok(Some(BoundBinding::from(&renamed)))
        }
        (binding, _) => Ok(binding),
    }
}

pub async fn delete(
    api: &dyn VpcApi,
    id: &ResourceId,
    vpc_id: &str,
    from: &State,
) -> ProviderResult<()> {
    if let Some(binding_id) = from.get_str("dns_resolution_binding_id") {
        delete_binding_best_effort(api, vpc_id, binding_id).await;
    }

    let was_delegated = PriorResolver::from_state(from).resolver_type == ResolverType::Delegated;
    let reset = VpcPatch {
        dns: VpcDnsPatch::reset(was_delegated),
    };
    match api.update_vpc(vpc_id, &reset).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_not_found() => {
            log::info!("VPC {} no longer exists; nothing to reset", vpc_id);
            Ok(())
        }
        Err(e) => Err(remote_error("Failed to reset VPC DNS configuration", e)
            .for_resource(id.clone())),
    }
}
