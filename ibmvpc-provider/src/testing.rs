//! In-memory `VpcApi` used by the provider tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ibmvpc_client::models::*;
use ibmvpc_client::{ClientError, Result, VpcApi};

/// A recorded API call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetVpc(String),
    UpdateVpc(String, serde_json::Value),
    CreateBinding(String, serde_json::Value),
    GetBinding(String, String),
    UpdateBinding(String, String, serde_json::Value),
    DeleteBinding(String, String),
    ListBindings(String, Option<String>),
    CreateGateway(serde_json::Value),
    GetGateway(String),
    UpdateGateway(String, serde_json::Value),
    DeleteGateway(String),
    ListAttachments(String, Option<String>),
    ListRoutes(String, String, Option<String>),
}

#[derive(Default)]
struct Inner {
    vpcs: HashMap<String, Vpc>,
    /// (owning VPC id, binding)
    bindings: Vec<(String, DnsResolutionBinding)>,
    gateways: HashMap<String, EndpointGateway>,
    attachments: HashMap<String, Vec<BareMetalServerNetworkAttachment>>,
    routes: HashMap<(String, String), Vec<Route>>,
    calls: Vec<Call>,
    fail_vpc_update: bool,
    fail_binding_delete: bool,
    page_size: Option<usize>,
    next_id: u32,
}

pub struct MockVpcApi {
    inner: Mutex<Inner>,
}

pub fn api_error(status: u16, code: &str, message: &str) -> ClientError {
    ClientError::Api {
        status,
        code: Some(code.to_string()),
        message: message.to_string(),
        trace: None,
    }
}

fn not_found(what: &str, id: &str) -> ClientError {
    api_error(404, "not_found", &format!("{} not found: {}", what, id))
}

pub fn vpc(id: &str) -> Vpc {
    Vpc {
        id: id.to_string(),
        crn: vpc_crn(id),
        name: format!("{}-name", id),
        href: Some(format!("https://us-south.iaas.cloud.ibm.com/v1/vpcs/{}", id)),
        status: Some("available".to_string()),
        created_at: Some("2024-05-01T10:00:00Z".to_string()),
        dns: Some(VpcDns {
            enable_hub: false,
            resolution_binding_count: 0,
            resolver: DnsResolver::System {
                configuration: Some("default".to_string()),
                servers: vec![],
            },
        }),
    }
}

pub fn vpc_crn(id: &str) -> String {
    format!("crn:v1:bluemix:public:is:us-south:a/123::vpc:{}", id)
}

fn page_href(path: &str, start: usize) -> PageLink {
    PageLink {
        href: format!(
            "https://us-south.iaas.cloud.ibm.com/v1/{}?limit=50&start={}",
            path, start
        ),
    }
}

/// Slice `items` into the page beginning at `start`
fn page<T: Clone>(
    items: &[T],
    start: Option<&str>,
    page_size: Option<usize>,
    path: &str,
) -> (Vec<T>, Option<PageLink>) {
    let offset = start.and_then(|s| s.parse::<usize>().ok()).unwrap_or(0);
    let size = page_size.unwrap_or(50);
    let end = (offset + size).min(items.len());
    let slice = items.get(offset..end).unwrap_or(&[]).to_vec();
    let next = (end < items.len()).then(|| page_href(path, end));
    (slice, next)
}

impl MockVpcApi {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_vpc(self, vpc: Vpc) -> Self {
        self.inner.lock().unwrap().vpcs.insert(vpc.id.clone(), vpc);
        self
    }

    pub fn with_binding(self, owner: &str, binding: DnsResolutionBinding) -> Self {
        self.inner
            .lock()
            .unwrap()
            .bindings
            .push((owner.to_string(), binding));
        self
    }

    pub fn with_attachments(
        self,
        server_id: &str,
        attachments: Vec<BareMetalServerNetworkAttachment>,
    ) -> Self {
        self.inner
            .lock()
            .unwrap()
            .attachments
            .insert(server_id.to_string(), attachments);
        self
    }

    pub fn with_routes(self, vpc_id: &str, table_id: &str, routes: Vec<Route>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .routes
            .insert((vpc_id.to_string(), table_id.to_string()), routes);
        self
    }

    pub fn with_page_size(self, size: usize) -> Self {
        self.inner.lock().unwrap().page_size = Some(size);
        self
    }

    pub fn fail_vpc_update(&self) {
        self.inner.lock().unwrap().fail_vpc_update = true;
    }

    pub fn fail_binding_delete(&self) {
        self.inner.lock().unwrap().fail_binding_delete = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn count_calls(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn bindings(&self, owner: &str) -> Vec<DnsResolutionBinding> {
        self.inner
            .lock()
            .unwrap()
            .bindings
            .iter()
            .filter(|(o, _)| o == owner)
            .map(|(_, b)| b.clone())
            .collect()
    }

    pub fn vpc_dns(&self, id: &str) -> Option<VpcDns> {
        self.inner
            .lock()
            .unwrap()
            .vpcs
            .get(id)
            .and_then(|v| v.dns.clone())
    }

    pub fn gateway(&self, id: &str) -> Option<EndpointGateway> {
        self.inner.lock().unwrap().gateways.get(id).cloned()
    }
}

impl Inner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn vpc_reference(&self, identity: &VpcIdentity) -> VpcReference {
        let id = match identity {
            VpcIdentity::Id { id } => id.clone(),
            VpcIdentity::Crn { crn } => self
                .vpcs
                .values()
                .find(|v| &v.crn == crn)
                .map(|v| v.id.clone())
                .unwrap_or_else(|| crn.rsplit(':').next().unwrap_or_default().to_string()),
        };
        let name = self.vpcs.get(&id).map(|v| v.name.clone());
        VpcReference {
            crn: Some(vpc_crn(&id)),
            href: Some(format!("https://us-south.iaas.cloud.ibm.com/v1/vpcs/{}", id)),
            name,
            resource_type: Some("vpc".to_string()),
            id,
        }
    }

    fn binding_count(&self, vpc_id: &str) -> i64 {
        self.bindings.iter().filter(|(o, _)| o == vpc_id).count() as i64
    }
}

#[async_trait]
impl VpcApi for MockVpcApi {
    async fn get_vpc(&self, id: &str) -> Result<Vpc> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::GetVpc(id.to_string()));
        inner
            .vpcs
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("VPC", id))
    }

    async fn update_vpc(&self, id: &str, patch: &VpcPatch) -> Result<Vpc> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::UpdateVpc(
            id.to_string(),
            serde_json::to_value(patch).unwrap(),
        ));
        if inner.fail_vpc_update {
            return Err(api_error(
                400,
                "vpc_dns_resolver_invalid",
                "The DNS resolver configuration is invalid",
            ));
        }
        let count = inner.binding_count(id);
        let resolver = patch.dns.resolver.as_ref().map(|r| match r.resolver_type {
            ResolverType::System => DnsResolver::System {
                configuration: Some("default".to_string()),
                servers: vec![],
            },
            ResolverType::Manual => {
                let servers: Vec<DnsServer> = r
                    .manual_servers
                    .iter()
                    .flatten()
                    .map(|s| DnsServer {
                        address: s.address.clone(),
                        zone_affinity: s.zone_affinity.as_ref().map(|z| ZoneReference {
                            name: z.name.clone(),
                            href: None,
                        }),
                    })
                    .collect();
                DnsResolver::Manual {
                    configuration: Some("custom_resolver".to_string()),
                    manual_servers: servers.clone(),
                    servers,
                }
            }
            ResolverType::Delegated => DnsResolver::Delegated {
                configuration: Some("default".to_string()),
                vpc: r.vpc.clone().flatten().map(|i| inner.vpc_reference(&i)),
                servers: vec![DnsServer {
                    address: "161.26.0.7".to_string(),
                    zone_affinity: None,
                }],
            },
        });

        let vpc = inner.vpcs.get_mut(id).ok_or_else(|| not_found("VPC", id))?;
        let dns = vpc.dns.get_or_insert(VpcDns {
            enable_hub: false,
            resolution_binding_count: 0,
            resolver: DnsResolver::System {
                configuration: None,
                servers: vec![],
            },
        });
        if let Some(enable_hub) = patch.dns.enable_hub {
            dns.enable_hub = enable_hub;
        }
        if let Some(resolver) = resolver {
            dns.resolver = resolver;
        }
        dns.resolution_binding_count = count;
        Ok(vpc.clone())
    }

    async fn create_dns_resolution_binding(
        &self,
        vpc_id: &str,
        prototype: &DnsResolutionBindingPrototype,
    ) -> Result<DnsResolutionBinding> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::CreateBinding(
            vpc_id.to_string(),
            serde_json::to_value(prototype).unwrap(),
        ));
        let id = inner.next_id("r006-binding");
        let binding = DnsResolutionBinding {
            name: prototype
                .name
                .clone()
                .unwrap_or_else(|| format!("generated-{}", id)),
            href: format!(
                "https://us-south.iaas.cloud.ibm.com/v1/vpcs/{}/dns_resolution_bindings/{}",
                vpc_id, id
            ),
            created_at: "2024-05-01T10:00:00Z".to_string(),
            endpoint_gateways: vec![],
            health_state: "ok".to_string(),
            health_reasons: vec![],
            lifecycle_state: "stable".to_string(),
            resource_type: "vpc_dns_resolution_binding".to_string(),
            vpc: inner.vpc_reference(&prototype.vpc),
            id,
        };
        inner.bindings.push((vpc_id.to_string(), binding.clone()));
        Ok(binding)
    }

    async fn get_dns_resolution_binding(
        &self,
        vpc_id: &str,
        id: &str,
    ) -> Result<DnsResolutionBinding> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::GetBinding(vpc_id.to_string(), id.to_string()));
        inner
            .bindings
            .iter()
            .find(|(o, b)| o == vpc_id && b.id == id)
            .map(|(_, b)| b.clone())
            .ok_or_else(|| not_found("DNS resolution binding", id))
    }

    async fn update_dns_resolution_binding(
        &self,
        vpc_id: &str,
        id: &str,
        patch: &DnsResolutionBindingPatch,
    ) -> Result<DnsResolutionBinding> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::UpdateBinding(
            vpc_id.to_string(),
            id.to_string(),
            serde_json::to_value(patch).unwrap(),
        ));
        let (_, binding) = inner
            .bindings
            .iter_mut()
            .find(|(o, b)| o == vpc_id && b.id == id)
            .ok_or_else(|| not_found("DNS resolution binding", id))?;
        binding.name = patch.name.clone();
        Ok(binding.clone())
    }

    async fn delete_dns_resolution_binding(&self, vpc_id: &str, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::DeleteBinding(vpc_id.to_string(), id.to_string()));
        if inner.fail_binding_delete {
            return Err(api_error(
                409,
                "dns_resolution_binding_in_use",
                "The binding cannot be deleted",
            ));
        }
        let before = inner.bindings.len();
        inner.bindings.retain(|(o, b)| !(o == vpc_id && b.id == id));
        if inner.bindings.len() == before {
            return Err(not_found("DNS resolution binding", id));
        }
        Ok(())
    }

    async fn list_dns_resolution_bindings(
        &self,
        vpc_id: &str,
        start: Option<String>,
    ) -> Result<DnsResolutionBindingCollection> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::ListBindings(vpc_id.to_string(), start.clone()));
        let owned: Vec<_> = inner
            .bindings
            .iter()
            .filter(|(o, _)| o == vpc_id)
            .map(|(_, b)| b.clone())
            .collect();
        let (items, next) = page(
            &owned,
            start.as_deref(),
            inner.page_size,
            &format!("vpcs/{}/dns_resolution_bindings", vpc_id),
        );
        Ok(DnsResolutionBindingCollection {
            dns_resolution_bindings: items,
            next,
            total_count: Some(owned.len() as i64),
        })
    }

    async fn create_endpoint_gateway(
        &self,
        prototype: &EndpointGatewayPrototype,
    ) -> Result<EndpointGateway> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::CreateGateway(serde_json::to_value(prototype).unwrap()));
        let id = inner.next_id("r006-egw");
        let ips = prototype
            .ips
            .iter()
            .enumerate()
            .map(|(i, ip)| ReservedIpReference {
                id: format!("{}-ip{}", id, i),
                address: format!("10.240.{}.10", i),
                href: None,
                name: Some(format!("{}-ip", ip.subnet.id)),
                resource_type: Some("subnet_reserved_ip".to_string()),
            })
            .collect();
        let gateway = EndpointGateway {
            crn: format!("crn:v1:bluemix:public:is:us-south:a/123::endpoint-gateway:{}", id),
            name: prototype.name.clone(),
            href: None,
            created_at: "2024-05-01T10:00:00Z".to_string(),
            allow_dns_resolution_binding: prototype.allow_dns_resolution_binding.unwrap_or(true),
            health_state: "ok".to_string(),
            lifecycle_state: "stable".to_string(),
            ips,
            service_endpoints: vec!["s3.direct.us-south.cloud-object-storage.appdomain.cloud".to_string()],
            target: prototype.target.clone(),
            vpc: inner.vpc_reference(&prototype.vpc),
            resource_group: prototype.resource_group.as_ref().map(|g| ResourceGroupReference {
                id: g.id.clone(),
                href: None,
                name: None,
            }),
            id: id.clone(),
        };
        inner.gateways.insert(id, gateway.clone());
        Ok(gateway)
    }

    async fn get_endpoint_gateway(&self, id: &str) -> Result<EndpointGateway> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::GetGateway(id.to_string()));
        inner
            .gateways
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("Endpoint gateway", id))
    }

    async fn update_endpoint_gateway(
        &self,
        id: &str,
        patch: &EndpointGatewayPatch,
    ) -> Result<EndpointGateway> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::UpdateGateway(
            id.to_string(),
            serde_json::to_value(patch).unwrap(),
        ));
        let gateway = inner
            .gateways
            .get_mut(id)
            .ok_or_else(|| not_found("Endpoint gateway", id))?;
        if let Some(name) = &patch.name {
            gateway.name = name.clone();
        }
        if let Some(allow) = patch.allow_dns_resolution_binding {
            gateway.allow_dns_resolution_binding = allow;
        }
        Ok(gateway.clone())
    }

    async fn delete_endpoint_gateway(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::DeleteGateway(id.to_string()));
        inner
            .gateways
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Endpoint gateway", id))
    }

    async fn list_bare_metal_server_network_attachments(
        &self,
        bare_metal_server_id: &str,
        start: Option<String>,
    ) -> Result<BareMetalServerNetworkAttachmentCollection> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ListAttachments(
            bare_metal_server_id.to_string(),
            start.clone(),
        ));
        let all = inner
            .attachments
            .get(bare_metal_server_id)
            .cloned()
            .ok_or_else(|| not_found("Bare metal server", bare_metal_server_id))?;
        let (items, next) = page(
            &all,
            start.as_deref(),
            inner.page_size,
            &format!("bare_metal_servers/{}/network_attachments", bare_metal_server_id),
        );
        Ok(BareMetalServerNetworkAttachmentCollection {
            network_attachments: items,
            next,
        })
    }

    async fn list_vpc_routing_table_routes(
        &self,
        vpc_id: &str,
        routing_table_id: &str,
        start: Option<String>,
    ) -> Result<RouteCollection> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ListRoutes(
            vpc_id.to_string(),
            routing_table_id.to_string(),
            start.clone(),
        ));
        let all = inner
            .routes
            .get(&(vpc_id.to_string(), routing_table_id.to_string()))
            .cloned()
            .ok_or_else(|| not_found("Routing table", routing_table_id))?;
        let (items, next) = page(
            &all,
            start.as_deref(),
            inner.page_size,
            &format!("vpcs/{}/routing_tables/{}/routes", vpc_id, routing_table_id),
        );
        Ok(RouteCollection { routes: items, next })
    }
}
