//! VPC and its DNS configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{VpcIdentity, VpcReference, ZoneReference};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vpc {
    pub id: String,
    pub crn: String,
    pub name: String,
    pub href: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub dns: Option<VpcDns>,
}

/// DNS block of a VPC
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VpcDns {
    #[serde(default)]
    pub enable_hub: bool,
    #[serde(default)]
    pub resolution_binding_count: i64,
    pub resolver: DnsResolver,
}

/// Resolver mode of a VPC, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DnsResolver {
    System {
        configuration: Option<String>,
        #[serde(default)]
        servers: Vec<DnsServer>,
    },
    Manual {
        configuration: Option<String>,
        #[serde(default)]
        manual_servers: Vec<DnsServer>,
        #[serde(default)]
        servers: Vec<DnsServer>,
    },
    Delegated {
        configuration: Option<String>,
        vpc: Option<VpcReference>,
        #[serde(default)]
        servers: Vec<DnsServer>,
    },
}

impl DnsResolver {
    pub fn resolver_type(&self) -> ResolverType {
        match self {
            DnsResolver::System { .. } => ResolverType::System,
            DnsResolver::Manual { .. } => ResolverType::Manual,
            DnsResolver::Delegated { .. } => ResolverType::Delegated,
        }
    }

    pub fn configuration(&self) -> Option<&str> {
        match self {
            DnsResolver::System { configuration, .. }
            | DnsResolver::Manual { configuration, .. }
            | DnsResolver::Delegated { configuration, .. } => configuration.as_deref(),
        }
    }

    /// Effective DNS servers reported for the VPC
    pub fn servers(&self) -> &[DnsServer] {
        match self {
            DnsResolver::System { servers, .. }
            | DnsResolver::Manual { servers, .. }
            | DnsResolver::Delegated { servers, .. } => servers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsServer {
    pub address: String,
    pub zone_affinity: Option<ZoneReference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverType {
    System,
    Manual,
    Delegated,
}

impl ResolverType {
    pub const ALL: [&'static str; 3] = ["system", "manual", "delegated"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverType::System => "system",
            ResolverType::Manual => "manual",
            ResolverType::Delegated => "delegated",
        }
    }
}

impl fmt::Display for ResolverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolverType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(ResolverType::System),
            "manual" => Ok(ResolverType::Manual),
            "delegated" => Ok(ResolverType::Delegated),
            other => Err(format!(
                "Invalid resolver type '{}', expected one of: {}",
                other,
                Self::ALL.join(", ")
            )),
        }
    }
}

/// Body of `PATCH /vpcs/{id}` (JSON merge patch)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VpcPatch {
    pub dns: VpcDnsPatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VpcDnsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_hub: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<DnsResolverPatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnsResolverPatch {
    #[serde(rename = "type")]
    pub resolver_type: ResolverType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_servers: Option<Vec<DnsServerPrototype>>,
    /// Absent: untouched. `Some(None)`: sent as `null` to clear the resolver VPC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc: Option<Option<VpcIdentity>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnsServerPrototype {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_affinity: Option<ZoneIdentity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneIdentity {
    pub name: String,
}

impl VpcDnsPatch {
    /// Patch restoring the provider-managed default resolver
    pub fn reset(clear_resolver_vpc: bool) -> Self {
        Self {
            enable_hub: Some(false),
            resolver: Some(DnsResolverPatch {
                resolver_type: ResolverType::System,
                manual_servers: None,
                vpc: clear_resolver_vpc.then_some(None),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_delegated_resolver() {
        let vpc: Vpc = serde_json::from_value(json!({
            "id": "r006-spoke",
            "crn": "crn:v1:bluemix:public:is:us-south:a/123::vpc:r006-spoke",
            "name": "spoke",
            "status": "available",
            "dns": {
                "enable_hub": false,
                "resolution_binding_count": 1,
                "resolver": {
                    "type": "delegated",
                    "configuration": "default",
                    "servers": [
                        {"address": "10.0.0.4", "zone_affinity": {"name": "us-south-1"}}
                    ],
                    "vpc": {
                        "id": "r006-hub",
                        "crn": "crn:v1:bluemix:public:is:us-south:a/123::vpc:r006-hub",
                        "name": "hub",
                        "resource_type": "vpc"
                    }
                }
            }
        }))
        .unwrap();

        let dns = vpc.dns.unwrap();
        assert_eq!(dns.resolution_binding_count, 1);
        assert_eq!(dns.resolver.resolver_type(), ResolverType::Delegated);
        assert_eq!(dns.resolver.configuration(), Some("default"));
        assert_eq!(dns.resolver.servers().len(), 1);
        match dns.resolver {
            DnsResolver::Delegated { vpc: Some(hub), .. } => assert_eq!(hub.id, "r006-hub"),
            other => panic!("Expected delegated resolver, got {:?}", other),
        }
    }

    #[test]
    fn deserializes_system_resolver_without_servers() {
        let dns: VpcDns = serde_json::from_value(json!({
            "enable_hub": true,
            "resolution_binding_count": 0,
            "resolver": {"type": "system"}
        }))
        .unwrap();
        assert!(dns.enable_hub);
        assert!(dns.resolver.servers().is_empty());
    }

    #[test]
    fn patch_clears_resolver_vpc_with_null() {
        let patch = VpcPatch {
            dns: VpcDnsPatch {
                enable_hub: Some(false),
                resolver: Some(DnsResolverPatch {
                    resolver_type: ResolverType::System,
                    manual_servers: None,
                    vpc: Some(None),
                }),
            },
        };

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"dns": {"enable_hub": false, "resolver": {"type": "system", "vpc": null}}})
        );
    }

    #[test]
    fn reset_clears_resolver_vpc_only_when_asked() {
        assert_eq!(
            serde_json::to_value(VpcDnsPatch::reset(true)).unwrap(),
            json!({"enable_hub": false, "resolver": {"type": "system", "vpc": null}})
        );
        assert_eq!(
            serde_json::to_value(VpcDnsPatch::reset(false)).unwrap(),
            json!({"enable_hub": false, "resolver": {"type": "system"}})
        );
    }

    #[test]
    fn patch_manual_servers() {
        let patch = VpcDnsPatch {
            enable_hub: None,
            resolver: Some(DnsResolverPatch {
                resolver_type: ResolverType::Manual,
                manual_servers: Some(vec![DnsServerPrototype {
                    address: "192.168.3.4".to_string(),
                    zone_affinity: Some(ZoneIdentity {
                        name: "us-south-1".to_string(),
                    }),
                }]),
                vpc: None,
            }),
        };

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"resolver": {
                "type": "manual",
                "manual_servers": [{"address": "192.168.3.4", "zone_affinity": {"name": "us-south-1"}}]
            }})
        );
    }

    #[test]
    fn resolver_type_parse() {
        assert_eq!("manual".parse::<ResolverType>(), Ok(ResolverType::Manual));
        assert!("hub".parse::<ResolverType>().is_err());
        assert_eq!(ResolverType::Delegated.to_string(), "delegated");
    }
}
