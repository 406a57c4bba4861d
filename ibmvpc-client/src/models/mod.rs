//! VPC API request and response models
//!
//! Polymorphic payloads are closed enums with an explicit discriminant
//! (`DnsResolver`, `EndpointGatewayTarget`, `BareMetalServerNetworkAttachment`,
//! `RouteNextHop`).

pub mod bare_metal;
pub mod dns_binding;
pub mod endpoint_gateway;
pub mod routing;
pub mod vpc;

use serde::{Deserialize, Serialize};

pub use bare_metal::*;
pub use dns_binding::*;
pub use endpoint_gateway::*;
pub use routing::*;
pub use vpc::*;

/// Link to a page of a paginated collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLink {
    pub href: String,
}

/// Reference to a VPC as embedded in other objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpcReference {
    pub id: String,
    pub crn: Option<String>,
    pub href: Option<String>,
    pub name: Option<String>,
    pub resource_type: Option<String>,
}

/// Identifies a VPC in a request, by ID or by CRN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VpcIdentity {
    Id { id: String },
    Crn { crn: String },
}

impl VpcIdentity {
    pub fn by_id(id: impl Into<String>) -> Self {
        VpcIdentity::Id { id: id.into() }
    }

    pub fn by_crn(crn: impl Into<String>) -> Self {
        VpcIdentity::Crn { crn: crn.into() }
    }

    /// Whether this identity refers to the given VPC
    pub fn matches(&self, vpc: &VpcReference) -> bool {
        match self {
            VpcIdentity::Id { id } => &vpc.id == id,
            VpcIdentity::Crn { crn } => vpc.crn.as_deref() == Some(crn.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneReference {
    pub name: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetReference {
    pub id: String,
    pub crn: Option<String>,
    pub href: Option<String>,
    pub name: Option<String>,
    pub resource_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservedIpReference {
    pub id: String,
    pub address: String,
    pub href: Option<String>,
    pub name: Option<String>,
    pub resource_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroupReference {
    pub id: String,
    pub href: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroupIdentity {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetIdentity {
    pub id: String,
}

/// Reason a resource is not healthy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReason {
    pub code: String,
    pub message: String,
    pub more_info: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vpc_identity_serializes_flat() {
        assert_eq!(
            serde_json::to_value(VpcIdentity::by_id("r006-1")).unwrap(),
            json!({"id": "r006-1"})
        );
        assert_eq!(
            serde_json::to_value(VpcIdentity::by_crn("crn:v1:x")).unwrap(),
            json!({"crn": "crn:v1:x"})
        );
    }

    #[test]
    fn vpc_identity_matches_reference() {
        let vpc = VpcReference {
            id: "r006-1".to_string(),
            crn: Some("crn:v1:x".to_string()),
            href: None,
            name: None,
            resource_type: None,
        };
        assert!(VpcIdentity::by_id("r006-1").matches(&vpc));
        assert!(VpcIdentity::by_crn("crn:v1:x").matches(&vpc));
        assert!(!VpcIdentity::by_id("r006-2").matches(&vpc));
    }
}
