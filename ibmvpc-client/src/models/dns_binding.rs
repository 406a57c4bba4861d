//! DNS resolution bindings (`/vpcs/{vpc_id}/dns_resolution_bindings`)

use serde::{Deserialize, Serialize};

use super::{HealthReason, PageLink, VpcIdentity, VpcReference};
use crate::pager::{Paginated, start_token};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DnsResolutionBinding {
    pub id: String,
    pub name: String,
    pub href: String,
    pub created_at: String,
    #[serde(default)]
    pub endpoint_gateways: Vec<EndpointGatewayReferenceRemote>,
    pub health_state: String,
    #[serde(default)]
    pub health_reasons: Vec<HealthReason>,
    pub lifecycle_state: String,
    pub resource_type: String,
    /// The VPC the binding delegates resolution to
    pub vpc: VpcReference,
}

/// Endpoint gateway reference, possibly in another account
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndpointGatewayReferenceRemote {
    pub id: String,
    pub crn: String,
    pub href: Option<String>,
    pub name: String,
    pub resource_type: Option<String>,
}

/// Body of `POST /vpcs/{vpc_id}/dns_resolution_bindings`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnsResolutionBindingPrototype {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub vpc: VpcIdentity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnsResolutionBindingPatch {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DnsResolutionBindingCollection {
    #[serde(default)]
    pub dns_resolution_bindings: Vec<DnsResolutionBinding>,
    pub next: Option<PageLink>,
    pub total_count: Option<i64>,
}

impl Paginated for DnsResolutionBindingCollection {
    type Item = DnsResolutionBinding;

    fn next_start(&self) -> Option<String> {
        self.next.as_ref().and_then(|n| start_token(&n.href))
    }

    fn into_items(self) -> Vec<Self::Item> {
        self.dns_resolution_bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collection_exposes_next_start() {
        let page: DnsResolutionBindingCollection = serde_json::from_value(json!({
            "dns_resolution_bindings": [{
                "id": "r006-b1",
                "name": "spoke-to-hub",
                "href": "https://us-south.iaas.cloud.ibm.com/v1/vpcs/r006-spoke/dns_resolution_bindings/r006-b1",
                "created_at": "2024-05-01T10:00:00Z",
                "health_state": "ok",
                "lifecycle_state": "stable",
                "resource_type": "vpc_dns_resolution_binding",
                "vpc": {"id": "r006-hub", "crn": "crn:v1:hub", "name": "hub", "resource_type": "vpc"}
            }],
            "limit": 1,
            "total_count": 2,
            "next": {"href": "https://us-south.iaas.cloud.ibm.com/v1/vpcs/r006-spoke/dns_resolution_bindings?start=r006-b2&limit=1"}
        }))
        .unwrap();

        assert_eq!(page.next_start().as_deref(), Some("r006-b2"));
        let items = page.into_items();
        assert_eq!(items.len(), 1);
        assert!(items[0].endpoint_gateways.is_empty());
    }

    #[test]
    fn prototype_omits_missing_name() {
        let proto = DnsResolutionBindingPrototype {
            name: None,
            vpc: VpcIdentity::by_id("r006-hub"),
        };
        assert_eq!(
            serde_json::to_value(&proto).unwrap(),
            json!({"vpc": {"id": "r006-hub"}})
        );
    }
}
