//! Routing table routes (`/vpcs/{vpc_id}/routing_tables/{id}/routes`)

use serde::Deserialize;

use super::{PageLink, ZoneReference};
use crate::pager::{Paginated, start_token};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Route {
    pub id: String,
    pub name: String,
    pub href: String,
    /// "delegate", "delegate_vpc", "deliver" or "drop"
    pub action: String,
    #[serde(default)]
    pub advertise: bool,
    pub created_at: String,
    pub destination: String,
    pub lifecycle_state: String,
    pub next_hop: RouteNextHop,
    pub origin: Option<String>,
    #[serde(default)]
    pub priority: i64,
    pub zone: ZoneReference,
}

/// Next hop of a route: an IP address or a VPN gateway connection
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RouteNextHop {
    VpnGatewayConnection(VpnGatewayConnectionReference),
    Ip(RouteNextHopIp),
}

impl RouteNextHop {
    /// Discriminant reported to users
    pub fn kind(&self) -> &'static str {
        match self {
            RouteNextHop::VpnGatewayConnection(_) => "vpn_gateway_connection",
            RouteNextHop::Ip(_) => "ip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteNextHopIp {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VpnGatewayConnectionReference {
    pub id: String,
    pub href: String,
    pub name: String,
    pub resource_type: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteCollection {
    #[serde(default)]
    pub routes: Vec<Route>,
    pub next: Option<PageLink>,
}

impl Paginated for RouteCollection {
    type Item = Route;

    fn next_start(&self) -> Option<String> {
        self.next.as_ref().and_then(|n| start_token(&n.href))
    }

    fn into_items(self) -> Vec<Self::Item> {
        self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn next_hop_variants() {
        let ip: RouteNextHop = serde_json::from_value(json!({"address": "192.168.3.4"})).unwrap();
        assert_eq!(ip.kind(), "ip");

        let conn: RouteNextHop = serde_json::from_value(json!({
            "id": "0717-conn1",
            "href": "https://us-south.iaas.cloud.ibm.com/v1/vpn_gateways/0717-gw/connections/0717-conn1",
            "name": "my-connection",
            "resource_type": "vpn_gateway_connection"
        }))
        .unwrap();
        assert_eq!(conn.kind(), "vpn_gateway_connection");
    }

    #[test]
    fn route_without_next_page() {
        let page: RouteCollection = serde_json::from_value(json!({
            "routes": [],
            "first": {"href": "https://us-south.iaas.cloud.ibm.com/v1/vpcs/v/routing_tables/t/routes?limit=50"},
            "limit": 50
        }))
        .unwrap();
        assert_eq!(page.next_start(), None);
    }
}
