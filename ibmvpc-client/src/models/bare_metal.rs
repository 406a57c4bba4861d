//! Bare metal server network attachments

use serde::Deserialize;

use super::{PageLink, ReservedIpReference, SubnetReference};
use crate::pager::{Paginated, start_token};

/// Network attachment, discriminated by `interface_type`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "interface_type", rename_all = "snake_case")]
pub enum BareMetalServerNetworkAttachment {
    Pci(NetworkAttachmentByPci),
    Vlan(NetworkAttachmentByVlan),
}

impl BareMetalServerNetworkAttachment {
    pub fn common(&self) -> &NetworkAttachmentCommon {
        match self {
            BareMetalServerNetworkAttachment::Pci(a) => &a.common,
            BareMetalServerNetworkAttachment::Vlan(a) => &a.common,
        }
    }
}

/// Fields shared by every attachment variant
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkAttachmentCommon {
    pub id: String,
    pub name: String,
    pub href: String,
    pub created_at: String,
    pub lifecycle_state: String,
    pub port_speed: i64,
    pub primary_ip: ReservedIpReference,
    pub resource_type: String,
    pub subnet: SubnetReference,
    /// "primary" or "secondary"
    #[serde(rename = "type")]
    pub attachment_type: String,
    pub virtual_network_interface: VirtualNetworkInterfaceReference,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkAttachmentByPci {
    #[serde(flatten)]
    pub common: NetworkAttachmentCommon,
    #[serde(default)]
    pub allowed_vlans: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkAttachmentByVlan {
    #[serde(flatten)]
    pub common: NetworkAttachmentCommon,
    #[serde(default)]
    pub allow_to_float: bool,
    pub vlan: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VirtualNetworkInterfaceReference {
    pub id: String,
    pub crn: String,
    pub href: Option<String>,
    pub name: String,
    pub resource_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BareMetalServerNetworkAttachmentCollection {
    #[serde(default)]
    pub network_attachments: Vec<BareMetalServerNetworkAttachment>,
    pub next: Option<PageLink>,
}

impl Paginated for BareMetalServerNetworkAttachmentCollection {
    type Item = BareMetalServerNetworkAttachment;

    fn next_start(&self) -> Option<String> {
        self.next.as_ref().and_then(|n| start_token(&n.href))
    }

    fn into_items(self) -> Vec<Self::Item> {
        self.network_attachments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attachment_json(interface_type: &str) -> serde_json::Value {
        json!({
            "id": "0717-na1",
            "name": "eth0",
            "href": "https://us-south.iaas.cloud.ibm.com/v1/bare_metal_servers/0717-bms/network_attachments/0717-na1",
            "created_at": "2024-05-01T10:00:00Z",
            "interface_type": interface_type,
            "lifecycle_state": "stable",
            "port_speed": 100000,
            "primary_ip": {"id": "0717-ip1", "address": "10.240.0.5", "name": "my-ip", "resource_type": "subnet_reserved_ip"},
            "resource_type": "bare_metal_server_network_attachment",
            "subnet": {"id": "0717-sn1", "crn": "crn:v1:subnet", "name": "my-subnet", "resource_type": "subnet"},
            "type": "primary",
            "virtual_network_interface": {"id": "0717-vni1", "crn": "crn:v1:vni", "name": "my-vni", "resource_type": "virtual_network_interface"},
            "allowed_vlans": [4, 100],
            "vlan": 4,
            "allow_to_float": true
        })
    }

    #[test]
    fn deserializes_pci_variant() {
        let a: BareMetalServerNetworkAttachment =
            serde_json::from_value(attachment_json("pci")).unwrap();
        match &a {
            BareMetalServerNetworkAttachment::Pci(pci) => {
                assert_eq!(pci.allowed_vlans, vec![4, 100]);
            }
            other => panic!("Expected PCI attachment, got {:?}", other),
        }
        assert_eq!(a.common().primary_ip.address, "10.240.0.5");
        assert_eq!(a.common().attachment_type, "primary");
    }

    #[test]
    fn deserializes_vlan_variant() {
        let a: BareMetalServerNetworkAttachment =
            serde_json::from_value(attachment_json("vlan")).unwrap();
        match a {
            BareMetalServerNetworkAttachment::Vlan(vlan) => {
                assert_eq!(vlan.vlan, 4);
                assert!(vlan.allow_to_float);
            }
            other => panic!("Expected VLAN attachment, got {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_interface_type() {
        let result: Result<BareMetalServerNetworkAttachment, _> =
            serde_json::from_value(attachment_json("hipersocket"));
        assert!(result.is_err());
    }
}
