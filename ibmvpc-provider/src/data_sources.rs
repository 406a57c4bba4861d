//! Read-only listings: bare metal server network attachments and routing table routes

use std::collections::HashMap;

use ibmvpc_client::models::{
    BareMetalServerNetworkAttachment, NetworkAttachmentByPci, NetworkAttachmentByVlan,
    NetworkAttachmentCommon, Route, RouteNextHop,
};
use ibmvpc_client::{Pager, VpcApi};
use ibmvpc_core::provider::ProviderResult;
use ibmvpc_core::resource::{Resource, State, Value};

use crate::utils::{insert_opt, insert_str, remote_error, required_string};

fn common_to_map(common: &NetworkAttachmentCommon, interface_type: &str) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    insert_str(&mut map, "id", &common.id);
    insert_str(&mut map, "name", &common.name);
    insert_str(&mut map, "href", &common.href);
    insert_str(&mut map, "created_at", &common.created_at);
    insert_str(&mut map, "interface_type", interface_type);
    insert_str(&mut map, "lifecycle_state", &common.lifecycle_state);
    map.insert("port_speed".to_string(), Value::Int(common.port_speed));
    insert_str(&mut map, "type", &common.attachment_type);
    insert_str(&mut map, "resource_type", &common.resource_type);

    let ip = &common.primary_ip;
    let mut primary_ip = HashMap::new();
    insert_str(&mut primary_ip, "id", &ip.id);
    insert_str(&mut primary_ip, "address", &ip.address);
    insert_opt(&mut primary_ip, "href", ip.href.as_deref());
    insert_opt(&mut primary_ip, "name", ip.name.as_deref());
    insert_opt(&mut primary_ip, "resource_type", ip.resource_type.as_deref());
    map.insert("primary_ip".to_string(), Value::Map(primary_ip));

    let subnet = &common.subnet;
    let mut subnet_map = HashMap::new();
    insert_str(&mut subnet_map, "id", &subnet.id);
    insert_opt(&mut subnet_map, "crn", subnet.crn.as_deref());
    insert_opt(&mut subnet_map, "href", subnet.href.as_deref());
    insert_opt(&mut subnet_map, "name", subnet.name.as_deref());
    insert_opt(&mut subnet_map, "resource_type", subnet.resource_type.as_deref());
    map.insert("subnet".to_string(), Value::Map(subnet_map));

    let vni = &common.virtual_network_interface;
    let mut vni_map = HashMap::new();
    insert_str(&mut vni_map, "id", &vni.id);
    insert_str(&mut vni_map, "crn", &vni.crn);
    insert_opt(&mut vni_map, "href", vni.href.as_deref());
    insert_str(&mut vni_map, "name", &vni.name);
    insert_opt(&mut vni_map, "resource_type", vni.resource_type.as_deref());
    map.insert("virtual_network_interface".to_string(), Value::Map(vni_map));

    map
}

pub fn pci_attachment_to_map(attachment: &NetworkAttachmentByPci) -> HashMap<String, Value> {
    let mut map = common_to_map(&attachment.common, "pci");
    map.insert(
        "allowed_vlans".to_string(),
        Value::List(attachment.allowed_vlans.iter().map(|v| Value::Int(*v)).collect()),
    );
    map
}

pub fn vlan_attachment_to_map(attachment: &NetworkAttachmentByVlan) -> HashMap<String, Value> {
    let mut map = common_to_map(&attachment.common, "vlan");
    map.insert("vlan".to_string(), Value::Int(attachment.vlan));
    map.insert(
        "allow_to_float".to_string(),
        Value::Bool(attachment.allow_to_float),
    );
    map
}

pub fn network_attachment_to_map(
    attachment: &BareMetalServerNetworkAttachment,
) -> HashMap<String, Value> {
    match attachment {
        BareMetalServerNetworkAttachment::Pci(pci) => pci_attachment_to_map(pci),
        BareMetalServerNetworkAttachment::Vlan(vlan) => vlan_attachment_to_map(vlan),
    }
}

pub fn next_hop_to_map(next_hop: &RouteNextHop) -> Value {
    let mut map = HashMap::new();
    match next_hop {
        RouteNextHop::Ip(ip) => insert_str(&mut map, "address", &ip.address),
        RouteNextHop::VpnGatewayConnection(conn) => {
            insert_str(&mut map, "id", &conn.id);
            insert_str(&mut map, "name", &conn.name);
            insert_str(&mut map, "href", &conn.href);
            insert_str(&mut map, "resource_type", &conn.resource_type);
        }
    }
    Value::Map(map)
}

pub fn route_to_map(route: &Route) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    insert_str(&mut map, "id", &route.id);
    insert_str(&mut map, "name", &route.name);
    insert_str(&mut map, "href", &route.href);
    insert_str(&mut map, "action", &route.action);
    map.insert("advertise".to_string(), Value::Bool(route.advertise));
    insert_str(&mut map, "created_at", &route.created_at);
    insert_str(&mut map, "destination", &route.destination);
    insert_str(&mut map, "lifecycle_state", &route.lifecycle_state);
    map.insert("next_hop".to_string(), next_hop_to_map(&route.next_hop));
    insert_opt(&mut map, "origin", route.origin.as_deref());
    map.insert("priority".to_string(), Value::Int(route.priority));
    insert_str(&mut map, "zone", &route.zone.name);
    map
}

/// `is_bare_metal_server_network_attachments`
pub async fn read_network_attachments(
    api: &dyn VpcApi,
    resource: &Resource,
) -> ProviderResult<State> {
    let id = &resource.id;
    let server_id = required_string(&resource.attributes, "bare_metal_server_id")
        .map_err(|e| e.for_resource(id.clone()))?;

    let attachments = Pager::new(|start: Option<String>| {
        api.list_bare_metal_server_network_attachments(&server_id, start)
    })
    .collect_all()
    .await
    .map_err(|e| {
        remote_error("Failed to list bare metal server network attachments", e)
            .for_resource(id.clone())
    })?;

    let mut attrs = HashMap::new();
    insert_str(&mut attrs, "bare_metal_server_id", &server_id);
    attrs.insert(
        "network_attachments".to_string(),
        Value::List(
            attachments
                .iter()
                .map(|a| Value::Map(network_attachment_to_map(a)))
                .collect(),
        ),
    );
    Ok(State::existing(id.clone(), attrs).with_identifier(server_id))
}

/// `is_vpc_routing_table_routes`
pub async fn read_routing_table_routes(
    api: &dyn VpcApi,
    resource: &Resource,
) -> ProviderResult<State> {
    let id = &resource.id;
    let vpc_id =
        required_string(&resource.attributes, "vpc_id").map_err(|e| e.for_resource(id.clone()))?;
    let table_id = required_string(&resource.attributes, "routing_table_id")
        .map_err(|e| e.for_resource(id.clone()))?;

    let routes = Pager::new(|start: Option<String>| {
        api.list_vpc_routing_table_routes(&vpc_id, &table_id, start)
    })
    .collect_all()
    .await
    .map_err(|e| remote_error("Failed to list routing table routes", e).for_resource(id.clone()))?;

    let mut attrs = HashMap::new();
    insert_str(&mut attrs, "vpc_id", &vpc_id);
    insert_str(&mut attrs, "routing_table_id", &table_id);
    attrs.insert(
        "routes".to_string(),
        Value::List(routes.iter().map(|r| Value::Map(route_to_map(r))).collect()),
    );
    Ok(State::existing(id.clone(), attrs).with_identifier(format!("{}/{}", vpc_id, table_id)))
}
