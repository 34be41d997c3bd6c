//! Neutron resource records and request bodies.
//!
//! Records mirror the JSON Neutron returns; unknown fields are ignored and
//! missing optional fields default. Request bodies omit `None` fields so the
//! API applies its own defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

/// VPN flavour and the technology behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BgpVpnType {
    L2,
    #[default]
    L3,
}

impl BgpVpnType {
    /// Accepted values, as declared by the `bgpvpn_type` enum validator.
    pub const VALUES: [&'static str; 2] = ["l2", "l3"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L2 => "l2",
            Self::L3 => "l3",
        }
    }
}

impl fmt::Display for BgpVpnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A BGP-VPN as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpVpn {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub vpn_type: BgpVpnType,
    #[serde(default)]
    pub route_targets: Vec<String>,
    #[serde(default)]
    pub import_targets: Vec<String>,
    #[serde(default)]
    pub export_targets: Vec<String>,
    #[serde(default)]
    pub route_distinguishers: Vec<String>,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub networks: Vec<String>,
    #[serde(default)]
    pub routers: Vec<String>,
}

/// Body of a BGP-VPN create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBgpVpn {
    pub name: String,
    #[serde(rename = "type")]
    pub vpn_type: BgpVpnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_targets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_targets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_targets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_distinguishers: Option<Vec<String>>,
    /// Owning tenant; admin-only, defaults to the caller's project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Body of a BGP-VPN update request. Only `Some` fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBgpVpn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_targets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_targets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_targets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_distinguishers: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tenant_id: String,
}

/// Body of a network create request; an empty spec is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tenant_id: String,
}

/// Body of a router create request; an empty spec is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
}

/// Link between a BGP-VPN and a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAssociation {
    pub id: String,
    pub network_id: String,
    #[serde(default)]
    pub tenant_id: String,
}

/// Link between a BGP-VPN and a router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterAssociation {
    pub id: String,
    pub router_id: String,
    #[serde(default)]
    pub tenant_id: String,
}

/// An API extension advertised by Neutron.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub alias: String,
    #[serde(default)]
    pub name: String,
}
