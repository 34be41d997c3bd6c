//! Neutron API abstraction.
//!
//! Scenario code only talks to [`NeutronClient`]. Production uses
//! [`HttpNeutronClient`](crate::http::HttpNeutronClient); tests use
//! `MockNeutronClient`, which records every call it receives.
//!
//! ```text
//!   NeutronScenario
//!         │
//!         ▼
//!   ┌─────────────┐
//!   │NeutronClient│ (trait)
//!   └─────────────┘
//!      │       │
//!      ▼       ▼
//!   ┌────┐  ┌────┐
//!   │Http│  │Mock│
//!   └─┬──┘  └────┘
//!     │
//!     ▼
//!   Neutron v2.0 API
//! ```
//!
//! # Resource ID validation
//!
//! Ids interpolated into request paths are checked first:
//! - 1-64 characters
//! - ASCII alphanumerics, `-` and `_` only

use std::future::Future;

use crate::error::NeutronError;
use crate::types::{
    BgpVpn, CreateBgpVpn, Extension, Network, NetworkAssociation, NetworkSpec, Router,
    RouterAssociation, RouterSpec, UpdateBgpVpn,
};

/// Maximum accepted length of a resource id.
pub const MAX_RESOURCE_ID_LEN: usize = 64;

/// Checks an id before it is placed in a request path.
pub fn validate_resource_id(id: &str) -> Result<(), NeutronError> {
    if id.is_empty() || id.len() > MAX_RESOURCE_ID_LEN {
        return Err(NeutronError::InvalidRequest(format!(
            "invalid resource id: length {} (must be 1-{MAX_RESOURCE_ID_LEN})",
            id.len()
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(NeutronError::InvalidRequest(format!(
            "invalid resource id '{id}': contains characters outside [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}

/// Neutron operations used by the BGP-VPN scenarios.
///
/// `Send + Sync + 'static` so one client can be shared by every iteration.
///
/// # Error handling
///
/// - 404 responses become [`NeutronError::NotFound`]
/// - other non-success responses become [`NeutronError::Api`]
/// - malformed ids become [`NeutronError::InvalidRequest`] and no request is sent
pub trait NeutronClient: Send + Sync + 'static {
    fn create_bgpvpn(
        &self,
        request: &CreateBgpVpn,
    ) -> impl Future<Output = Result<BgpVpn, NeutronError>> + Send;

    fn delete_bgpvpn(
        &self,
        bgpvpn_id: &str,
    ) -> impl Future<Output = Result<(), NeutronError>> + Send;

    fn list_bgpvpns(&self) -> impl Future<Output = Result<Vec<BgpVpn>, NeutronError>> + Send;

    fn update_bgpvpn(
        &self,
        bgpvpn_id: &str,
        request: &UpdateBgpVpn,
    ) -> impl Future<Output = Result<BgpVpn, NeutronError>> + Send;

    /// Lists networks, restricted to `tenant_id` when given.
    fn list_networks(
        &self,
        tenant_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Network>, NeutronError>> + Send;

    fn create_network(
        &self,
        spec: &NetworkSpec,
    ) -> impl Future<Output = Result<Network, NeutronError>> + Send;

    fn list_routers(&self) -> impl Future<Output = Result<Vec<Router>, NeutronError>> + Send;

    fn create_router(
        &self,
        spec: &RouterSpec,
    ) -> impl Future<Output = Result<Router, NeutronError>> + Send;

    fn create_network_association(
        &self,
        bgpvpn_id: &str,
        network_id: &str,
    ) -> impl Future<Output = Result<NetworkAssociation, NeutronError>> + Send;

    fn delete_network_association(
        &self,
        bgpvpn_id: &str,
        association_id: &str,
    ) -> impl Future<Output = Result<(), NeutronError>> + Send;

    fn create_router_association(
        &self,
        bgpvpn_id: &str,
        router_id: &str,
    ) -> impl Future<Output = Result<RouterAssociation, NeutronError>> + Send;

    fn delete_router_association(
        &self,
        bgpvpn_id: &str,
        association_id: &str,
    ) -> impl Future<Output = Result<(), NeutronError>> + Send;

    /// Extensions advertised by the server, used for extension validation.
    fn list_extensions(&self)
    -> impl Future<Output = Result<Vec<Extension>, NeutronError>> + Send;
}

/// A call received by `MockNeutronClient`.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    CreateBgpVpn(CreateBgpVpn),
    DeleteBgpVpn(String),
    ListBgpVpns,
    UpdateBgpVpn(String, UpdateBgpVpn),
    ListNetworks(Option<String>),
    CreateNetwork(NetworkSpec),
    ListRouters,
    CreateRouter(RouterSpec),
    CreateNetworkAssociation { bgpvpn_id: String, network_id: String },
    DeleteNetworkAssociation { bgpvpn_id: String, association_id: String },
    CreateRouterAssociation { bgpvpn_id: String, router_id: String },
    DeleteRouterAssociation { bgpvpn_id: String, association_id: String },
    ListExtensions,
}

/// In-memory Neutron for unit tests.
///
/// Created BGP-VPNs are stored and listed back unless `hide_created` is set.
#[cfg(test)]
#[derive(Default)]
pub struct MockNeutronClient {
    pub tenant_id: String,
    pub networks: Vec<Network>,
    pub routers: Vec<Router>,
    pub extensions: Vec<Extension>,
    /// list_bgpvpns omits created records
    pub hide_created: bool,
    /// every mutating call fails with a 500
    pub fail_actions: bool,
    calls: std::sync::Mutex<Vec<MockCall>>,
    bgpvpns: std::sync::Mutex<Vec<BgpVpn>>,
    next_id: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockNeutronClient {
    pub fn new(tenant_id: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_owned(),
            ..Self::default()
        }
    }

    pub fn with_networks(mut self, networks: Vec<Network>) -> Self {
        self.networks = networks;
        self
    }

    pub fn with_routers(mut self, routers: Vec<Router>) -> Self {
        self.routers = routers;
        self
    }

    pub fn with_extensions(mut self, aliases: &[&str]) -> Self {
        self.extensions = aliases
            .iter()
            .map(|alias| Extension {
                alias: (*alias).to_owned(),
                name: alias.to_uppercase(),
            })
            .collect();
        self
    }

    pub fn with_hidden_created(mut self) -> Self {
        self.hide_created = true;
        self
    }

    pub fn with_failing_actions(mut self) -> Self {
        self.fail_actions = true;
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("{prefix}-{n}")
    }

    fn check_failure(&self) -> Result<(), NeutronError> {
        if self.fail_actions {
            return Err(NeutronError::Api {
                status: 500,
                message: "mock failure".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
impl NeutronClient for MockNeutronClient {
    async fn create_bgpvpn(&self, request: &CreateBgpVpn) -> Result<BgpVpn, NeutronError> {
        self.record(MockCall::CreateBgpVpn(request.clone()));
        self.check_failure()?;
        let bgpvpn = BgpVpn {
            id: self.next_id("bgpvpn"),
            name: request.name.clone(),
            vpn_type: request.vpn_type,
            route_targets: request.route_targets.clone().unwrap_or_default(),
            import_targets: request.import_targets.clone().unwrap_or_default(),
            export_targets: request.export_targets.clone().unwrap_or_default(),
            route_distinguishers: request.route_distinguishers.clone().unwrap_or_default(),
            tenant_id: request
                .tenant_id
                .clone()
                .unwrap_or_else(|| self.tenant_id.clone()),
            networks: Vec::new(),
            routers: Vec::new(),
        };
        self.bgpvpns.lock().unwrap().push(bgpvpn.clone());
        Ok(bgpvpn)
    }

    async fn delete_bgpvpn(&self, bgpvpn_id: &str) -> Result<(), NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        self.record(MockCall::DeleteBgpVpn(bgpvpn_id.to_owned()));
        self.check_failure()?;
        let mut bgpvpns = self.bgpvpns.lock().unwrap();
        let before = bgpvpns.len();
        bgpvpns.retain(|b| b.id != bgpvpn_id);
        if bgpvpns.len() == before {
            return Err(NeutronError::NotFound {
                resource: "bgpvpn".to_owned(),
                id: bgpvpn_id.to_owned(),
            });
        }
        Ok(())
    }

    async fn list_bgpvpns(&self) -> Result<Vec<BgpVpn>, NeutronError> {
        self.record(MockCall::ListBgpVpns);
        if self.hide_created {
            return Ok(Vec::new());
        }
        Ok(self.bgpvpns.lock().unwrap().clone())
    }

    async fn update_bgpvpn(
        &self,
        bgpvpn_id: &str,
        request: &UpdateBgpVpn,
    ) -> Result<BgpVpn, NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        self.record(MockCall::UpdateBgpVpn(
            bgpvpn_id.to_owned(),
            request.clone(),
        ));
        self.check_failure()?;
        let mut bgpvpns = self.bgpvpns.lock().unwrap();
        let bgpvpn = bgpvpns
            .iter_mut()
            .find(|b| b.id == bgpvpn_id)
            .ok_or_else(|| NeutronError::NotFound {
                resource: "bgpvpn".to_owned(),
                id: bgpvpn_id.to_owned(),
            })?;
        if let Some(name) = &request.name {
            bgpvpn.name = name.clone();
        }
        if let Some(targets) = &request.route_targets {
            bgpvpn.route_targets = targets.clone();
        }
        if let Some(targets) = &request.import_targets {
            bgpvpn.import_targets = targets.clone();
        }
        if let Some(targets) = &request.export_targets {
            bgpvpn.export_targets = targets.clone();
        }
        if let Some(rds) = &request.route_distinguishers {
            bgpvpn.route_distinguishers = rds.clone();
        }
        Ok(bgpvpn.clone())
    }

    async fn list_networks(&self, tenant_id: Option<&str>) -> Result<Vec<Network>, NeutronError> {
        self.record(MockCall::ListNetworks(tenant_id.map(str::to_owned)));
        Ok(self
            .networks
            .iter()
            .filter(|n| tenant_id.is_none_or(|t| n.tenant_id == t))
            .cloned()
            .collect())
    }

    async fn create_network(&self, spec: &NetworkSpec) -> Result<Network, NeutronError> {
        self.record(MockCall::CreateNetwork(spec.clone()));
        self.check_failure()?;
        Ok(Network {
            id: self.next_id("net"),
            name: spec.name.clone().unwrap_or_default(),
            tenant_id: self.tenant_id.clone(),
        })
    }

    async fn list_routers(&self) -> Result<Vec<Router>, NeutronError> {
        self.record(MockCall::ListRouters);
        Ok(self.routers.clone())
    }

    async fn create_router(&self, spec: &RouterSpec) -> Result<Router, NeutronError> {
        self.record(MockCall::CreateRouter(spec.clone()));
        self.check_failure()?;
        Ok(Router {
            id: self.next_id("router"),
            name: spec.name.clone().unwrap_or_default(),
            tenant_id: self.tenant_id.clone(),
        })
    }

    async fn create_network_association(
        &self,
        bgpvpn_id: &str,
        network_id: &str,
    ) -> Result<NetworkAssociation, NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        validate_resource_id(network_id)?;
        self.record(MockCall::CreateNetworkAssociation {
            bgpvpn_id: bgpvpn_id.to_owned(),
            network_id: network_id.to_owned(),
        });
        self.check_failure()?;
        Ok(NetworkAssociation {
            id: self.next_id("netassoc"),
            network_id: network_id.to_owned(),
            tenant_id: self.tenant_id.clone(),
        })
    }

    async fn delete_network_association(
        &self,
        bgpvpn_id: &str,
        association_id: &str,
    ) -> Result<(), NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        validate_resource_id(association_id)?;
        self.record(MockCall::DeleteNetworkAssociation {
            bgpvpn_id: bgpvpn_id.to_owned(),
            association_id: association_id.to_owned(),
        });
        self.check_failure()
    }

    async fn create_router_association(
        &self,
        bgpvpn_id: &str,
        router_id: &str,
    ) -> Result<RouterAssociation, NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        validate_resource_id(router_id)?;
        self.record(MockCall::CreateRouterAssociation {
            bgpvpn_id: bgpvpn_id.to_owned(),
            router_id: router_id.to_owned(),
        });
        self.check_failure()?;
        Ok(RouterAssociation {
            id: self.next_id("routerassoc"),
            router_id: router_id.to_owned(),
            tenant_id: self.tenant_id.clone(),
        })
    }

    async fn delete_router_association(
        &self,
        bgpvpn_id: &str,
        association_id: &str,
    ) -> Result<(), NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        validate_resource_id(association_id)?;
        self.record(MockCall::DeleteRouterAssociation {
            bgpvpn_id: bgpvpn_id.to_owned(),
            association_id: association_id.to_owned(),
        });
        self.check_failure()
    }

    async fn list_extensions(&self) -> Result<Vec<Extension>, NeutronError> {
        self.record(MockCall::ListExtensions);
        Ok(self.extensions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BgpVpnType;

    #[test]
    fn resource_id_accepts_uuids_and_hex() {
        assert!(validate_resource_id("4e8e5957-649f-477b-9e5b-f1f75b21c03c").is_ok());
        assert!(validate_resource_id("b7549121395844bea941bb92feb3fad9").is_ok());
        assert!(validate_resource_id("net_1").is_ok());
    }

    #[test]
    fn resource_id_rejects_empty_long_and_path_chars() {
        assert!(validate_resource_id("").is_err());
        assert!(validate_resource_id(&"a".repeat(65)).is_err());
        assert!(validate_resource_id(&"a".repeat(64)).is_ok());
        assert!(validate_resource_id("../routers").is_err());
        assert!(validate_resource_id("id?x=1").is_err());
        assert!(validate_resource_id("id with space").is_err());
    }

    #[tokio::test]
    async fn mock_client_lists_created_bgpvpns() {
        let client = MockNeutronClient::new("tenant-a");
        let created = client
            .create_bgpvpn(&CreateBgpVpn {
                name: "vpn".to_owned(),
                vpn_type: BgpVpnType::L2,
                ..CreateBgpVpn::default()
            })
            .await
            .unwrap();
        assert_eq!(created.tenant_id, "tenant-a");

        let listed = client.list_bgpvpns().await.unwrap();
        assert_eq!(listed, vec![created.clone()]);

        client.delete_bgpvpn(&created.id).await.unwrap();
        assert!(client.list_bgpvpns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mock_client_delete_unknown_is_not_found() {
        let client = MockNeutronClient::new("tenant-a");
        let err = client.delete_bgpvpn("missing").await.unwrap_err();
        assert!(matches!(err, NeutronError::NotFound { .. }));
    }

    #[tokio::test]
    async fn mock_client_rejects_bad_ids_before_recording() {
        let client = MockNeutronClient::new("tenant-a");
        let err = client
            .create_network_association("bad/id", "net-1")
            .await
            .unwrap_err();
        assert!(matches!(err, NeutronError::InvalidRequest(_)));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn mock_client_filters_networks_by_tenant() {
        let client = MockNeutronClient::new("tenant-a").with_networks(vec![
            Network {
                id: "n1".to_owned(),
                name: "a".to_owned(),
                tenant_id: "tenant-a".to_owned(),
            },
            Network {
                id: "n2".to_owned(),
                name: "b".to_owned(),
                tenant_id: "tenant-b".to_owned(),
            },
        ]);
        let nets = client.list_networks(Some("tenant-b")).await.unwrap();
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].id, "n2");
        assert_eq!(client.list_networks(None).await.unwrap().len(), 2);
    }

    #[test]
    fn neutron_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<MockNeutronClient>();
        assert_send_sync::<crate::http::HttpNeutronClient>();
    }
}
