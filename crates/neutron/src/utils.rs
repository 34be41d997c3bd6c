//! Timed Neutron helpers shared by the BGP-VPN scenarios.
//!
//! Each helper wraps exactly one client call in an atomic action. BGP-VPN
//! lifecycle calls go through the admin client; network, router and
//! association calls go through the iteration's user.

use tracing::debug;

use neutron_bench_core::atomic::AtomicActions;
use neutron_bench_core::error::BenchError;
use neutron_bench_core::scenario::ScenarioContext;

use crate::client::NeutronClient;
use crate::env::{NeutronEnv, UserClient};
use crate::types::{
    BgpVpn, BgpVpnType, CreateBgpVpn, Network, NetworkAssociation, NetworkSpec, Router,
    RouterAssociation, RouterSpec, UpdateBgpVpn,
};

// --- atomic action names ---

pub const ACTION_CREATE_BGPVPN: &str = "neutron.create_bgpvpn";
pub const ACTION_DELETE_BGPVPN: &str = "neutron.delete_bgpvpn";
pub const ACTION_LIST_BGPVPNS: &str = "neutron.list_bgpvpns";
pub const ACTION_UPDATE_BGPVPN: &str = "neutron.update_bgpvpn";
pub const ACTION_LIST_NETWORKS: &str = "neutron.list_networks";
pub const ACTION_CREATE_NETWORK: &str = "neutron.create_network";
pub const ACTION_LIST_ROUTERS: &str = "neutron.list_routers";
pub const ACTION_CREATE_ROUTER: &str = "neutron.create_router";
pub const ACTION_CREATE_NETWORK_ASSOC: &str = "neutron.create_bgpvpn_network_assoc";
pub const ACTION_DELETE_NETWORK_ASSOC: &str = "neutron.delete_bgpvpn_network_assoc";
pub const ACTION_CREATE_ROUTER_ASSOC: &str = "neutron.create_bgpvpn_router_assoc";
pub const ACTION_DELETE_ROUTER_ASSOC: &str = "neutron.delete_bgpvpn_router_assoc";

/// Prefix of every generated resource name.
pub const RANDOM_NAME_PREFIX: &str = "s_bench_";

/// Route target and distinguisher lists; `None` leaves the field unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BgpVpnTargets {
    pub route_targets: Option<Vec<String>>,
    pub import_targets: Option<Vec<String>>,
    pub export_targets: Option<Vec<String>>,
    pub route_distinguishers: Option<Vec<String>>,
}

/// Random name `s_bench_<task>_<8 hex>` for `task_prefix`.
pub fn random_name(task_prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{RANDOM_NAME_PREFIX}{task_prefix}_{}", &suffix[..8])
}

/// Per-iteration view over the environment with timed helpers.
pub struct NeutronScenario<'a, C: NeutronClient> {
    env: &'a NeutronEnv<C>,
    ctx: &'a ScenarioContext,
    actions: &'a AtomicActions,
}

impl<'a, C: NeutronClient> NeutronScenario<'a, C> {
    pub fn new(env: &'a NeutronEnv<C>, ctx: &'a ScenarioContext, actions: &'a AtomicActions) -> Self {
        Self { env, ctx, actions }
    }

    pub fn generate_random_name(&self) -> String {
        random_name(self.ctx.task_prefix())
    }

    /// User assigned to this iteration.
    pub fn user(&self) -> Result<&'a UserClient<C>, BenchError> {
        Ok(self.env.user(self.ctx.user_index, self.ctx.iteration)?)
    }

    fn admin(&self) -> Result<&'a C, BenchError> {
        Ok(self.env.admin()?)
    }

    /// Creates a BGP-VPN with a fresh random name.
    pub async fn create_bgpvpn(
        &self,
        targets: &BgpVpnTargets,
        vpn_type: BgpVpnType,
        tenant_id: Option<&str>,
    ) -> Result<BgpVpn, BenchError> {
        let request = CreateBgpVpn {
            name: self.generate_random_name(),
            vpn_type,
            route_targets: targets.route_targets.clone(),
            import_targets: targets.import_targets.clone(),
            export_targets: targets.export_targets.clone(),
            route_distinguishers: targets.route_distinguishers.clone(),
            tenant_id: tenant_id.map(str::to_owned),
        };
        debug!(name = %request.name, vpn_type = %vpn_type, tenant_id = ?tenant_id, "creating bgpvpn");
        let admin = self.admin()?;
        Ok(self
            .actions
            .timed(ACTION_CREATE_BGPVPN, admin.create_bgpvpn(&request))
            .await?)
    }

    pub async fn delete_bgpvpn(&self, bgpvpn: &BgpVpn) -> Result<(), BenchError> {
        let admin = self.admin()?;
        Ok(self
            .actions
            .timed(ACTION_DELETE_BGPVPN, admin.delete_bgpvpn(&bgpvpn.id))
            .await?)
    }

    pub async fn list_bgpvpns(&self) -> Result<Vec<BgpVpn>, BenchError> {
        let admin = self.admin()?;
        Ok(self
            .actions
            .timed(ACTION_LIST_BGPVPNS, admin.list_bgpvpns())
            .await?)
    }

    /// Updates `bgpvpn`. A new random name is set only when `update_name`.
    pub async fn update_bgpvpn(
        &self,
        bgpvpn: &BgpVpn,
        update_name: bool,
        targets: &BgpVpnTargets,
    ) -> Result<BgpVpn, BenchError> {
        let request = UpdateBgpVpn {
            name: update_name.then(|| self.generate_random_name()),
            route_targets: targets.route_targets.clone(),
            import_targets: targets.import_targets.clone(),
            export_targets: targets.export_targets.clone(),
            route_distinguishers: targets.route_distinguishers.clone(),
        };
        let admin = self.admin()?;
        Ok(self
            .actions
            .timed(ACTION_UPDATE_BGPVPN, admin.update_bgpvpn(&bgpvpn.id, &request))
            .await?)
    }

    pub async fn list_networks(&self, tenant_id: Option<&str>) -> Result<Vec<Network>, BenchError> {
        let user = self.user()?;
        Ok(self
            .actions
            .timed(ACTION_LIST_NETWORKS, user.client.list_networks(tenant_id))
            .await?)
    }

    /// Creates a network, naming it randomly when `spec` has no name.
    pub async fn create_network(&self, spec: &NetworkSpec) -> Result<Network, BenchError> {
        let spec = NetworkSpec {
            name: Some(
                spec.name
                    .clone()
                    .unwrap_or_else(|| self.generate_random_name()),
            ),
            ..spec.clone()
        };
        let user = self.user()?;
        Ok(self
            .actions
            .timed(ACTION_CREATE_NETWORK, user.client.create_network(&spec))
            .await?)
    }

    pub async fn list_routers(&self) -> Result<Vec<Router>, BenchError> {
        let user = self.user()?;
        Ok(self
            .actions
            .timed(ACTION_LIST_ROUTERS, user.client.list_routers())
            .await?)
    }

    /// Creates a router, naming it randomly when `spec` has no name.
    pub async fn create_router(&self, spec: &RouterSpec) -> Result<Router, BenchError> {
        let spec = RouterSpec {
            name: Some(
                spec.name
                    .clone()
                    .unwrap_or_else(|| self.generate_random_name()),
            ),
            ..spec.clone()
        };
        let user = self.user()?;
        Ok(self
            .actions
            .timed(ACTION_CREATE_ROUTER, user.client.create_router(&spec))
            .await?)
    }

    pub async fn create_bgpvpn_network_assoc(
        &self,
        bgpvpn: &BgpVpn,
        network: &Network,
    ) -> Result<NetworkAssociation, BenchError> {
        let user = self.user()?;
        Ok(self
            .actions
            .timed(
                ACTION_CREATE_NETWORK_ASSOC,
                user.client.create_network_association(&bgpvpn.id, &network.id),
            )
            .await?)
    }

    pub async fn delete_bgpvpn_network_assoc(
        &self,
        bgpvpn: &BgpVpn,
        association: &NetworkAssociation,
    ) -> Result<(), BenchError> {
        let user = self.user()?;
        Ok(self
            .actions
            .timed(
                ACTION_DELETE_NETWORK_ASSOC,
                user.client.delete_network_association(&bgpvpn.id, &association.id),
            )
            .await?)
    }

    pub async fn create_bgpvpn_router_assoc(
        &self,
        bgpvpn: &BgpVpn,
        router: &Router,
    ) -> Result<RouterAssociation, BenchError> {
        let user = self.user()?;
        Ok(self
            .actions
            .timed(
                ACTION_CREATE_ROUTER_ASSOC,
                user.client.create_router_association(&bgpvpn.id, &router.id),
            )
            .await?)
    }

    pub async fn delete_bgpvpn_router_assoc(
        &self,
        bgpvpn: &BgpVpn,
        association: &RouterAssociation,
    ) -> Result<(), BenchError> {
        let user = self.user()?;
        Ok(self
            .actions
            .timed(
                ACTION_DELETE_ROUTER_ASSOC,
                user.client.delete_router_association(&bgpvpn.id, &association.id),
            )
            .await?)
    }
}
