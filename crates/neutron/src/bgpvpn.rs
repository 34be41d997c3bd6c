//! BGP-VPN benchmark scenarios.
//!
//! | scenario | sequence |
//! |---|---|
//! | `create_and_delete_bgpvpns` | create, delete |
//! | `create_and_list_bgpvpns` | create, list, check membership |
//! | `create_and_update_bgpvpns` | create, update |
//! | `create_bgpvpn_assoc_disassoc_networks` | find or create network, create, associate, disassociate |
//! | `create_bgpvpn_assoc_disassoc_routers` | find or create router, create, associate, disassociate |
//!
//! All five are generic over the [`NeutronClient`] so they run unchanged
//! against the HTTP client and test doubles.

use serde::Deserialize;
use tracing::debug;

use neutron_bench_core::atomic::AtomicActions;
use neutron_bench_core::error::{BenchError, ScenarioError};
use neutron_bench_core::scenario::{
    ContextSpec, Scenario, ScenarioArgs, ScenarioContext, ScenarioInfo, ScenarioRegistry,
    decode_args,
};
use neutron_bench_core::validation::{PLATFORM_OPENSTACK, Service, Validator};

use crate::client::NeutronClient;
use crate::env::NeutronEnv;
use crate::types::{BgpVpnType, NetworkSpec, RouterSpec};
use crate::utils::{BgpVpnTargets, NeutronScenario};

pub const CREATE_AND_DELETE_BGPVPNS: &str = "NeutronBGPVPN.create_and_delete_bgpvpns";
pub const CREATE_AND_LIST_BGPVPNS: &str = "NeutronBGPVPN.create_and_list_bgpvpns";
pub const CREATE_AND_UPDATE_BGPVPNS: &str = "NeutronBGPVPN.create_and_update_bgpvpns";
pub const ASSOC_DISASSOC_NETWORKS: &str = "NeutronBGPVPN.create_bgpvpn_assoc_disassoc_networks";
pub const ASSOC_DISASSOC_ROUTERS: &str = "NeutronBGPVPN.create_bgpvpn_assoc_disassoc_routers";

/// Neutron extension alias every scenario requires.
pub const BGPVPN_EXTENSION: &str = "bgpvpn";

/// Service name used by the cleanup contexts.
const NEUTRON_CLEANUP: &str = "neutron";

// --- arguments ---

/// Arguments shared by every scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BgpVpnArgs {
    #[serde(default)]
    pub route_targets: Option<Vec<String>>,
    #[serde(default)]
    pub import_targets: Option<Vec<String>>,
    #[serde(default)]
    pub export_targets: Option<Vec<String>>,
    #[serde(default)]
    pub route_distinguishers: Option<Vec<String>>,
    #[serde(default)]
    pub bgpvpn_type: BgpVpnType,
}

impl BgpVpnArgs {
    pub fn targets(&self) -> BgpVpnTargets {
        BgpVpnTargets {
            route_targets: self.route_targets.clone(),
            import_targets: self.import_targets.clone(),
            export_targets: self.export_targets.clone(),
            route_distinguishers: self.route_distinguishers.clone(),
        }
    }
}

/// Arguments of `create_and_update_bgpvpns`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBgpVpnArgs {
    #[serde(default)]
    pub update_name: bool,
    #[serde(default)]
    pub route_targets: Option<Vec<String>>,
    #[serde(default)]
    pub import_targets: Option<Vec<String>>,
    #[serde(default)]
    pub export_targets: Option<Vec<String>>,
    #[serde(default)]
    pub route_distinguishers: Option<Vec<String>>,
    #[serde(default)]
    pub updated_route_targets: Option<Vec<String>>,
    #[serde(default)]
    pub updated_import_targets: Option<Vec<String>>,
    #[serde(default)]
    pub updated_export_targets: Option<Vec<String>>,
    #[serde(default)]
    pub updated_route_distinguishers: Option<Vec<String>>,
    #[serde(default)]
    pub bgpvpn_type: BgpVpnType,
}

impl UpdateBgpVpnArgs {
    pub fn targets(&self) -> BgpVpnTargets {
        BgpVpnTargets {
            route_targets: self.route_targets.clone(),
            import_targets: self.import_targets.clone(),
            export_targets: self.export_targets.clone(),
            route_distinguishers: self.route_distinguishers.clone(),
        }
    }

    pub fn updated_targets(&self) -> BgpVpnTargets {
        BgpVpnTargets {
            route_targets: self.updated_route_targets.clone(),
            import_targets: self.updated_import_targets.clone(),
            export_targets: self.updated_export_targets.clone(),
            route_distinguishers: self.updated_route_distinguishers.clone(),
        }
    }
}

// --- metadata ---

fn validators(users: bool) -> Vec<Validator> {
    vec![
        Validator::Enum {
            param: "bgpvpn_type".to_owned(),
            values: BgpVpnType::VALUES.iter().map(|v| (*v).to_owned()).collect(),
            missed: true,
        },
        Validator::RequiredNeutronExtensions {
            extensions: vec![BGPVPN_EXTENSION.to_owned()],
        },
        Validator::RequiredServices {
            services: vec![Service::Neutron],
        },
        Validator::RequiredPlatform {
            platform: PLATFORM_OPENSTACK.to_owned(),
            admin: true,
            users,
        },
    ]
}

fn admin_info(name: &str, description: &str) -> ScenarioInfo {
    ScenarioInfo {
        name: name.to_owned(),
        description: description.to_owned(),
        validators: validators(false),
        context: ContextSpec {
            admin_cleanup: vec![NEUTRON_CLEANUP.to_owned()],
            cleanup: Vec::new(),
        },
    }
}

fn user_info(name: &str, description: &str) -> ScenarioInfo {
    ScenarioInfo {
        name: name.to_owned(),
        description: description.to_owned(),
        validators: validators(true),
        context: ContextSpec {
            admin_cleanup: vec![NEUTRON_CLEANUP.to_owned()],
            cleanup: vec![NEUTRON_CLEANUP.to_owned()],
        },
    }
}

// --- scenarios ---

/// Create a BGP-VPN, then delete it.
pub struct CreateAndDeleteBgpvpns {
    info: ScenarioInfo,
}

impl CreateAndDeleteBgpvpns {
    pub fn new() -> Self {
        Self {
            info: admin_info(
                CREATE_AND_DELETE_BGPVPNS,
                "Create a BGP-VPN and delete it; measures bgpvpn create and delete.",
            ),
        }
    }
}

impl Default for CreateAndDeleteBgpvpns {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NeutronClient> Scenario<NeutronEnv<C>> for CreateAndDeleteBgpvpns {
    fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    fn check_args(&self, args: &ScenarioArgs) -> Result<(), ScenarioError> {
        decode_args::<BgpVpnArgs>(&self.info.name, args).map(|_| ())
    }

    async fn run(
        &self,
        env: &NeutronEnv<C>,
        ctx: &ScenarioContext,
        args: &ScenarioArgs,
        actions: &AtomicActions,
    ) -> Result<(), BenchError> {
        let args: BgpVpnArgs = decode_args(&self.info.name, args)?;
        let neutron = NeutronScenario::new(env, ctx, actions);

        let bgpvpn = neutron
            .create_bgpvpn(&args.targets(), args.bgpvpn_type, None)
            .await?;
        neutron.delete_bgpvpn(&bgpvpn).await
    }
}

/// Create a BGP-VPN, then list all BGP-VPNs and check the new one is there.
pub struct CreateAndListBgpvpns {
    info: ScenarioInfo,
}

impl CreateAndListBgpvpns {
    pub fn new() -> Self {
        Self {
            info: admin_info(
                CREATE_AND_LIST_BGPVPNS,
                "Create a BGP-VPN, then list all BGP-VPNs; measures bgpvpn list.",
            ),
        }
    }
}

impl Default for CreateAndListBgpvpns {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NeutronClient> Scenario<NeutronEnv<C>> for CreateAndListBgpvpns {
    fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    fn check_args(&self, args: &ScenarioArgs) -> Result<(), ScenarioError> {
        decode_args::<BgpVpnArgs>(&self.info.name, args).map(|_| ())
    }

    async fn run(
        &self,
        env: &NeutronEnv<C>,
        ctx: &ScenarioContext,
        args: &ScenarioArgs,
        actions: &AtomicActions,
    ) -> Result<(), BenchError> {
        let args: BgpVpnArgs = decode_args(&self.info.name, args)?;
        let neutron = NeutronScenario::new(env, ctx, actions);

        let bgpvpn = neutron
            .create_bgpvpn(&args.targets(), args.bgpvpn_type, None)
            .await?;
        let bgpvpns = neutron.list_bgpvpns().await?;

        if !bgpvpns.iter().any(|b| b.id == bgpvpn.id) {
            return Err(ScenarioError::AssertionFailed(format!(
                "bgpvpn {} missing from list of {} bgpvpns",
                bgpvpn.id,
                bgpvpns.len()
            ))
            .into());
        }
        Ok(())
    }
}

/// Create a BGP-VPN, then update the selected fields.
pub struct CreateAndUpdateBgpvpns {
    info: ScenarioInfo,
}

impl CreateAndUpdateBgpvpns {
    pub fn new() -> Self {
        Self {
            info: admin_info(
                CREATE_AND_UPDATE_BGPVPNS,
                "Create a BGP-VPN, then update its name and targets; measures bgpvpn update.",
            ),
        }
    }
}

impl Default for CreateAndUpdateBgpvpns {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NeutronClient> Scenario<NeutronEnv<C>> for CreateAndUpdateBgpvpns {
    fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    fn check_args(&self, args: &ScenarioArgs) -> Result<(), ScenarioError> {
        decode_args::<UpdateBgpVpnArgs>(&self.info.name, args).map(|_| ())
    }

    async fn run(
        &self,
        env: &NeutronEnv<C>,
        ctx: &ScenarioContext,
        args: &ScenarioArgs,
        actions: &AtomicActions,
    ) -> Result<(), BenchError> {
        let args: UpdateBgpVpnArgs = decode_args(&self.info.name, args)?;
        let neutron = NeutronScenario::new(env, ctx, actions);

        let bgpvpn = neutron
            .create_bgpvpn(&args.targets(), args.bgpvpn_type, None)
            .await?;
        neutron
            .update_bgpvpn(&bgpvpn, args.update_name, &args.updated_targets())
            .await?;
        Ok(())
    }
}

/// Associate a tenant network with a new BGP-VPN, then disassociate it.
pub struct CreateAndAssociateDisassociateNetworks {
    info: ScenarioInfo,
}

impl CreateAndAssociateDisassociateNetworks {
    pub fn new() -> Self {
        Self {
            info: user_info(
                ASSOC_DISASSOC_NETWORKS,
                "Associate a network with a BGP-VPN and disassociate it; measures bgpvpn \
                 create and network association create/delete.",
            ),
        }
    }
}

impl Default for CreateAndAssociateDisassociateNetworks {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NeutronClient> Scenario<NeutronEnv<C>> for CreateAndAssociateDisassociateNetworks {
    fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    fn check_args(&self, args: &ScenarioArgs) -> Result<(), ScenarioError> {
        decode_args::<BgpVpnArgs>(&self.info.name, args).map(|_| ())
    }

    async fn run(
        &self,
        env: &NeutronEnv<C>,
        ctx: &ScenarioContext,
        args: &ScenarioArgs,
        actions: &AtomicActions,
    ) -> Result<(), BenchError> {
        let args: BgpVpnArgs = decode_args(&self.info.name, args)?;
        let neutron = NeutronScenario::new(env, ctx, actions);
        let user = neutron.user()?;

        let networks = neutron.list_networks(Some(user.tenant_id.as_str())).await?;
        let network = match networks.into_iter().next() {
            Some(network) => network,
            None => {
                debug!(tenant_id = %user.tenant_id, "no tenant network, creating one");
                neutron.create_network(&NetworkSpec::default()).await?
            }
        };

        let bgpvpn = neutron
            .create_bgpvpn(&args.targets(), args.bgpvpn_type, Some(network.tenant_id.as_str()))
            .await?;
        let association = neutron.create_bgpvpn_network_assoc(&bgpvpn, &network).await?;
        neutron
            .delete_bgpvpn_network_assoc(&bgpvpn, &association)
            .await
    }
}

/// Associate a router with a new BGP-VPN, then disassociate it.
pub struct CreateAndAssociateDisassociateRouters {
    info: ScenarioInfo,
}

impl CreateAndAssociateDisassociateRouters {
    pub fn new() -> Self {
        Self {
            info: user_info(
                ASSOC_DISASSOC_ROUTERS,
                "Associate a router with a BGP-VPN and disassociate it; measures bgpvpn \
                 create and router association create/delete.",
            ),
        }
    }
}

impl Default for CreateAndAssociateDisassociateRouters {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NeutronClient> Scenario<NeutronEnv<C>> for CreateAndAssociateDisassociateRouters {
    fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    fn check_args(&self, args: &ScenarioArgs) -> Result<(), ScenarioError> {
        decode_args::<BgpVpnArgs>(&self.info.name, args).map(|_| ())
    }

    async fn run(
        &self,
        env: &NeutronEnv<C>,
        ctx: &ScenarioContext,
        args: &ScenarioArgs,
        actions: &AtomicActions,
    ) -> Result<(), BenchError> {
        let args: BgpVpnArgs = decode_args(&self.info.name, args)?;
        let neutron = NeutronScenario::new(env, ctx, actions);

        let routers = neutron.list_routers().await?;
        let router = match routers.into_iter().next() {
            Some(router) => router,
            None => {
                debug!("no router visible, creating one");
                neutron.create_router(&RouterSpec::default()).await?
            }
        };

        let bgpvpn = neutron
            .create_bgpvpn(&args.targets(), args.bgpvpn_type, Some(router.tenant_id.as_str()))
            .await?;
        let association = neutron.create_bgpvpn_router_assoc(&bgpvpn, &router).await?;
        neutron
            .delete_bgpvpn_router_assoc(&bgpvpn, &association)
            .await
    }
}

// --- registration ---

/// Registers the five BGP-VPN scenarios.
pub fn register<C: NeutronClient>(
    registry: &mut ScenarioRegistry<NeutronEnv<C>>,
) -> Result<(), ScenarioError> {
    registry.register(Box::new(CreateAndDeleteBgpvpns::new()))?;
    registry.register(Box::new(CreateAndListBgpvpns::new()))?;
    registry.register(Box::new(CreateAndUpdateBgpvpns::new()))?;
    registry.register(Box::new(CreateAndAssociateDisassociateNetworks::new()))?;
    registry.register(Box::new(CreateAndAssociateDisassociateRouters::new()))?;
    Ok(())
}

/// A registry holding every built-in scenario.
pub fn builtin_registry<C: NeutronClient>() -> Result<ScenarioRegistry<NeutronEnv<C>>, ScenarioError>
{
    let mut registry = ScenarioRegistry::new();
    register(&mut registry)?;
    Ok(registry)
}
