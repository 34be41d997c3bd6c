//! Neutron BGP-VPN scenarios for neutron-bench.
//!
//! # Module Structure
//!
//! - [`error`]: `NeutronError` and its conversion into `BenchError`
//! - [`types`]: BGP-VPN, network, router and association records
//! - [`client`]: `NeutronClient` trait and resource id validation
//! - [`auth`]: Keystone v3 token issuance and catalog lookup
//! - [`http`]: reqwest-backed `HttpNeutronClient`
//! - [`env`]: `NeutronEnv` (admin + user clients) and platform fact discovery
//! - [`utils`]: `NeutronScenario` timed helpers
//! - [`bgpvpn`]: the five scenarios and their registration
//!
//! # Example
//!
//! ```ignore
//! let env = NeutronEnv::connect(&config.openstack).await?;
//! let facts = env.discover_facts().await?;
//! let registry = builtin_registry()?;
//! let runner = Runner::new(&registry, &env, &facts, generate_task_id());
//! let report = runner.run_workload(&workload).await?;
//! ```

pub mod auth;
pub mod bgpvpn;
pub mod client;
pub mod env;
pub mod error;
pub mod http;
pub mod types;
pub mod utils;

pub use bgpvpn::{builtin_registry, register};
pub use client::{NeutronClient, validate_resource_id};
pub use env::{NeutronEnv, UserClient};
pub use error::NeutronError;
pub use http::HttpNeutronClient;
pub use types::{
    BgpVpn, BgpVpnType, CreateBgpVpn, Extension, Network, NetworkAssociation, NetworkSpec, Router,
    RouterAssociation, RouterSpec, UpdateBgpVpn,
};
pub use utils::{BgpVpnTargets, NeutronScenario};
