//! Scenario environment: the admin client and the per-user clients.
//!
//! Every iteration sees the same [`NeutronEnv`]; the runner picks a user by
//! index round-robin. Platform facts for validation are discovered once per
//! task from the admin (or first user) session.

use tracing::{info, warn};

use neutron_bench_core::config::OpenStackConfig;
use neutron_bench_core::error::ScenarioError;
use neutron_bench_core::validation::{PLATFORM_OPENSTACK, PlatformFacts};

use crate::auth::catalog_service_types;
use crate::client::NeutronClient;
use crate::error::NeutronError;
use crate::http::HttpNeutronClient;

/// A tenant user's client and project.
pub struct UserClient<C> {
    pub client: C,
    pub tenant_id: String,
}

/// Clients the scenarios run against.
pub struct NeutronEnv<C: NeutronClient> {
    admin: Option<C>,
    users: Vec<UserClient<C>>,
}

impl<C: NeutronClient> NeutronEnv<C> {
    pub fn new(admin: Option<C>, users: Vec<UserClient<C>>) -> Self {
        Self { admin, users }
    }

    pub fn admin(&self) -> Result<&C, ScenarioError> {
        self.admin.as_ref().ok_or(ScenarioError::NoAdminContext)
    }

    /// User at `index`, as assigned by the iteration context.
    pub fn user(&self, index: Option<usize>, iteration: usize) -> Result<&UserClient<C>, ScenarioError> {
        index
            .and_then(|i| self.users.get(i))
            .ok_or(ScenarioError::NoUserContext { iteration })
    }

    pub fn has_admin(&self) -> bool {
        self.admin.is_some()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Facts for validation, given the catalog's service types.
    ///
    /// Extensions are read with the admin client, or the first user when no
    /// admin is configured.
    pub async fn platform_facts(&self, services: Vec<String>) -> Result<PlatformFacts, NeutronError> {
        let probe = self
            .admin
            .as_ref()
            .or_else(|| self.users.first().map(|u| &u.client));

        let neutron_extensions = match probe {
            Some(client) => client
                .list_extensions()
                .await?
                .into_iter()
                .map(|ext| ext.alias)
                .collect(),
            None => Vec::new(),
        };

        Ok(PlatformFacts {
            platform: PLATFORM_OPENSTACK.to_owned(),
            has_admin: self.has_admin(),
            user_count: self.user_count(),
            services,
            neutron_extensions,
        })
    }
}

impl NeutronEnv<HttpNeutronClient> {
    /// Authenticates the admin and every configured user.
    ///
    /// # Errors
    ///
    /// Fails on the first credential set Keystone rejects, or when no
    /// credentials are configured at all.
    pub async fn connect(config: &OpenStackConfig) -> Result<Self, NeutronError> {
        if config.admin.is_none() && config.users.is_empty() {
            return Err(NeutronError::Config(
                "no credentials configured (openstack.admin or openstack.users)".to_owned(),
            ));
        }

        let admin = match &config.admin {
            Some(cred) => Some(HttpNeutronClient::connect(config, cred).await?),
            None => {
                warn!("no admin credentials configured; admin scenarios will fail validation");
                None
            }
        };

        let mut users = Vec::with_capacity(config.users.len());
        for cred in &config.users {
            let client = HttpNeutronClient::connect(config, cred).await?;
            let tenant_id = client.project_id().to_owned();
            users.push(UserClient { client, tenant_id });
        }

        info!(
            admin = admin.is_some(),
            users = users.len(),
            "neutron environment ready"
        );
        Ok(Self::new(admin, users))
    }

    /// Discovers facts from the session catalog and Neutron extensions.
    pub async fn discover_facts(&self) -> Result<PlatformFacts, NeutronError> {
        let catalog = self
            .admin
            .as_ref()
            .or_else(|| self.users.first().map(|u| &u.client))
            .map(|c| catalog_service_types(c.catalog()))
            .unwrap_or_default();
        let facts = self.platform_facts(catalog).await?;
        info!(
            services = ?facts.services,
            extensions = facts.neutron_extensions.len(),
            "platform facts discovered"
        );
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockNeutronClient;

    #[tokio::test]
    async fn facts_come_from_admin_extensions() {
        let env = NeutronEnv::new(
            Some(MockNeutronClient::new("admin").with_extensions(&["bgpvpn", "router"])),
            vec![UserClient {
                client: MockNeutronClient::new("t1"),
                tenant_id: "t1".to_owned(),
            }],
        );
        let facts = env.platform_facts(vec!["network".to_owned()]).await.unwrap();
        assert_eq!(facts.platform, PLATFORM_OPENSTACK);
        assert!(facts.has_admin);
        assert_eq!(facts.user_count, 1);
        assert_eq!(facts.neutron_extensions, vec!["bgpvpn", "router"]);
    }

    #[tokio::test]
    async fn facts_fall_back_to_first_user() {
        let env = NeutronEnv::new(
            None,
            vec![UserClient {
                client: MockNeutronClient::new("t1").with_extensions(&["bgpvpn"]),
                tenant_id: "t1".to_owned(),
            }],
        );
        let facts = env.platform_facts(Vec::new()).await.unwrap();
        assert!(!facts.has_admin);
        assert_eq!(facts.neutron_extensions, vec!["bgpvpn"]);
    }

    #[test]
    fn missing_contexts_are_scenario_errors() {
        let env: NeutronEnv<MockNeutronClient> = NeutronEnv::new(None, Vec::new());
        assert!(matches!(env.admin(), Err(ScenarioError::NoAdminContext)));
        assert!(matches!(
            env.user(None, 3),
            Err(ScenarioError::NoUserContext { iteration: 3 })
        ));
    }

    #[tokio::test]
    async fn connect_without_credentials_fails_fast() {
        let config = OpenStackConfig {
            auth_url: "https://keystone:5000/v3".to_owned(),
            ..OpenStackConfig::default()
        };
        let err = NeutronEnv::connect(&config).await.err().unwrap();
        assert!(matches!(err, NeutronError::Config(_)));
    }
}
