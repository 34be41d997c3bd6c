//! reqwest-backed [`NeutronClient`].
//!
//! [`HttpNeutronClient::connect`] authenticates against Keystone, resolves the
//! Neutron endpoint and then issues every request with `X-Auth-Token`.
//!
//! Neutron wraps single resources and lists in an envelope keyed by the
//! resource name (`{"bgpvpn": {...}}`, `{"bgpvpns": [...]}`); errors come back
//! as `{"NeutronError": {"type", "message", "detail"}}`.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use neutron_bench_core::config::{CredentialConfig, OpenStackConfig};

use crate::auth::{self, CatalogEntry, NETWORK_SERVICE_TYPE};
use crate::client::{NeutronClient, validate_resource_id};
use crate::error::NeutronError;
use crate::types::{
    BgpVpn, CreateBgpVpn, Extension, Network, NetworkAssociation, NetworkSpec, Router,
    RouterAssociation, RouterSpec, UpdateBgpVpn,
};

/// Header carrying the token on every Neutron request.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Authenticated Neutron client for one set of credentials.
///
/// ```ignore
/// let client = HttpNeutronClient::connect(&config.openstack, &admin).await?;
/// let vpns = client.list_bgpvpns().await?;
/// ```
pub struct HttpNeutronClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    project_id: String,
    catalog: Vec<CatalogEntry>,
}

impl HttpNeutronClient {
    /// Authenticates `cred` and resolves the network endpoint.
    ///
    /// # Errors
    ///
    /// - `NeutronError::Config` when `auth_url` is unset or the HTTP client cannot be built
    /// - `NeutronError::Auth` when Keystone rejects the credentials
    /// - `NeutronError::EndpointNotFound` when the catalog has no matching network endpoint
    pub async fn connect(
        config: &OpenStackConfig,
        cred: &CredentialConfig,
    ) -> Result<Self, NeutronError> {
        if config.auth_url.is_empty() {
            return Err(NeutronError::Config(
                "openstack.auth_url is not configured".to_owned(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.https_insecure)
            .build()
            .map_err(|e| NeutronError::Config(format!("failed to build http client: {e}")))?;

        let session = auth::authenticate(&http, &config.auth_url, cred).await?;

        let endpoint = if config.network_endpoint.is_empty() {
            auth::select_endpoint(
                &session.catalog,
                NETWORK_SERVICE_TYPE,
                &config.endpoint_type,
                &config.region_name,
            )?
        } else {
            config.network_endpoint.clone()
        };
        let base_url = auth::network_base_url(&endpoint);

        info!(
            username = %cred.username,
            project_id = %session.project_id,
            endpoint = %base_url,
            "connected to neutron"
        );

        Ok(Self {
            http,
            base_url,
            token: session.token,
            project_id: session.project_id,
            catalog: session.catalog,
        })
    }

    /// Project the token is scoped to.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Versioned Neutron base URL, e.g. `https://neutron:9696/v2.0`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Service catalog returned with the token.
    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
        resource: &str,
        id: &str,
    ) -> Result<Vec<u8>, NeutronError> {
        let url = format!("{}{path}", self.base_url);
        debug!(method = %method, url = %url, "neutron request");

        let mut builder = self
            .http
            .request(method, &url)
            .header(AUTH_TOKEN_HEADER, &self.token);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NeutronError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NeutronError::Transport(e.to_string()))?;

        check_status(status, &bytes, resource, id)?;
        Ok(bytes.to_vec())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        key: &str,
    ) -> Result<T, NeutronError> {
        let body = self
            .request::<()>(Method::GET, path, query, None, key, "")
            .await?;
        unwrap_envelope(&body, key)
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        key: &str,
        id: &str,
    ) -> Result<T, NeutronError> {
        let body = self
            .request(Method::POST, path, &[], Some(body), key, id)
            .await?;
        unwrap_envelope(&body, key)
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        key: &str,
        id: &str,
    ) -> Result<T, NeutronError> {
        let body = self
            .request(Method::PUT, path, &[], Some(body), key, id)
            .await?;
        unwrap_envelope(&body, key)
    }

    async fn delete(&self, path: &str, resource: &str, id: &str) -> Result<(), NeutronError> {
        self.request::<()>(Method::DELETE, path, &[], None, resource, id)
            .await
            .map(|_| ())
    }
}

impl NeutronClient for HttpNeutronClient {
    async fn create_bgpvpn(&self, request: &CreateBgpVpn) -> Result<BgpVpn, NeutronError> {
        self.post("/bgpvpn/bgpvpns", &Envelope::new("bgpvpn", request), "bgpvpn", "")
            .await
    }

    async fn delete_bgpvpn(&self, bgpvpn_id: &str) -> Result<(), NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        self.delete(&format!("/bgpvpn/bgpvpns/{bgpvpn_id}"), "bgpvpn", bgpvpn_id)
            .await
    }

    async fn list_bgpvpns(&self) -> Result<Vec<BgpVpn>, NeutronError> {
        self.get("/bgpvpn/bgpvpns", &[], "bgpvpns").await
    }

    async fn update_bgpvpn(
        &self,
        bgpvpn_id: &str,
        request: &UpdateBgpVpn,
    ) -> Result<BgpVpn, NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        self.put(
            &format!("/bgpvpn/bgpvpns/{bgpvpn_id}"),
            &Envelope::new("bgpvpn", request),
            "bgpvpn",
            bgpvpn_id,
        )
        .await
    }

    async fn list_networks(&self, tenant_id: Option<&str>) -> Result<Vec<Network>, NeutronError> {
        match tenant_id {
            Some(tenant) => {
                self.get("/networks", &[("tenant_id", tenant)], "networks")
                    .await
            }
            None => self.get("/networks", &[], "networks").await,
        }
    }

    async fn create_network(&self, spec: &NetworkSpec) -> Result<Network, NeutronError> {
        self.post("/networks", &Envelope::new("network", spec), "network", "")
            .await
    }

    async fn list_routers(&self) -> Result<Vec<Router>, NeutronError> {
        self.get("/routers", &[], "routers").await
    }

    async fn create_router(&self, spec: &RouterSpec) -> Result<Router, NeutronError> {
        self.post("/routers", &Envelope::new("router", spec), "router", "")
            .await
    }

    async fn create_network_association(
        &self,
        bgpvpn_id: &str,
        network_id: &str,
    ) -> Result<NetworkAssociation, NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        validate_resource_id(network_id)?;
        let body = Envelope::new("network_association", NetworkId { network_id });
        self.post(
            &format!("/bgpvpn/bgpvpns/{bgpvpn_id}/network_associations"),
            &body,
            "network_association",
            bgpvpn_id,
        )
        .await
    }

    async fn delete_network_association(
        &self,
        bgpvpn_id: &str,
        association_id: &str,
    ) -> Result<(), NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        validate_resource_id(association_id)?;
        self.delete(
            &format!("/bgpvpn/bgpvpns/{bgpvpn_id}/network_associations/{association_id}"),
            "network_association",
            association_id,
        )
        .await
    }

    async fn create_router_association(
        &self,
        bgpvpn_id: &str,
        router_id: &str,
    ) -> Result<RouterAssociation, NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        validate_resource_id(router_id)?;
        let body = Envelope::new("router_association", RouterId { router_id });
        self.post(
            &format!("/bgpvpn/bgpvpns/{bgpvpn_id}/router_associations"),
            &body,
            "router_association",
            bgpvpn_id,
        )
        .await
    }

    async fn delete_router_association(
        &self,
        bgpvpn_id: &str,
        association_id: &str,
    ) -> Result<(), NeutronError> {
        validate_resource_id(bgpvpn_id)?;
        validate_resource_id(association_id)?;
        self.delete(
            &format!("/bgpvpn/bgpvpns/{bgpvpn_id}/router_associations/{association_id}"),
            "router_association",
            association_id,
        )
        .await
    }

    async fn list_extensions(&self) -> Result<Vec<Extension>, NeutronError> {
        self.get("/extensions", &[], "extensions").await
    }
}

/// Single-key request wrapper, `{"<key>": body}`.
struct Envelope<'a, T: Serialize> {
    key: &'a str,
    body: T,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    fn new(key: &'a str, body: T) -> Self {
        Self { key, body }
    }
}

impl<T: Serialize> Serialize for Envelope<'_, T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, &self.body)?;
        map.end()
    }
}

#[derive(Serialize)]
struct NetworkId<'a> {
    network_id: &'a str,
}

#[derive(Serialize)]
struct RouterId<'a> {
    router_id: &'a str,
}

/// Maps a response status to an error. 404 becomes `NotFound` for
/// `resource`/`id`; other failures carry the server's message.
pub fn check_status(
    status: StatusCode,
    body: &[u8],
    resource: &str,
    id: &str,
) -> Result<(), NeutronError> {
    if status.is_success() {
        return Ok(());
    }
    let text = String::from_utf8_lossy(body);
    if status == StatusCode::NOT_FOUND {
        return Err(NeutronError::NotFound {
            resource: resource.to_owned(),
            id: if id.is_empty() {
                error_message(&text)
            } else {
                id.to_owned()
            },
        });
    }
    Err(NeutronError::Api {
        status: status.as_u16(),
        message: error_message(&text),
    })
}

/// Extracts a human message from a Neutron or Keystone error body.
///
/// Falls back to the trimmed raw body.
pub fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let message = value
            .get("NeutronError")
            .and_then(|e| e.get("message"))
            .or_else(|| value.get("error").and_then(|e| e.get("message")))
            .and_then(|m| m.as_str());
        if let Some(message) = message {
            return message.to_owned();
        }
    }
    body.trim().to_owned()
}

/// Decodes `{"<key>": T}`.
pub fn unwrap_envelope<T: DeserializeOwned>(body: &[u8], key: &str) -> Result<T, NeutronError> {
    let mut value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| NeutronError::Decode(format!("invalid json: {e}")))?;
    let inner = value
        .get_mut(key)
        .map(serde_json::Value::take)
        .ok_or_else(|| NeutronError::Decode(format!("missing '{key}' in response")))?;
    serde_json::from_value(inner).map_err(|e| NeutronError::Decode(format!("'{key}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BgpVpnType;
    use serde_json::json;

    #[test]
    fn check_status_maps_404_to_not_found() {
        let err = check_status(
            StatusCode::NOT_FOUND,
            br#"{"NeutronError": {"type": "BGPVPNNotFound", "message": "BGPVPN abc could not be found", "detail": ""}}"#,
            "bgpvpn",
            "abc",
        )
        .unwrap_err();
        match err {
            NeutronError::NotFound { resource, id } => {
                assert_eq!(resource, "bgpvpn");
                assert_eq!(id, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_status_uses_neutron_error_message() {
        let err = check_status(
            StatusCode::CONFLICT,
            br#"{"NeutronError": {"type": "BGPVPNNetAssocAlreadyExists", "message": "network already associated", "detail": ""}}"#,
            "network_association",
            "vpn-1",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NeutronError::Api { status: 409, ref message } if message == "network already associated"
        ));
    }

    #[test]
    fn check_status_falls_back_to_raw_body() {
        let err = check_status(
            StatusCode::BAD_GATEWAY,
            b"  upstream unavailable\n",
            "bgpvpn",
            "",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "neutron api error (status 502): upstream unavailable"
        );
    }

    #[test]
    fn check_status_accepts_success_codes() {
        assert!(check_status(StatusCode::OK, b"{}", "bgpvpn", "").is_ok());
        assert!(check_status(StatusCode::CREATED, b"{}", "bgpvpn", "").is_ok());
        assert!(check_status(StatusCode::NO_CONTENT, b"", "bgpvpn", "x").is_ok());
    }

    #[test]
    fn error_message_reads_keystone_errors() {
        let body = r#"{"error": {"code": 401, "title": "Unauthorized", "message": "The request you have made requires authentication."}}"#;
        assert_eq!(
            error_message(body),
            "The request you have made requires authentication."
        );
    }

    #[test]
    fn unwrap_envelope_decodes_lists_and_records() {
        let vpns: Vec<BgpVpn> = unwrap_envelope(
            br#"{"bgpvpns": [{"id": "v1", "name": "a", "type": "l2"}]}"#,
            "bgpvpns",
        )
        .unwrap();
        assert_eq!(vpns.len(), 1);
        assert_eq!(vpns[0].vpn_type, BgpVpnType::L2);

        let assoc: NetworkAssociation = unwrap_envelope(
            br#"{"network_association": {"id": "a1", "network_id": "n1", "tenant_id": "t"}}"#,
            "network_association",
        )
        .unwrap();
        assert_eq!(assoc.network_id, "n1");
    }

    #[test]
    fn unwrap_envelope_missing_key_is_decode_error() {
        let err = unwrap_envelope::<BgpVpn>(br#"{"network": {}}"#, "bgpvpn").unwrap_err();
        assert!(matches!(err, NeutronError::Decode(_)));
        let err = unwrap_envelope::<BgpVpn>(b"not json", "bgpvpn").unwrap_err();
        assert!(matches!(err, NeutronError::Decode(_)));
    }

    #[test]
    fn envelope_wraps_request_bodies() {
        let request = CreateBgpVpn {
            name: "s_bench_a".to_owned(),
            vpn_type: BgpVpnType::L3,
            tenant_id: Some("t1".to_owned()),
            ..CreateBgpVpn::default()
        };
        let value = serde_json::to_value(Envelope::new("bgpvpn", &request)).unwrap();
        assert_eq!(
            value,
            json!({"bgpvpn": {"name": "s_bench_a", "type": "l3", "tenant_id": "t1"}})
        );

        let value = serde_json::to_value(Envelope::new(
            "router_association",
            RouterId { router_id: "r1" },
        ))
        .unwrap();
        assert_eq!(value, json!({"router_association": {"router_id": "r1"}}));
    }
}
