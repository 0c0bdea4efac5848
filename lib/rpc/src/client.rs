//! The RPC client: authentication, cookie reuse, and bounded retry.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use fieldops_core::{ClientError, OdooId};
use fieldops_kv::KVStore;

use crate::config::{OdooConfig, RetryPolicy};
use crate::domain::Domain;
use crate::protocol::{self, CallKw};
use crate::session::SessionStore;
use crate::transport::{HttpTransport, Transport};

/// Options for `search_read` calls.
#[derive(Debug, Clone, Default)]
pub struct SearchReadOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order: Option<String>,
}

impl SearchReadOptions {
    pub fn limited(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    /// Fill in a sort order when the caller left it unset.
    pub fn or_order(mut self, default: &str) -> Self {
        self.order.get_or_insert_with(|| default.to_string());
        self
    }
}

/// JSON-RPC client bound to one server and one persisted session.
///
/// The first call with no cached cookie authenticates; later calls
/// reuse the stored cookie, including across process restarts. A call
/// that comes back with a stale session re-authenticates at most
/// [`RetryPolicy::max_reauth`] times and retries; any other error
/// surfaces immediately.
pub struct OdooClient {
    config: OdooConfig,
    transport: Arc<dyn Transport>,
    session: SessionStore,
    retry: RetryPolicy,
}

impl OdooClient {
    pub fn new(config: OdooConfig, transport: Arc<dyn Transport>, store: Arc<dyn KVStore>) -> Self {
        Self {
            config,
            transport,
            session: SessionStore::new(store),
            retry: RetryPolicy::default(),
        }
    }

    /// Client using the real HTTP transport.
    pub fn connect(config: OdooConfig, store: Arc<dyn KVStore>) -> Result<Self, ClientError> {
        Ok(Self::new(config, Arc::new(HttpTransport::new()?), store))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &OdooConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Authenticate with the configured credentials and persist the
    /// session cookie.
    ///
    /// The cookie is taken from the `Set-Cookie` header; some proxies
    /// strip it, in which case the `session_id` in the result body is
    /// used instead.
    pub async fn authenticate(&self) -> Result<String, ClientError> {
        let body = protocol::envelope(&json!({
            "db": self.config.db,
            "login": self.config.login,
            "password": self.config.password,
        }))?;
        let response = self
            .transport
            .post_json(
                &self.config.authenticate_url(),
                &body,
                None,
                self.config.timeout,
            )
            .await?;
        // No session exists yet, so a fault or a non-envelope body
        // here is a refused login, never an expiry to retry.
        let result = match protocol::evaluate(&response.body) {
            Ok(result) => result,
            Err(ClientError::Server { message, .. }) => {
                return Err(ClientError::Auth(message));
            }
            Err(ClientError::SessionExpired) => {
                return Err(ClientError::Auth(
                    "malformed authenticate response".to_string(),
                ));
            }
            Err(err) => return Err(err),
        };

        if result.get("uid").and_then(Value::as_i64).is_none() {
            return Err(ClientError::Auth("invalid credentials".to_string()));
        }

        let cookie = session_cookie(&response.set_cookie)
            .or_else(|| {
                result
                    .get("session_id")
                    .and_then(Value::as_str)
                    .map(|sid| format!("session_id={sid}"))
            })
            .ok_or_else(|| {
                ClientError::Auth("no session cookie in authenticate response".to_string())
            })?;

        self.session.save(&cookie)?;
        debug!(login = %self.config.login, "authenticated");
        Ok(cookie)
    }

    pub async fn call_kw(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, ClientError> {
        self.call_kw_with_timeout(model, method, args, kwargs, self.config.timeout)
            .await
    }

    /// Execute a `call_kw` request with an explicit timeout.
    pub async fn call_kw_with_timeout(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
        timeout: Duration,
    ) -> Result<Value, ClientError> {
        let body = protocol::envelope(&CallKw {
            model: model.to_string(),
            method: method.to_string(),
            args,
            kwargs,
        })?;

        let mut cookie = match self.session.cookie()? {
            Some(cookie) => cookie,
            None => self.authenticate().await?,
        };

        let mut reauths = 0;
        loop {
            let response = self
                .transport
                .post_json(&self.config.call_kw_url(), &body, Some(&cookie), timeout)
                .await?;
            match protocol::evaluate(&response.body) {
                Ok(result) => return Ok(result),
                Err(err) if err.is_session_expired() && reauths < self.retry.max_reauth => {
                    reauths += 1;
                    warn!(model, method, "session expired, re-authenticating");
                    self.session.clear()?;
                    cookie = self.authenticate().await?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub async fn search_read(
        &self,
        model: &str,
        domain: Domain,
        fields: &[&str],
        options: SearchReadOptions,
    ) -> Result<Vec<Value>, ClientError> {
        let mut kwargs = json!({"fields": fields});
        if let Some(limit) = options.limit {
            kwargs["limit"] = limit.into();
        }
        if let Some(offset) = options.offset {
            kwargs["offset"] = offset.into();
        }
        if let Some(order) = &options.order {
            kwargs["order"] = order.clone().into();
        }

        let result = self
            .call_kw(model, "search_read", json!([domain]), kwargs)
            .await?;
        as_records(result)
    }

    /// `search_read` deserialized into typed records.
    pub async fn search_read_as<T: DeserializeOwned>(
        &self,
        model: &str,
        domain: Domain,
        fields: &[&str],
        options: SearchReadOptions,
    ) -> Result<Vec<T>, ClientError> {
        self.search_read(model, domain, fields, options)
            .await?
            .into_iter()
            .map(|record| {
                serde_json::from_value(record).map_err(|e| ClientError::Decode(e.to_string()))
            })
            .collect()
    }

    pub async fn read(
        &self,
        model: &str,
        ids: &[OdooId],
        fields: &[&str],
    ) -> Result<Vec<Value>, ClientError> {
        let result = self
            .call_kw(model, "read", json!([ids]), json!({"fields": fields}))
            .await?;
        as_records(result)
    }

    pub async fn create(&self, model: &str, vals: Value) -> Result<OdooId, ClientError> {
        self.create_with_timeout(model, vals, self.config.timeout)
            .await
    }

    /// `create` with an explicit timeout, for records carrying binary
    /// payloads.
    pub async fn create_with_timeout(
        &self,
        model: &str,
        vals: Value,
        timeout: Duration,
    ) -> Result<OdooId, ClientError> {
        let result = self
            .call_kw_with_timeout(model, "create", json!([vals]), json!({}), timeout)
            .await?;
        created_id(&result)
            .ok_or_else(|| ClientError::Decode(format!("create on {model} returned no id")))
    }

    pub async fn write(
        &self,
        model: &str,
        ids: &[OdooId],
        vals: Value,
    ) -> Result<(), ClientError> {
        self.call_kw(model, "write", json!([ids, vals]), json!({}))
            .await?;
        Ok(())
    }

    /// Invoke an arbitrary model method on a set of records.
    pub async fn exec(
        &self,
        model: &str,
        method: &str,
        ids: &[OdooId],
    ) -> Result<Value, ClientError> {
        self.call_kw(model, method, json!([ids]), json!({})).await
    }
}

fn session_cookie(set_cookie: &[String]) -> Option<String> {
    set_cookie.iter().find_map(|header| {
        let pair = header.split(';').next()?.trim();
        pair.starts_with("session_id=").then(|| pair.to_string())
    })
}

/// The create result arrives as a bare id or a single-element list.
fn created_id(result: &Value) -> Option<OdooId> {
    match result {
        Value::Number(n) => n.as_i64(),
        Value::Array(items) => items.first().and_then(Value::as_i64),
        _ => None,
    }
}

fn as_records(result: Value) -> Result<Vec<Value>, ClientError> {
    match result {
        Value::Array(records) => Ok(records),
        other => Err(ClientError::Decode(format!(
            "expected record list, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use fieldops_kv::MemoryStore;

    fn client_with(transport: Arc<MockTransport>) -> OdooClient {
        let config = OdooConfig::new("https://erp.example.com", "prod", "jo", "secret");
        OdooClient::new(config, transport, Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn authenticate_extracts_cookie_from_header() {
        let transport = Arc::new(MockTransport::new());
        transport.push_auth("session_id=abc123", 7);
        let client = client_with(transport.clone());

        let cookie = client.authenticate().await.unwrap();
        assert_eq!(cookie, "session_id=abc123");
        assert_eq!(
            client.session().cookie().unwrap().as_deref(),
            Some("session_id=abc123")
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://erp.example.com/web/session/authenticate"
        );
        assert_eq!(requests[0].cookie, None);
        assert_eq!(
            requests[0].body,
            json!({
                "jsonrpc": "2.0",
                "method": "call",
                "params": {"db": "prod", "login": "jo", "password": "secret"},
            })
        );
    }

    #[tokio::test]
    async fn authenticate_falls_back_to_body_session_id() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!({"uid": 7, "session_id": "xyz789"}));
        let client = client_with(transport);

        let cookie = client.authenticate().await.unwrap();
        assert_eq!(cookie, "session_id=xyz789");
    }

    #[tokio::test]
    async fn authenticate_rejects_false_uid() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!({"uid": false}));
        let client = client_with(transport);

        assert!(matches!(
            client.authenticate().await,
            Err(ClientError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn authenticate_maps_faults_to_auth_errors() {
        let transport = Arc::new(MockTransport::new());
        transport.push_fault("odoo.exceptions.AccessDenied", "Access Denied");
        let client = client_with(transport);

        let err = client.authenticate().await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(ref m) if m == "Access Denied"));
    }

    #[tokio::test]
    async fn authenticate_treats_non_envelope_body_as_auth_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.push_body("<html>login</html>");
        let client = client_with(transport);

        let err = client.authenticate().await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
        assert!(!err.is_session_expired());
    }

    #[tokio::test]
    async fn call_kw_reuses_persisted_cookie_without_login() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([{"id": 1}]));
        let client = client_with(transport.clone());
        client.session().save("session_id=cached").unwrap();

        let result = client
            .call_kw("hr.employee", "search_read", json!([[]]), json!({}))
            .await
            .unwrap();
        assert_eq!(result, json!([{"id": 1}]));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1, "no authenticate round-trip expected");
        assert_eq!(
            requests[0].url,
            "https://erp.example.com/web/dataset/call_kw"
        );
        assert_eq!(requests[0].cookie.as_deref(), Some("session_id=cached"));
    }

    #[tokio::test]
    async fn call_kw_logs_in_when_no_cookie_cached() {
        let transport = Arc::new(MockTransport::new());
        transport.push_auth("session_id=fresh", 7);
        transport.push_result(json!(true));
        let client = client_with(transport.clone());

        client
            .call_kw("hr.attendance", "write", json!([[5], {}]), json!({}))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].url.ends_with("/web/session/authenticate"));
        assert_eq!(requests[1].cookie.as_deref(), Some("session_id=fresh"));
    }

    #[tokio::test]
    async fn expired_session_reauths_once_and_retries() {
        let transport = Arc::new(MockTransport::new());
        transport.push_expired();
        transport.push_auth("session_id=new", 7);
        transport.push_result(json!(42));
        let client = client_with(transport.clone());
        client.session().save("session_id=stale").unwrap();

        let result = client
            .call_kw("audit.transaction", "create", json!([{}]), json!({}))
            .await
            .unwrap();
        assert_eq!(result, json!(42));

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].cookie.as_deref(), Some("session_id=stale"));
        assert!(requests[1].url.ends_with("/web/session/authenticate"));
        assert_eq!(requests[2].cookie.as_deref(), Some("session_id=new"));
        // Retried request is byte-identical to the original.
        assert_eq!(requests[0].body, requests[2].body);
        assert_eq!(
            client.session().cookie().unwrap().as_deref(),
            Some("session_id=new")
        );
    }

    #[tokio::test]
    async fn second_expiry_surfaces_without_further_retry() {
        let transport = Arc::new(MockTransport::new());
        transport.push_expired();
        transport.push_auth("session_id=new", 7);
        transport.push_expired();
        let client = client_with(transport.clone());
        client.session().save("session_id=stale").unwrap();

        let err = client
            .call_kw("audit.transaction", "create", json!([{}]), json!({}))
            .await
            .unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn missing_jsonrpc_member_triggers_reauth() {
        let transport = Arc::new(MockTransport::new());
        transport.push_body("<html>redirect to login</html>");
        transport.push_auth("session_id=new", 7);
        transport.push_result(json!([]));
        let client = client_with(transport.clone());
        client.session().save("session_id=stale").unwrap();

        client
            .call_kw("res.users", "search_read", json!([[]]), json!({}))
            .await
            .unwrap();
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn server_fault_does_not_retry() {
        let transport = Arc::new(MockTransport::new());
        transport.push_fault("odoo.exceptions.ValidationError", "bad vals");
        let client = client_with(transport.clone());
        client.session().save("session_id=ok").unwrap();

        let err = client
            .call_kw("hr.attendance", "create", json!([{}]), json!({}))
            .await
            .unwrap_err();
        match err {
            ClientError::Server { name, message } => {
                assert_eq!(name, "odoo.exceptions.ValidationError");
                assert_eq!(message, "bad vals");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn search_read_builds_kwargs() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([]));
        let client = client_with(transport.clone());
        client.session().save("session_id=ok").unwrap();

        client
            .search_read(
                "vehicle.tracking",
                Domain::new().eq("vehicle_id", 4),
                &["id", "date"],
                SearchReadOptions::limited(50).offset(10).order("date desc"),
            )
            .await
            .unwrap();

        let body = &transport.requests()[0].body;
        assert_eq!(
            body["params"],
            json!({
                "model": "vehicle.tracking",
                "method": "search_read",
                "args": [[["vehicle_id", "=", 4]]],
                "kwargs": {
                    "fields": ["id", "date"],
                    "limit": 50,
                    "offset": 10,
                    "order": "date desc",
                },
            })
        );
    }

    #[tokio::test]
    async fn create_accepts_bare_and_wrapped_ids() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!(99));
        transport.push_result(json!([100]));
        let client = client_with(transport);
        client.session().save("session_id=ok").unwrap();

        assert_eq!(
            client.create("vehicle.tracking", json!({})).await.unwrap(),
            99
        );
        assert_eq!(
            client.create("vehicle.tracking", json!({})).await.unwrap(),
            100
        );
    }
}
