use crate::transport::{Credentials, HttpTransport, Request, Transport};
use crate::{ClientError, Result};
use orientdb_core::{
    Config, DatabasePath, Endpoint, Operation, ResponseBody, SessionField,
};
use std::sync::Arc;
use uuid::Uuid;

/// Which remembered result an operation writes to
#[derive(Debug, Clone, Copy)]
enum Slot {
    Session,
    Query,
    Command,
}

/// OrientDB REST client bound to one database.
///
/// Every operation issues a single request, returns its outcome, and also
/// records it: the body goes to the session, query or command slot and the
/// error message (if any) to a shared last-error field. Operations take
/// `&mut self`, so one client never has two requests in flight; share it
/// behind `Arc<tokio::sync::Mutex<_>>` when several tasks need it.
pub struct DatabaseClient {
    path: DatabasePath,
    transport: Arc<dyn Transport>,
    structured_responses: bool,
    credentials: Option<Credentials>,
    session_info: Option<ResponseBody>,
    last_query_result: Option<ResponseBody>,
    last_command_result: Option<ResponseBody>,
    last_error_message: Option<String>,
}

impl DatabaseClient {
    /// Create a client for `database_path` (e.g. `http://localhost:2480/demo`)
    pub fn new(database_path: &str) -> Result<Self> {
        Ok(Self::with_transport(
            database_path,
            Arc::new(HttpTransport::new()?),
        ))
    }

    /// Create a client using a custom transport
    pub fn with_transport(database_path: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            path: DatabasePath::parse(database_path),
            transport,
            structured_responses: true,
            credentials: None,
            session_info: None,
            last_query_result: None,
            last_command_result: None,
            last_error_message: None,
        }
    }

    /// Create a client from configuration (path, timeout, response mode)
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::with_timeout(config.timeout())?;
        let mut client = Self::with_transport(&config.database_path, Arc::new(transport));
        client.structured_responses = config.structured_responses;
        Ok(client)
    }

    pub fn server_base_url(&self) -> &str {
        &self.path.server_url
    }

    pub fn database_name(&self) -> &str {
        &self.path.database
    }

    pub fn session_info(&self) -> Option<&ResponseBody> {
        self.session_info.as_ref()
    }

    pub fn last_query_result(&self) -> Option<&ResponseBody> {
        self.last_query_result.as_ref()
    }

    pub fn last_command_result(&self) -> Option<&ResponseBody> {
        self.last_command_result.as_ref()
    }

    pub fn last_error_message(&self) -> Option<&str> {
        self.last_error_message.as_deref()
    }

    pub fn structured_responses(&self) -> bool {
        self.structured_responses
    }

    pub fn set_structured_responses(&mut self, structured: bool) {
        self.structured_responses = structured;
    }

    pub fn is_open(&self) -> bool {
        self.session_info.is_some()
    }

    /// Connect without credentials
    pub async fn open(&mut self) -> Result<ResponseBody> {
        self.connect(None).await
    }

    /// Connect with basic-auth credentials. On success the credentials are
    /// reused by every later request until the session is closed.
    pub async fn open_with_credentials(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<ResponseBody> {
        self.connect(Some(Credentials::new(username, password)))
            .await
    }

    async fn connect(&mut self, credentials: Option<Credentials>) -> Result<ResponseBody> {
        let outcome = self.dispatch(&Endpoint::Connect, credentials.clone()).await;
        let outcome = self.record(Slot::Session, outcome);

        match &outcome {
            Ok(_) => {
                tracing::info!(
                    db = %self.path.database,
                    authenticated = credentials.is_some(),
                    "Database opened"
                );
                self.credentials = credentials;
            }
            Err(_) => self.credentials = None,
        }

        outcome
    }

    /// Run a SQL query
    pub async fn query(&mut self, sql: &str) -> Result<ResponseBody> {
        self.query_with(sql, None, None).await
    }

    /// Run a SQL query with an optional result limit and fetch plan. Empty
    /// strings count as absent.
    pub async fn query_with(
        &mut self,
        sql: &str,
        limit: Option<&str>,
        fetch_plan: Option<&str>,
    ) -> Result<ResponseBody> {
        self.ensure_open().await;
        let endpoint = Endpoint::Query {
            sql,
            limit,
            fetch_plan,
        };
        self.call(&endpoint, Slot::Query).await
    }

    /// Load a record by id; a leading `#` is ignored
    pub async fn load(&mut self, rid: &str) -> Result<ResponseBody> {
        self.ensure_open().await;
        let endpoint = Endpoint::Document {
            rid,
            fetch_plan: None,
        };
        self.call(&endpoint, Slot::Query).await
    }

    pub async fn load_with_fetch_plan(
        &mut self,
        rid: &str,
        fetch_plan: &str,
    ) -> Result<ResponseBody> {
        self.ensure_open().await;
        let endpoint = Endpoint::Document {
            rid,
            fetch_plan: Some(fetch_plan),
        };
        self.call(&endpoint, Slot::Query).await
    }

    pub async fn class_info(&mut self, class_name: &str) -> Result<ResponseBody> {
        self.ensure_open().await;
        self.call(&Endpoint::ClassInfo { name: class_name }, Slot::Command)
            .await
    }

    /// Create a class. The response is always kept as raw text.
    pub async fn create_class(&mut self, class_name: &str) -> Result<ResponseBody> {
        self.ensure_open().await;
        self.call(&Endpoint::CreateClass { name: class_name }, Slot::Command)
            .await
    }

    pub async fn browse_cluster(&mut self, cluster_name: &str) -> Result<ResponseBody> {
        self.ensure_open().await;
        self.call(&Endpoint::Cluster { name: cluster_name }, Slot::Command)
            .await
    }

    /// Execute a SQL command. The response is always kept as raw text.
    pub async fn execute_command(&mut self, sql: &str) -> Result<ResponseBody> {
        self.ensure_open().await;
        self.call(&Endpoint::Command { sql }, Slot::Command).await
    }

    pub async fn server_info(&mut self) -> Result<ResponseBody> {
        self.ensure_open().await;
        self.call(&Endpoint::Server, Slot::Command).await
    }

    /// Classes of the open database
    pub fn schema(&mut self) -> Result<Option<serde_json::Value>> {
        self.session_field(SessionField::Classes)
    }

    pub fn security_roles(&mut self) -> Result<Option<serde_json::Value>> {
        self.session_field(SessionField::Roles)
    }

    pub fn security_users(&mut self) -> Result<Option<serde_json::Value>> {
        self.session_field(SessionField::Users)
    }

    /// Disconnect. Without an open session nothing is sent and the previous
    /// command result is returned as is. Otherwise the session is dropped
    /// whatever the server answers.
    pub async fn close(&mut self) -> Result<Option<ResponseBody>> {
        if self.session_info.is_none() {
            return Ok(self.last_command_result.clone());
        }

        let outcome = self.call(&Endpoint::Disconnect, Slot::Command).await;
        self.session_info = None;
        self.credentials = None;
        tracing::info!(db = %self.path.database, "Database closed");

        outcome.map(Some)
    }

    async fn ensure_open(&mut self) {
        if self.session_info.is_some() {
            return;
        }

        tracing::debug!(db = %self.path.database, "Session closed, opening implicitly");
        if let Err(e) = self.open().await {
            tracing::warn!(error = %e, "Implicit open failed");
        }
    }

    async fn call(&mut self, endpoint: &Endpoint<'_>, slot: Slot) -> Result<ResponseBody> {
        let outcome = self.dispatch(endpoint, self.credentials.clone()).await;
        self.record(slot, outcome)
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<ResponseBody> {
        match slot {
            Slot::Session => &mut self.session_info,
            Slot::Query => &mut self.last_query_result,
            Slot::Command => &mut self.last_command_result,
        }
    }

    fn record(&mut self, slot: Slot, outcome: Result<ResponseBody>) -> Result<ResponseBody> {
        match &outcome {
            Ok(body) => {
                self.last_error_message = None;
                *self.slot_mut(slot) = Some(body.clone());
            }
            Err(e) => {
                self.last_error_message = Some(e.to_string());
                *self.slot_mut(slot) = None;
            }
        }
        outcome
    }

    #[tracing::instrument(
        name = "request",
        skip(self, endpoint, credentials),
        fields(
            request_id = %Uuid::new_v4(),
            method = %endpoint.method(),
            path = %endpoint.path(&self.path.database)
        )
    )]
    async fn dispatch(
        &self,
        endpoint: &Endpoint<'_>,
        credentials: Option<Credentials>,
    ) -> Result<ResponseBody> {
        let operation = endpoint.operation();
        let request = Request {
            method: endpoint.method(),
            url: endpoint.url(&self.path),
            credentials,
        };

        let body = match self.transport.send(request).await {
            Ok(body) => body,
            Err(failure) => {
                tracing::warn!(status = ?failure.status, "Request failed");
                return Err(ClientError::request_failure(operation, failure.body));
            }
        };

        let structured = self.structured_responses && endpoint.parses_response();
        match ResponseBody::from_body(&body, structured) {
            Ok(parsed) => {
                tracing::debug!(bytes = body.len(), structured, "Request succeeded");
                Ok(parsed)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Response body is not valid JSON");
                Err(ClientError::request_failure(operation, body))
            }
        }
    }

    fn session_field(&mut self, field: SessionField) -> Result<Option<serde_json::Value>> {
        let result = match &self.session_info {
            None => Err(ClientError::DatabaseClosed),
            Some(session) => session.field(field.key()).map_err(|e| {
                tracing::warn!(error = %e, field = field.key(), "Session descriptor is not valid JSON");
                ClientError::request_failure(
                    Operation::Connect,
                    session.as_raw().unwrap_or_default(),
                )
            }),
        };

        if let Err(e) = &result {
            self.last_error_message = Some(e.to_string());
        }
        result
    }
}
