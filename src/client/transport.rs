// File: ./src/client/transport.rs
//! The wire seam: everything that actually talks to the remote service.
//!
//! [`Transport`] is the narrow interface the rest of the crate fetches
//! through; [`HttpTransport`] is the production implementation speaking the
//! service's REST dialect over rustls. Tests substitute their own impl or
//! point [`HttpTransport`] at a local mock server.
use crate::client::auth::AccessHandle;
use crate::client::query::ListTasksQuery;
use crate::error::{Error, Result};
use crate::model::{Task, TaskList, TaskListPage, TaskPage};

use async_trait::async_trait;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tower::ServiceExt;
use tower_http::auth::AddAuthorization;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1/";

pub(crate) type PlainClient = Client<HttpsConnector<HttpConnector>, String>;
type AuthorizedClient = AddAuthorization<PlainClient>;

/// Builds the shared rustls-backed HTTP client.
pub(crate) fn plain_https_client() -> Result<PlainClient> {
    let mut root_store = rustls::RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    root_store.add_parsable_certificates(native.certs);
    if root_store.is_empty() {
        return Err(Error::Tls("no valid system certificates found".to_string()));
    }
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let https_connector = HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .build();

    Ok(Client::builder(TokioExecutor::new()).build(https_connector))
}

/// Outcome of a conditional fetch. "Not modified" is a valid terminal state,
/// not an error: the caller's cached copy remains authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Fresh(T),
    NotModified,
}

impl<T> FetchOutcome<T> {
    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::NotModified)
    }

    pub fn into_fresh(self) -> Option<T> {
        match self {
            Self::Fresh(value) => Some(value),
            Self::NotModified => None,
        }
    }
}

/// The sole inbound data source for the crate. One method per remote
/// operation; conditional reads return [`FetchOutcome`], plain writes return
/// the service's echo of the entity.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn list_tasklists(
        &self,
        max_results: Option<i64>,
        page_token: Option<&str>,
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome<TaskListPage>>;

    async fn get_tasklist(
        &self,
        tasklist_id: &str,
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome<TaskList>>;

    async fn insert_tasklist(&self, list: &TaskList) -> Result<TaskList>;
    async fn update_tasklist(&self, list: &TaskList) -> Result<TaskList>;
    async fn patch_tasklist(&self, list: &TaskList) -> Result<TaskList>;
    async fn delete_tasklist(&self, tasklist_id: &str) -> Result<()>;

    async fn list_tasks(
        &self,
        tasklist_id: &str,
        query: &ListTasksQuery,
    ) -> Result<FetchOutcome<TaskPage>>;

    async fn get_task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome<Task>>;

    async fn insert_task(
        &self,
        tasklist_id: &str,
        task: &Task,
        parent: Option<&str>,
        previous: Option<&str>,
    ) -> Result<Task>;

    async fn update_task(&self, tasklist_id: &str, task: &Task) -> Result<Task>;
    async fn patch_task(&self, tasklist_id: &str, task: &Task) -> Result<Task>;
    async fn delete_task(&self, tasklist_id: &str, task_id: &str) -> Result<()>;

    async fn move_task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        parent: Option<&str>,
        previous: Option<&str>,
    ) -> Result<Task>;

    async fn clear_tasks(&self, tasklist_id: &str) -> Result<()>;
}

/// REST transport over rustls with a bearer credential attached to every
/// request. Cheap to clone; holds no mutable state.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: AuthorizedClient,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(credential: &AccessHandle) -> Result<Self> {
        Self::with_base_url(credential, DEFAULT_BASE_URL)
    }

    /// Same as [`Self::new`] but aimed at an explicit service root, e.g. a
    /// mock server in tests. The root should end with a slash so relative
    /// paths resolve under it.
    pub fn with_base_url(credential: &AccessHandle, base_url: &str) -> Result<Self> {
        let client = AddAuthorization::bearer(plain_https_client()?, credential.access_token());
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn build_request(
        method: Method,
        url: &Url,
        if_none_match: Option<&str>,
        json_body: Option<String>,
    ) -> Result<Request<String>> {
        let mut builder = Request::builder().method(method).uri(url.as_str());
        if let Some(tag) = if_none_match
            && !tag.is_empty()
        {
            builder = builder.header(http::header::IF_NONE_MATCH, tag);
        }
        let body = match json_body {
            Some(json) => {
                builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                json
            }
            None => String::new(),
        };
        Ok(builder.body(body)?)
    }

    /// Sends the request and returns the raw body, mapping 304 to
    /// `NotModified` and any other non-success status to [`Error::Status`].
    async fn execute(&self, request: Request<String>) -> Result<FetchOutcome<Vec<u8>>> {
        log::debug!("{} {}", request.method(), request.uri());
        let response = self.client.clone().oneshot(request).await?;
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await?.to_bytes();

        if parts.status == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        if !parts.status.is_success() {
            return Err(Error::Status {
                status: parts.status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(FetchOutcome::Fresh(bytes.to_vec()))
    }

    /// Like [`Self::execute`] for requests that carried no precondition tag;
    /// an unsolicited 304 is treated as a remote error.
    async fn execute_fresh(&self, request: Request<String>) -> Result<Vec<u8>> {
        match self.execute(request).await? {
            FetchOutcome::Fresh(bytes) => Ok(bytes),
            FetchOutcome::NotModified => Err(Error::Status {
                status: StatusCode::NOT_MODIFIED,
                body: String::new(),
            }),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome<T>> {
        let request = Self::build_request(Method::GET, url, if_none_match, None)?;
        match self.execute(request).await? {
            FetchOutcome::Fresh(bytes) => Ok(FetchOutcome::Fresh(serde_json::from_slice(&bytes)?)),
            FetchOutcome::NotModified => Ok(FetchOutcome::NotModified),
        }
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        url: &Url,
        body: Option<String>,
    ) -> Result<T> {
        let request = Self::build_request(method, url, None, body)?;
        let bytes = self.execute_fresh(request).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

// Skips the pair serializer entirely when there is nothing to append, so
// bare URLs stay free of a trailing '?'.
fn append_pairs(url: &mut Url, pairs: &[(&str, String)]) {
    if pairs.is_empty() {
        return;
    }
    let mut serializer = url.query_pairs_mut();
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
}

fn append_placement(url: &mut Url, parent: Option<&str>, previous: Option<&str>) {
    let mut pairs = Vec::new();
    if let Some(parent) = parent {
        pairs.push(("parent", parent.to_string()));
    }
    if let Some(previous) = previous {
        pairs.push(("previous", previous.to_string()));
    }
    append_pairs(url, &pairs);
}

#[async_trait]
impl Transport for HttpTransport {
    async fn list_tasklists(
        &self,
        max_results: Option<i64>,
        page_token: Option<&str>,
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome<TaskListPage>> {
        let mut url = self.endpoint("users/@me/lists")?;
        let mut pairs = Vec::new();
        if let Some(n) = max_results {
            pairs.push(("maxResults", n.to_string()));
        }
        if let Some(token) = page_token {
            pairs.push(("pageToken", token.to_string()));
        }
        append_pairs(&mut url, &pairs);
        self.get_json(&url, if_none_match).await
    }

    async fn get_tasklist(
        &self,
        tasklist_id: &str,
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome<TaskList>> {
        let url = self.endpoint(&format!("users/@me/lists/{tasklist_id}"))?;
        self.get_json(&url, if_none_match).await
    }

    async fn insert_tasklist(&self, list: &TaskList) -> Result<TaskList> {
        let url = self.endpoint("users/@me/lists")?;
        self.send_json(Method::POST, &url, Some(serde_json::to_string(list)?))
            .await
    }

    async fn update_tasklist(&self, list: &TaskList) -> Result<TaskList> {
        let url = self.endpoint(&format!("users/@me/lists/{}", list.id))?;
        self.send_json(Method::PUT, &url, Some(serde_json::to_string(list)?))
            .await
    }

    async fn patch_tasklist(&self, list: &TaskList) -> Result<TaskList> {
        let url = self.endpoint(&format!("users/@me/lists/{}", list.id))?;
        self.send_json(Method::PATCH, &url, Some(serde_json::to_string(list)?))
            .await
    }

    async fn delete_tasklist(&self, tasklist_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("users/@me/lists/{tasklist_id}"))?;
        let request = Self::build_request(Method::DELETE, &url, None, None)?;
        self.execute_fresh(request).await?;
        Ok(())
    }

    async fn list_tasks(
        &self,
        tasklist_id: &str,
        query: &ListTasksQuery,
    ) -> Result<FetchOutcome<TaskPage>> {
        let mut url = self.endpoint(&format!("lists/{tasklist_id}/tasks"))?;
        append_pairs(&mut url, &query.query_pairs());
        self.get_json(&url, query.if_none_match.as_deref()).await
    }

    async fn get_task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome<Task>> {
        let url = self.endpoint(&format!("lists/{tasklist_id}/tasks/{task_id}"))?;
        self.get_json(&url, if_none_match).await
    }

    async fn insert_task(
        &self,
        tasklist_id: &str,
        task: &Task,
        parent: Option<&str>,
        previous: Option<&str>,
    ) -> Result<Task> {
        let mut url = self.endpoint(&format!("lists/{tasklist_id}/tasks"))?;
        append_placement(&mut url, parent, previous);
        self.send_json(Method::POST, &url, Some(serde_json::to_string(task)?))
            .await
    }

    async fn update_task(&self, tasklist_id: &str, task: &Task) -> Result<Task> {
        let url = self.endpoint(&format!("lists/{tasklist_id}/tasks/{}", task.id))?;
        self.send_json(Method::PUT, &url, Some(serde_json::to_string(task)?))
            .await
    }

    async fn patch_task(&self, tasklist_id: &str, task: &Task) -> Result<Task> {
        let url = self.endpoint(&format!("lists/{tasklist_id}/tasks/{}", task.id))?;
        self.send_json(Method::PATCH, &url, Some(serde_json::to_string(task)?))
            .await
    }

    async fn delete_task(&self, tasklist_id: &str, task_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("lists/{tasklist_id}/tasks/{task_id}"))?;
        let request = Self::build_request(Method::DELETE, &url, None, None)?;
        self.execute_fresh(request).await?;
        Ok(())
    }

    async fn move_task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        parent: Option<&str>,
        previous: Option<&str>,
    ) -> Result<Task> {
        let mut url = self.endpoint(&format!("lists/{tasklist_id}/tasks/{task_id}/move"))?;
        append_placement(&mut url, parent, previous);
        self.send_json(Method::POST, &url, None).await
    }

    async fn clear_tasks(&self, tasklist_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("lists/{tasklist_id}/clear"))?;
        let request = Self::build_request(Method::POST, &url, None, None)?;
        self.execute_fresh(request).await?;
        Ok(())
    }
}
