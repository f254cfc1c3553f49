// File: ./src/client/core.rs
//! High-level operations over the transport seam, including the list-query
//! post-processing: shape the request, fetch one flat page, filter, sort,
//! and raise the parent/child tree.
use crate::client::auth::AccessHandle;
use crate::client::query::{Filter, ListTasksQuery, Sort};
use crate::client::transport::{FetchOutcome, HttpTransport, Transport};
use crate::error::{Error, Result};
use crate::model::{Task, TaskCollection, TaskList, TaskListPage, TaskPage, pipeline};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use http::StatusCode;

/// Entry point for a remote-service session. Generic over [`Transport`] so
/// tests can substitute the wire; production code uses [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct TasqClient<T = HttpTransport> {
    transport: T,
}

impl TasqClient<HttpTransport> {
    pub fn new(credential: &AccessHandle) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(credential)?,
        })
    }

    pub fn with_base_url(credential: &AccessHandle, base_url: &str) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::with_base_url(credential, base_url)?,
        })
    }
}

// A 304 answered to a request that carried no entity tag.
fn unsolicited_not_modified() -> Error {
    Error::Status {
        status: StatusCode::NOT_MODIFIED,
        body: String::new(),
    }
}

/// Runs one flat page through the local stages. A single owned vector flows
/// filter → sort → hierarchy; the raised tree is built from exactly the
/// sequence the earlier stages produced.
fn post_process(page: TaskPage, filter: Option<Filter>, sort: Option<Sort>) -> Result<TaskCollection> {
    let TaskPage {
        etag,
        items,
        next_page_token,
    } = page;

    let mut flat = items;
    // The server-side visibility flags only widen the page; narrowing to the
    // exact status happens here.
    if let Some(status) = filter.and_then(Filter::status) {
        flat = pipeline::status_filter(flat, status);
    }
    match sort {
        Some(Sort::Position) => pipeline::positional_sort(&mut flat),
        Some(Sort::LatestFirst) => pipeline::chronological_sort(&mut flat)?,
        Some(Sort::OldestFirst) => pipeline::reverse_chronological_sort(&mut flat)?,
        None => {}
    }
    let (items, orphans) = pipeline::raise_tasks(flat);

    Ok(TaskCollection {
        etag,
        items,
        orphans,
        next_page_token,
    })
}

impl<T: Transport> TasqClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // --- TASK LISTS ---

    pub async fn tasklists(&self) -> Result<TaskListPage> {
        match self.transport.list_tasklists(None, None, None).await? {
            FetchOutcome::Fresh(page) => Ok(page),
            // No precondition tag was sent, so a 304 is a protocol violation.
            FetchOutcome::NotModified => Err(unsolicited_not_modified()),
        }
    }

    /// Fetches a single list, optionally under an entity-tag precondition.
    pub async fn tasklist(
        &self,
        tasklist_id: &str,
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome<TaskList>> {
        self.transport.get_tasklist(tasklist_id, if_none_match).await
    }

    pub async fn create_tasklist(&self, list: &TaskList) -> Result<TaskList> {
        self.transport.insert_tasklist(list).await
    }

    pub async fn update_tasklist(&self, list: &TaskList) -> Result<TaskList> {
        self.transport.update_tasklist(list).await
    }

    pub async fn patch_tasklist(&self, list: &TaskList) -> Result<TaskList> {
        self.transport.patch_tasklist(list).await
    }

    pub async fn delete_tasklist(&self, tasklist_id: &str) -> Result<()> {
        self.transport.delete_tasklist(tasklist_id).await
    }

    /// Refetches `list` with its entity tag as a precondition. On 304 the
    /// entity is left untouched and `false` comes back; otherwise the record
    /// is swapped wholesale (new entity tag included) and `true` comes back.
    pub async fn refresh_tasklist(&self, list: &mut TaskList) -> Result<bool> {
        match self
            .transport
            .get_tasklist(&list.id, Some(&list.etag))
            .await?
        {
            FetchOutcome::Fresh(fresh) => {
                *list = fresh;
                Ok(true)
            }
            FetchOutcome::NotModified => Ok(false),
        }
    }

    // --- TASKS ---

    /// Fetches one page of `tasklist_id` and post-processes it: `filter`
    /// narrows by logical status (with `Overdue` bounded server-side at
    /// request time), `sort` orders the flat page, and the result is raised
    /// into a parent/child tree.
    pub async fn list(
        &self,
        tasklist_id: &str,
        filter: Option<Filter>,
        sort: Option<Sort>,
    ) -> Result<TaskCollection> {
        match self
            .list_conditional(tasklist_id, ListTasksQuery::default(), filter, sort)
            .await?
        {
            FetchOutcome::Fresh(collection) => Ok(collection),
            // No precondition tag was in the query, so a 304 is a protocol
            // violation.
            FetchOutcome::NotModified => Err(unsolicited_not_modified()),
        }
    }

    /// Like [`Self::list`] but with full control over the outbound
    /// parameters, including the `if_none_match` precondition. A logical
    /// filter is folded into `query` on top of whatever is already set.
    pub async fn list_conditional(
        &self,
        tasklist_id: &str,
        mut query: ListTasksQuery,
        filter: Option<Filter>,
        sort: Option<Sort>,
    ) -> Result<FetchOutcome<TaskCollection>> {
        if let Some(f) = filter {
            query.apply_filter(f, Utc::now());
        }
        match self.transport.list_tasks(tasklist_id, &query).await? {
            FetchOutcome::Fresh(page) => Ok(FetchOutcome::Fresh(post_process(page, filter, sort)?)),
            FetchOutcome::NotModified => Ok(FetchOutcome::NotModified),
        }
    }

    /// Conditionally refetches a collection. On 304 the existing collection
    /// is left untouched and `false` comes back; a fresh page replaces it
    /// wholesale after running the same post-processing it was built with.
    pub async fn refresh_collection(
        &self,
        tasklist_id: &str,
        collection: &mut TaskCollection,
        filter: Option<Filter>,
        sort: Option<Sort>,
    ) -> Result<bool> {
        let query = ListTasksQuery {
            if_none_match: Some(collection.etag.clone()),
            ..ListTasksQuery::default()
        };
        match self
            .list_conditional(tasklist_id, query, filter, sort)
            .await?
        {
            FetchOutcome::Fresh(fresh) => {
                *collection = fresh;
                Ok(true)
            }
            FetchOutcome::NotModified => Ok(false),
        }
    }

    /// Fetches a single task, optionally under an entity-tag precondition.
    pub async fn task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome<Task>> {
        self.transport
            .get_task(tasklist_id, task_id, if_none_match)
            .await
    }

    /// Single-item counterpart of [`Self::refresh_tasklist`].
    pub async fn refresh_task(&self, tasklist_id: &str, task: &mut Task) -> Result<bool> {
        match self
            .transport
            .get_task(tasklist_id, &task.id, Some(&task.etag))
            .await?
        {
            FetchOutcome::Fresh(fresh) => {
                *task = fresh;
                Ok(true)
            }
            FetchOutcome::NotModified => Ok(false),
        }
    }

    pub async fn create_task(
        &self,
        tasklist_id: &str,
        task: &Task,
        parent: Option<&str>,
        previous: Option<&str>,
    ) -> Result<Task> {
        self.transport
            .insert_task(tasklist_id, task, parent, previous)
            .await
    }

    pub async fn update_task(&self, tasklist_id: &str, task: &Task) -> Result<Task> {
        self.transport.update_task(tasklist_id, task).await
    }

    pub async fn patch_task(&self, tasklist_id: &str, task: &Task) -> Result<Task> {
        self.transport.patch_task(tasklist_id, task).await
    }

    pub async fn delete_task(&self, tasklist_id: &str, task_id: &str) -> Result<()> {
        self.transport.delete_task(tasklist_id, task_id).await
    }

    /// Reparents the task under `parent`, or places it after `previous`
    /// among its siblings. With neither, the task moves to the beginning of
    /// its sibling sequence.
    pub async fn move_task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        parent: Option<&str>,
        previous: Option<&str>,
    ) -> Result<Task> {
        self.transport
            .move_task(tasklist_id, task_id, parent, previous)
            .await
    }

    /// Clears completed tasks from the list.
    pub async fn clear_tasks(&self, tasklist_id: &str) -> Result<()> {
        self.transport.clear_tasks(tasklist_id).await
    }

    /// Fetches every list in `lists`, a few in flight at a time. Each result
    /// is an independent snapshot; an error on any list aborts the whole
    /// call.
    pub async fn all_tasks(
        &self,
        lists: &[TaskList],
        filter: Option<Filter>,
        sort: Option<Sort>,
    ) -> Result<Vec<(String, TaskCollection)>> {
        let futures = lists.iter().map(|list| {
            let id = list.id.clone();
            async move {
                let res = self.list(&id, filter, sort).await;
                (id, res)
            }
        });

        let mut stream = stream::iter(futures).buffer_unordered(4);
        let mut results = Vec::new();
        while let Some((id, res)) = stream.next().await {
            results.push((id, res?));
        }
        Ok(results)
    }
}
