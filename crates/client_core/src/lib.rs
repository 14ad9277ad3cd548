use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::domain::{Post, PostId};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod error;

pub use error::{FailureKind, StoreError};

/// Base URL of the public test API the client talks to out of the box.
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";

const FETCH_CANCEL_REASON: &str = "User cancelled operation";

/// Capability contract for the remote post collection.
///
/// One request per call, no retries. Every failure comes back already
/// classified as a [`StoreError`].
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fetch the whole collection. Cooperative: if `cancel` fires before the
    /// request settles, the call resolves to [`StoreError::Cancelled`] and
    /// the in-flight request is dropped.
    async fn list_posts(&self, cancel: &CancellationToken) -> Result<Vec<Post>, StoreError>;

    /// Create a post from a draft; the server assigns the id and echoes the
    /// stored entity back.
    async fn create_post(&self, draft: &Post) -> Result<Post, StoreError>;

    /// Replace the post with the given id.
    async fn update_post(&self, id: PostId, draft: &Post) -> Result<(), StoreError>;

    /// Delete the post with the given id.
    async fn delete_post(&self, id: PostId) -> Result<(), StoreError>;
}

/// Reqwest-backed [`PostStore`] for a jsonplaceholder-style REST API.
pub struct RemotePostStore {
    http: Client,
    api_url: String,
}

impl RemotePostStore {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
        }
    }

    /// Like [`RemotePostStore::new`], with a client-side deadline after which
    /// requests settle as [`StoreError::Timeout`].
    pub fn with_timeout(
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
        })
    }

    async fn fetch_all(&self) -> Result<Vec<Post>, StoreError> {
        let posts: Vec<Post> = self
            .http
            .get(format!("{}/posts", self.api_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(posts)
    }
}

#[async_trait]
impl PostStore for RemotePostStore {
    async fn list_posts(&self, cancel: &CancellationToken) -> Result<Vec<Post>, StoreError> {
        // Dropping the fetch future aborts the underlying request, so a
        // cancelled call stops occupying the connection.
        tokio::select! {
            () = cancel.cancelled() => Err(StoreError::Cancelled),
            result = self.fetch_all() => result,
        }
    }

    async fn create_post(&self, draft: &Post) -> Result<Post, StoreError> {
        let created: Post = self
            .http
            .post(format!("{}/posts", self.api_url))
            .json(draft)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(created)
    }

    async fn update_post(&self, id: PostId, draft: &Post) -> Result<(), StoreError> {
        self.http
            .put(format!("{}/posts/{}", self.api_url, id.0))
            .json(draft)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), StoreError> {
        self.http
            .delete(format!("{}/posts/{}", self.api_url, id.0))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Lifecycle of the one-shot initial fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    InFlight,
    Succeeded,
    Cancelled,
    Failed(FailureKind),
}

impl FetchState {
    /// The fetch has settled and will never run again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, FetchState::Idle | FetchState::InFlight)
    }
}

/// Owns the post list, the edit draft, and the initial-fetch lifecycle, and
/// mediates every mutation between a frontend and the remote store.
///
/// All methods take `&mut self`; a frontend drives the controller from a
/// single task and no internal locking is needed. To cancel the initial
/// fetch while [`PostListController::initialize`] is pending, grab
/// [`PostListController::cancel_handle`] before starting it.
pub struct PostListController<S = RemotePostStore> {
    store: S,
    posts: Vec<Post>,
    draft: Post,
    fetch: FetchState,
    error: Option<String>,
    cancel: CancellationToken,
}

impl<S: PostStore> PostListController<S> {
    /// The cancellation token is minted here, once; `initialize` reuses it
    /// rather than creating its own.
    pub fn new(store: S) -> Self {
        Self {
            store,
            posts: Vec::new(),
            draft: Post::empty_draft(),
            fetch: FetchState::Idle,
            error: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn draft(&self) -> &Post {
        &self.draft
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch
    }

    pub fn is_loading(&self) -> bool {
        self.fetch == FetchState::InFlight
    }

    /// The message for the most recent failed operation, cleared by the next
    /// successful save or delete. `None` after a clean run.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Clone of the fetch cancellation token, for frontends that need to
    /// cancel while `initialize` is pending.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Issue the one-shot list fetch. Runs at most once per controller; any
    /// later call logs and returns without touching state.
    pub async fn initialize(&mut self) {
        if self.fetch != FetchState::Idle {
            warn!(state = ?self.fetch, "initialize called again; ignoring");
            return;
        }
        self.fetch = FetchState::InFlight;
        info!("fetching post list");
        let cancel = self.cancel.clone();
        match self.store.list_posts(&cancel).await {
            Ok(posts) => {
                info!(count = posts.len(), "post list loaded");
                self.posts = posts;
                self.fetch = FetchState::Succeeded;
            }
            Err(StoreError::Cancelled) => {
                info!("initial fetch cancelled");
                self.error = Some(StoreError::Cancelled.to_string());
                self.fetch = FetchState::Cancelled;
            }
            Err(err) => {
                warn!("initial fetch failed: {err}");
                self.fetch = FetchState::Failed(err.kind());
                self.error = Some(err.to_string());
            }
        }
    }

    /// Cancel the initial fetch. Works before and during the request; once
    /// the fetch has settled this is a no-op.
    pub fn cancel_initial_fetch(&self) {
        if self.fetch.is_terminal() {
            return;
        }
        info!(reason = FETCH_CANCEL_REASON, "cancelling initial fetch");
        self.cancel.cancel();
    }

    pub fn set_draft_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_draft_body(&mut self, body: impl Into<String>) {
        self.draft.body = body.into();
    }

    /// Load an existing post into the edit form, replacing the draft
    /// wholesale.
    pub fn select_for_edit(&mut self, post: Post) {
        self.draft = post;
    }

    /// Persist the draft: update when it carries an id, create otherwise.
    ///
    /// A successful update moves the post to the end of the list and resets
    /// the draft; a successful create appends the server's echo and leaves
    /// the draft as typed.
    pub async fn save(&mut self) {
        match self.draft.id {
            Some(id) => match self.store.update_post(id, &self.draft).await {
                Ok(()) => {
                    let updated = std::mem::replace(&mut self.draft, Post::empty_draft());
                    self.posts.retain(|post| post.id != Some(id));
                    self.posts.push(updated);
                    self.error = None;
                    info!(post_id = id.0, "post updated");
                }
                Err(err) => self.record_failure("update", err),
            },
            None => match self.store.create_post(&self.draft).await {
                Ok(created) => {
                    info!(post_id = ?created.id, "post created");
                    self.posts.push(created);
                    self.error = None;
                }
                Err(err) => self.record_failure("create", err),
            },
        }
    }

    /// Delete a post remotely, then drop every local entry with its id.
    /// Posts that were never persisted have nothing to delete.
    pub async fn delete(&mut self, post: &Post) {
        let Some(id) = post.id else {
            warn!("delete requested for a post that was never persisted");
            return;
        };
        match self.store.delete_post(id).await {
            Ok(()) => {
                self.posts.retain(|post| post.id != Some(id));
                self.error = None;
                info!(post_id = id.0, "post deleted");
            }
            Err(err) => self.record_failure("delete", err),
        }
    }

    fn record_failure(&mut self, operation: &str, err: StoreError) {
        warn!(operation, "remote post operation failed: {err}");
        self.error = Some(err.to_string());
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
