//! Fetch session state, guarded by request tokens.
//!
//! Every submission gets a fresh, monotonically increasing [`RequestToken`].
//! A finished fetch only updates the state when its token is still the most
//! recent one, so a slow earlier request can never overwrite the result of a
//! later one.

use anyhow::Result;
use log::{debug, warn};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::input::{FetchForm, FetchRequest, InputError};
use crate::pagination::{Collection, Paginator};
use crate::provider::{Release, ReleaseSource};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Init,
    Loading,
    Success(Vec<Release>),
    /// Human-readable cause of the failure.
    Error(String),
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Init => "init",
            SessionState::Loading => "loading",
            SessionState::Success(_) => "success",
            SessionState::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Session {
    latest: AtomicU64,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.lock().clone()
    }

    /// Validate the form and, if it is valid, start a new request.
    /// An invalid form leaves the state untouched.
    pub fn submit(&self, form: &FetchForm) -> Result<(RequestToken, FetchRequest), InputError> {
        let request = form.validate()?;
        Ok((self.begin(), request))
    }

    /// Issue the next token and move to `Loading`.
    pub fn begin(&self) -> RequestToken {
        let mut state = self.lock();
        let token = RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        *state = SessionState::Loading;
        debug!("Started request #{}", token.0);
        token
    }

    /// Apply a finished fetch. Returns false (and changes nothing) when a
    /// newer request has been issued since `token`.
    pub fn complete(&self, token: RequestToken, result: Result<Collection>) -> bool {
        let mut state = self.lock();
        let latest = self.latest.load(Ordering::SeqCst);
        if token.0 != latest {
            debug!(
                "Discarding result of request #{}, latest is #{}",
                token.0, latest
            );
            return false;
        }

        *state = match result {
            Ok(collection) => SessionState::Success(collection.releases),
            Err(e) => {
                warn!("Request #{} failed: {:#}", token.0, e);
                SessionState::Error(format!("{:#}", e))
            }
        };
        true
    }

    /// Submit, fetch and complete in one go.
    #[tracing::instrument(skip(self, source, form))]
    pub async fn run<S: ReleaseSource + ?Sized>(
        &self,
        source: &S,
        form: &FetchForm,
    ) -> Result<RequestToken, InputError> {
        let (token, request) = self.submit(form)?;
        let result = Paginator::new(source)
            .collect(&request.repo, request.per_page, &request.criteria)
            .await;
        self.complete(token, result);
        Ok(token)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
