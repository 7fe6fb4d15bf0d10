//! Client authorization for cursor operations
//!
//! Cursor reads, commits and resets require the caller to be allowed to read
//! every event type of the subscription. A [`Client`] represents the caller
//! as authenticated by the outer request layer.
//!
//! ## Scope semantics
//!
//! An event type lists the scopes that grant read access. A client passes the
//! check if it holds at least one of them; an empty list grants everyone.

use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::error::{Result, StreamlineError};

/// Authenticated caller
pub trait Client: Send + Sync + Debug {
    fn client_id(&self) -> &str;

    /// Fails with `IllegalScope(required)` when the client holds none of `required`
    fn check_scopes(&self, required: &BTreeSet<String>) -> Result<()>;
}

/// Client carrying an explicit scope set
#[derive(Debug, Clone)]
pub struct ScopedClient {
    client_id: String,
    scopes: BTreeSet<String>,
}

impl ScopedClient {
    pub fn new<I, S>(client_id: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            client_id: client_id.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }
}

impl Client for ScopedClient {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn check_scopes(&self, required: &BTreeSet<String>) -> Result<()> {
        if required.is_empty() || !required.is_disjoint(&self.scopes) {
            Ok(())
        } else {
            Err(StreamlineError::IllegalScope(required.clone()))
        }
    }
}

/// Trusted internal caller; passes every scope check
#[derive(Debug, Clone)]
pub struct FullAccessClient {
    client_id: String,
}

impl FullAccessClient {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }
}

impl Default for FullAccessClient {
    fn default() -> Self {
        Self::new("internal")
    }
}

impl Client for FullAccessClient {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn check_scopes(&self, _required: &BTreeSet<String>) -> Result<()> {
        Ok(())
    }
}
