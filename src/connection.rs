//! Connection to a store: owns the store handle and the one-shot auth gate
//!
//! On open a watcher task follows the store's auth stream. A signed-out
//! event submits the configured credentials; the first signed-in event
//! opens the gate for good. Statements issued before that wait on the gate.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::executor::{QueryExecutor, QueryResult};
use crate::parser::{parse_statement, Statement};
use crate::storage::{Credentials, Store};
use crate::types::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    PendingAuth,
    Ready,
}

pub struct Connection {
    store: Arc<dyn Store>,
    state: watch::Receiver<SessionState>,
    watcher: JoinHandle<()>,
}

impl Connection {
    /// Start watching the store's auth stream; does not wait for readiness
    ///
    /// # Panics
    ///
    /// Spawns the watcher with `tokio::spawn`, so it must be called from
    /// within a Tokio runtime.
    pub fn open(store: Arc<dyn Store>, credentials: Credentials) -> Self {
        let (tx, state) = watch::channel(SessionState::PendingAuth);
        let watcher = tokio::spawn(Self::watch_auth(Arc::clone(&store), credentials, tx));
        Self { store, state, watcher }
    }

    async fn watch_auth(store: Arc<dyn Store>, credentials: Credentials, tx: watch::Sender<SessionState>) {
        let mut auth = store.auth_state_changes();
        loop {
            let signed_in = *auth.borrow_and_update();
            if signed_in {
                info!("Store authenticated, connection ready");
                tx.send_replace(SessionState::Ready);
                return;
            }

            debug!(email = %credentials.email, "Signed out, submitting credentials");
            if let Err(e) = store.authenticate(&credentials).await {
                warn!(error = %e, "Credential submission failed");
            }

            if auth.changed().await.is_err() {
                debug!("Auth stream closed before sign-in");
                return;
            }
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait until the store has authenticated once
    pub async fn ready(&self) -> Result<(), DatabaseError> {
        let mut state = self.state.clone();
        state
            .wait_for(|s| *s == SessionState::Ready)
            .await
            .map(|_| ())
            .map_err(|_| DatabaseError::ConnectionClosed)
    }

    pub async fn execute(&self, stmt: Statement) -> Result<QueryResult, DatabaseError> {
        self.ready().await?;
        QueryExecutor::execute(&self.store, stmt).await
    }

    /// Parse and execute one SQL statement
    pub async fn query(&self, sql: &str) -> Result<QueryResult, DatabaseError> {
        let stmt = parse_statement(sql)?;
        self.execute(stmt).await
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Stop the auth watcher and release the store
    pub async fn close(self) -> Result<(), DatabaseError> {
        self.watcher.abort();
        self.store.disconnect().await?;
        info!("Connection closed");
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}
