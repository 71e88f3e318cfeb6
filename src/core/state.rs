// Application state (AppState)

use crate::auth::token::TokenSigner;
use crate::core::config::Config;
use crate::metrics::collector::Metrics;
use crate::notify::mailer::Mailer;
use crate::stores::{
    catalog_store::CatalogStore, review_store::ReviewStore, user_store::UserStore,
};
use crate::wal::wal::{Wal, WalOperation};
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,

    pub catalog: Arc<CatalogStore>,

    pub reviews: Arc<ReviewStore>,

    /// Signs and verifies sliding-expiry access tokens.
    pub tokens: Arc<TokenSigner>,

    /// Outbound mail collaborator for confirmation codes.
    pub mailer: Arc<Mailer>,

    pub metrics: Arc<Metrics>,

    /// Write-Ahead Log for persistence.
    pub wal: Arc<Wal>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, wal: Wal) -> Result<Self> {
        let tokens = Arc::new(TokenSigner::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_lifetime,
        ));
        let mailer = Arc::new(Mailer::new(&config.mail)?);

        Ok(Self {
            users: Arc::new(UserStore::new()),
            catalog: Arc::new(CatalogStore::new()),
            reviews: Arc::new(ReviewStore::new()),
            tokens,
            mailer,
            metrics: Arc::new(Metrics::new()),
            wal: Arc::new(wal),
            config: Arc::new(config),
        })
    }

    /// Append a mutation to the WAL. A write failure is logged and does
    /// not fail the request; the in-memory stores are already updated.
    pub fn record(&self, op: WalOperation) {
        if let Err(e) = self.wal.log_operation(op) {
            warn!(error = %e, "Failed to log operation to WAL");
        }
    }
}
