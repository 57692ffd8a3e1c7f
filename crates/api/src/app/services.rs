//! Infrastructure wiring: picks in-memory or Postgres collaborators and
//! assembles the services the handlers share.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::{info, warn};

use rolegate_infra::{
    AccountService, InMemoryDirectory, InMemoryIdentityProvider, InMemorySessionStore,
    PostgresDirectory, PostgresIdentityProvider, SessionStore, SignupError, StoreError,
};

use crate::config::ApiConfig;
use crate::cookies::CookiePolicy;

#[derive(Debug, Error)]
pub enum ServiceInitError {
    #[error("could not connect to Postgres: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("could not prepare schema: {0}")]
    Schema(#[from] StoreError),

    #[error("could not seed bootstrap admin: {0}")]
    Bootstrap(#[from] SignupError),
}

#[derive(Clone)]
pub struct AppServices {
    pub accounts: AccountService,
    pub sessions: Arc<dyn SessionStore>,
    pub cookies: CookiePolicy,
}

impl AppServices {
    /// Everything in process memory (dev/test).
    pub fn in_memory(config: &ApiConfig) -> Self {
        let identity = Arc::new(InMemoryIdentityProvider::new(config.public_url.clone()));
        let directory = Arc::new(InMemoryDirectory::new());
        Self::assemble(config, AccountService::new(identity, directory, config.session_ttl))
    }

    /// Identity and directory in Postgres; sessions stay in memory.
    pub async fn postgres(config: &ApiConfig, database_url: &str) -> Result<Self, ServiceInitError> {
        let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;

        let directory = PostgresDirectory::new(pool.clone());
        directory.ensure_schema().await?;
        let identity = PostgresIdentityProvider::new(pool, config.public_url.clone());

        Ok(Self::assemble(
            config,
            AccountService::new(Arc::new(identity), Arc::new(directory), config.session_ttl),
        ))
    }

    fn assemble(config: &ApiConfig, accounts: AccountService) -> Self {
        Self {
            accounts,
            sessions: Arc::new(InMemorySessionStore::new()),
            cookies: CookiePolicy {
                secure: config.cookie_secure,
                session_ttl: config.session_ttl,
            },
        }
    }
}

pub async fn build_services(config: &ApiConfig) -> Result<AppServices, ServiceInitError> {
    let services = match &config.database_url {
        Some(url) => {
            info!("using Postgres directory");
            AppServices::postgres(config, url).await?
        }
        None => {
            warn!("DATABASE_URL not set; accounts are kept in memory and lost on restart");
            AppServices::in_memory(config)
        }
    };

    bootstrap(&services, config).await?;
    Ok(services)
}

/// Seed the configured admin, if any. Safe to run on every start.
pub async fn bootstrap(services: &AppServices, config: &ApiConfig) -> Result<(), ServiceInitError> {
    if let Some(admin) = &config.bootstrap_admin {
        services
            .accounts
            .bootstrap_admin(&admin.email, &admin.password)
            .await?;
    }
    Ok(())
}
