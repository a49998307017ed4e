//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{Clock, PasswordService, TokenService};
use blogicum_core::{BlogService, Repositories};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService, SystemClock};

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use blogicum_infra::{DatabaseConnections, postgres_repositories};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state, falling back to the in-memory store when
    /// no database is configured or reachable.
    pub async fn new(config: &AppConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        #[cfg(feature = "postgres")]
        let (db, repos) = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let repos = postgres_repositories(connections.main.clone());
                    (Some(Arc::new(connections)), repos)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory store.",
                        e
                    );
                    (None, in_memory(clock.clone()))
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
                (None, in_memory(clock.clone()))
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repos = {
            if config.database.is_some() {
                tracing::warn!("Built without postgres support; DATABASE_URL is ignored.");
            }
            in_memory(clock.clone())
        };

        let state = Self::from_parts(
            repos,
            clock,
            config.posts_per_page,
            Arc::new(JwtTokenService::from_env()),
        );

        tracing::info!(
            posts_per_page = config.posts_per_page,
            "Application state initialized"
        );

        #[cfg(feature = "postgres")]
        let state = Self { db, ..state };
        state
    }

    /// State over explicit repositories, without a database handle.
    pub fn from_parts(
        repos: Repositories,
        clock: Arc<dyn Clock>,
        posts_per_page: u64,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            blog: Arc::new(BlogService::new(repos, clock).with_page_size(posts_per_page)),
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Name of the backing store, reported by the health probe.
    pub fn storage(&self) -> &'static str {
        #[cfg(feature = "postgres")]
        let connected = self.db.is_some();
        #[cfg(not(feature = "postgres"))]
        let connected = false;

        if connected { "postgres" } else { "memory" }
    }
}

fn in_memory(clock: Arc<dyn Clock>) -> Repositories {
    Arc::new(InMemoryStore::with_clock(clock)).repositories()
}
