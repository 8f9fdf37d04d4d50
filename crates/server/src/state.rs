//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::payments::{RazorpayClient, StripeClient};
use crate::services::catalog::CatalogService;
use crate::services::email::{EmailService, NotificationQueue};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration. It is
/// constructed once at startup and injected everywhere; nothing here is a
/// module-level singleton.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    stripe: StripeClient,
    razorpay: RazorpayClient,
    catalog: CatalogService,
    notifications: NotificationQueue,
}

impl AppState {
    /// Create a new application state, wiring the provider clients and
    /// spawning the notification worker.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let stripe = StripeClient::new(config.stripe.secret_key.clone());
        let razorpay = RazorpayClient::new(
            config.razorpay.key_id.clone(),
            config.razorpay.key_secret.clone(),
        );
        let catalog = CatalogService::new();

        let mailer = config.email.as_ref().and_then(|email_config| {
            match EmailService::new(email_config) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::warn!(error = %e, "Email misconfigured, notifications disabled");
                    None
                }
            }
        });
        let notifications = NotificationQueue::spawn(mailer);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stripe,
                razorpay,
                catalog,
                notifications,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Stripe client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Get a reference to the Razorpay client.
    #[must_use]
    pub fn razorpay(&self) -> &RazorpayClient {
        &self.inner.razorpay
    }

    /// Get a reference to the catalog service (featured cache).
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a handle to the order-notification queue.
    #[must_use]
    pub fn notifications(&self) -> &NotificationQueue {
        &self.inner.notifications
    }
}
