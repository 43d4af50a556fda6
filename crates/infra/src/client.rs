//! Composition root
//!
//! [`ListSyncClient`] wires one credential authority, one shared request
//! limiter and one HTTP transport into the three operation queues, the
//! domain managers and (optionally) the push connection.

use std::sync::Arc;

use listsync_common::resilience::ConcurrencyLimiter;
use listsync_core::{
    ApiTransport, CategoryManager, ChannelConnector, ConnectionManager, MealPlanManager,
    OperationCodec, OperationQueue, PushSignalHandler, QueueWorker, RecipeManager,
    SessionObserver, ShoppingListManager, TokenAuthority, TokenRefresher,
};
use listsync_domain::{
    ClientConfig, ConnectionState, Credential, SyncDomain, SyncError, SyncEvent, SyncResult,
    UserId,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{ApiClient, HttpTokenRefresher};
use crate::errors::InfraError;
use crate::http::HttpClient;
use crate::realtime::WebSocketConnector;
use crate::sync::JsonOperationCodec;

const USER_AGENT: &str = concat!("listsync/", env!("CARGO_PKG_VERSION"));

/// Signal handler used when the host does not supply one.
#[derive(Debug, Default)]
pub struct LoggingSignalHandler;

impl PushSignalHandler for LoggingSignalHandler {
    fn on_signal(&self, event: SyncEvent) {
        info!(?event, "push signal received with no handler installed");
    }

    fn on_state_change(&self, state: ConnectionState) {
        info!(%state, "push connection state changed");
    }
}

/// A running sync session for one user.
pub struct ListSyncClient {
    config: ClientConfig,
    client_identifier: Uuid,
    authority: Arc<TokenAuthority>,
    limiter: ConcurrencyLimiter,
    queues: Vec<Arc<OperationQueue>>,
    workers: Vec<QueueWorker>,
    shopping_lists: ShoppingListManager,
    categories: CategoryManager,
    recipes: RecipeManager,
    meal_plan: Option<MealPlanManager>,
    connection: Option<ConnectionManager>,
    cancellation: CancellationToken,
}

impl ListSyncClient {
    pub fn builder() -> ListSyncClientBuilder {
        ListSyncClientBuilder::default()
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Identifier sent with every request. Generated when the config has
    /// none; the host should persist it.
    pub const fn client_identifier(&self) -> Uuid {
        self.client_identifier
    }

    pub const fn authority(&self) -> &Arc<TokenAuthority> {
        &self.authority
    }

    pub const fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub const fn shopping_lists(&self) -> &ShoppingListManager {
        &self.shopping_lists
    }

    pub const fn categories(&self) -> &CategoryManager {
        &self.categories
    }

    pub const fn recipes(&self) -> &RecipeManager {
        &self.recipes
    }

    /// `None` unless a calendar id was supplied.
    pub const fn meal_plan(&self) -> Option<&MealPlanManager> {
        self.meal_plan.as_ref()
    }

    /// `None` when realtime is disabled.
    pub const fn connection(&self) -> Option<&ConnectionManager> {
        self.connection.as_ref()
    }

    pub fn queue(&self, domain: SyncDomain) -> Option<&Arc<OperationQueue>> {
        self.queues.iter().find(|queue| queue.domain() == domain)
    }

    /// Stop every worker, close the push connection and the limiter.
    ///
    /// Operations still pending are discarded.
    pub async fn shutdown(&mut self) {
        info!("shutting down listsync client");
        self.cancellation.cancel();

        for worker in &mut self.workers {
            if worker.is_running() {
                if let Err(e) = worker.stop().await {
                    warn!(domain = %worker.queue().domain(), error = %e, "queue worker stop failed");
                }
            }
        }
        if let Some(connection) = &self.connection {
            connection.close().await;
        }
        self.limiter.close();
    }
}

impl Drop for ListSyncClient {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

/// Builder for [`ListSyncClient`]
#[derive(Default)]
pub struct ListSyncClientBuilder {
    config: Option<ClientConfig>,
    credential: Option<Credential>,
    user_id: Option<UserId>,
    calendar_id: Option<String>,
    observer: Option<Arc<dyn SessionObserver>>,
    signal_handler: Option<Arc<dyn PushSignalHandler>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
    connector: Option<Arc<dyn ChannelConnector>>,
}

impl ListSyncClientBuilder {
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(UserId::new(user_id));
        self
    }

    /// Meal-planning calendar; enables [`ListSyncClient::meal_plan`].
    #[must_use]
    pub fn calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = Some(calendar_id.into());
        self
    }

    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    #[must_use]
    pub fn signal_handler(mut self, handler: Arc<dyn PushSignalHandler>) -> Self {
        self.signal_handler = Some(handler);
        self
    }

    /// Replace the HTTP refresh call.
    #[must_use]
    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Replace the WebSocket connector.
    #[must_use]
    pub fn connector(mut self, connector: Arc<dyn ChannelConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Wire everything and start the background tasks.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the credential or user id is missing,
    /// the configuration is invalid, or a worker fails to start.
    pub fn build(self) -> SyncResult<ListSyncClient> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let credential = self
            .credential
            .ok_or_else(|| SyncError::Config("credential not set".to_string()))?;
        let user_id =
            self.user_id.ok_or_else(|| SyncError::Config("user id not set".to_string()))?;

        let client_identifier = config.client_identifier.unwrap_or_else(|| {
            let generated = Uuid::new_v4();
            info!(%generated, "no client identifier configured; generated one");
            generated
        });

        let http = HttpClient::builder()
            .timeout(config.api.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        let refresher = self.refresher.unwrap_or_else(|| {
            Arc::new(
                HttpTokenRefresher::new(http.clone(), &config.api.base_url)
                    .with_api_version(config.api.api_version.clone()),
            )
        });
        let mut authority = TokenAuthority::new(credential, client_identifier, refresher)
            .with_api_version(config.api.api_version.clone());
        if let Some(observer) = self.observer {
            authority = authority.with_observer(observer);
        }
        let authority = Arc::new(authority);

        let limiter = ConcurrencyLimiter::new("api", config.api.max_concurrency)
            .map_err(|e| SyncError::from(InfraError::from(e)))?;
        let transport: Arc<dyn ApiTransport> = Arc::new(ApiClient::new(
            http,
            config.api.base_url.clone(),
            Arc::clone(&authority),
            limiter.clone(),
        ));
        let codec: Arc<dyn OperationCodec> = Arc::new(JsonOperationCodec);

        let queues: Vec<Arc<OperationQueue>> = SyncDomain::ALL
            .iter()
            .map(|&domain| {
                Arc::new(
                    OperationQueue::new(
                        domain,
                        user_id.clone(),
                        Arc::clone(&transport),
                        Arc::clone(&codec),
                    )
                    .with_retry_delay(config.queue.retry_delay()),
                )
            })
            .collect();
        let queue_for = |domain: SyncDomain| -> SyncResult<Arc<OperationQueue>> {
            queues
                .iter()
                .find(|queue| queue.domain() == domain)
                .cloned()
                .ok_or_else(|| SyncError::Config(format!("no queue for {domain}")))
        };

        let lists = queue_for(SyncDomain::ShoppingLists)?;
        let shopping_lists =
            ShoppingListManager::new(Arc::clone(&lists), Arc::clone(&transport), codec);
        let categories = CategoryManager::new(lists);
        let recipes = RecipeManager::new(queue_for(SyncDomain::Recipes)?);
        let meal_plan = match self.calendar_id {
            Some(calendar_id) => {
                Some(MealPlanManager::new(queue_for(SyncDomain::MealPlan)?, calendar_id))
            }
            None => None,
        };

        let cancellation = CancellationToken::new();
        let mut workers = Vec::with_capacity(queues.len());
        for queue in &queues {
            let mut worker = QueueWorker::new(Arc::clone(queue));
            worker.start_with_parent(&cancellation)?;
            workers.push(worker);
        }

        let connection = if config.realtime.enabled {
            let connector = match self.connector {
                Some(connector) => connector,
                None => Arc::new(WebSocketConnector::new(&config.realtime.url, client_identifier)?),
            };
            let handler =
                self.signal_handler.unwrap_or_else(|| Arc::new(LoggingSignalHandler));
            let manager = ConnectionManager::new(
                connector,
                Arc::clone(&authority),
                handler,
                &config.realtime,
            )?;
            manager.start()?;
            Some(manager)
        } else {
            None
        };

        info!(
            %client_identifier,
            realtime = config.realtime.enabled,
            max_concurrency = config.api.max_concurrency,
            "listsync client started"
        );

        Ok(ListSyncClient {
            config,
            client_identifier,
            authority,
            limiter,
            queues,
            workers,
            shopping_lists,
            categories,
            recipes,
            meal_plan,
            connection,
            cancellation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_requires_credential_and_user() {
        let err = ListSyncClient::builder().user_id("u").build().err().unwrap();
        assert_eq!(err, SyncError::Config("credential not set".into()));

        let err =
            ListSyncClient::builder().credential(Credential::new("a", "r")).build().err().unwrap();
        assert_eq!(err, SyncError::Config("user id not set".into()));
    }

    #[tokio::test]
    async fn generates_identifier_and_skips_realtime_when_disabled() {
        let mut config = ClientConfig::default();
        config.realtime.enabled = false;

        let mut client = ListSyncClient::builder()
            .config(config)
            .credential(Credential::new("a", "r"))
            .user_id("user-1")
            .build()
            .unwrap();

        assert!(client.connection().is_none());
        assert!(client.meal_plan().is_none());
        assert_ne!(client.client_identifier(), Uuid::nil());
        assert_eq!(client.authority().client_identifier(), client.client_identifier());
        for domain in SyncDomain::ALL {
            assert_eq!(client.queue(domain).unwrap().domain(), domain);
        }

        client.shutdown().await;
        assert!(client.limiter().is_closed());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_anything_starts() {
        let mut config = ClientConfig::default();
        config.api.max_concurrency = 0;

        let err = ListSyncClient::builder()
            .config(config)
            .credential(Credential::new("a", "r"))
            .user_id("u")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SyncError::Config(_)));
    }
}
