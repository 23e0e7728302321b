//! services/client/src/state.rs
//!
//! Defines the client's shared state, built once at startup.

use crate::adapters::{HistoryNavigator, HttpAdapter, TracingLog, TracingNotifier};
use crate::config::Config;
use crate::error::ClientError;
use crate::sync::{MutationService, QueryStore};
use recletters_core::domain::CurrentUser;
use recletters_core::ports::{
    NavigationService, NotificationService, OperationalLog, PortResult, RemoteCollectionService,
    SessionService,
};
use recletters_core::route::Route;
use std::sync::Arc;
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Views)
//=========================================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<dyn SessionService>,
    pub navigator: Arc<dyn NavigationService>,
    pub store: Arc<QueryStore>,
    pub mutations: Arc<MutationService>,
}

impl AppState {
    /// Wires the REST adapter and the tracing channels into a store and a
    /// mutation service.
    pub fn build(config: Arc<Config>, start: Route) -> Result<Self, ClientError> {
        let http = Arc::new(HttpAdapter::new(&config)?);
        let notifier: Arc<dyn NotificationService> = Arc::new(TracingNotifier);
        let log: Arc<dyn OperationalLog> = Arc::new(TracingLog);
        let navigator: Arc<dyn NavigationService> = Arc::new(HistoryNavigator::new(start.path()));

        Ok(Self::from_parts(config, http.clone(), http, notifier, log, navigator))
    }

    pub fn from_parts(
        config: Arc<Config>,
        remote: Arc<dyn RemoteCollectionService>,
        session: Arc<dyn SessionService>,
        notifier: Arc<dyn NotificationService>,
        log: Arc<dyn OperationalLog>,
        navigator: Arc<dyn NavigationService>,
    ) -> Self {
        let store = QueryStore::new(remote.clone(), notifier.clone(), log.clone());
        let mutations = Arc::new(MutationService::new(
            remote,
            store.clone(),
            notifier,
            log,
            navigator.clone(),
        ));
        Self {
            config,
            session,
            navigator,
            store,
            mutations,
        }
    }

    pub async fn current_user(&self) -> PortResult<CurrentUser> {
        self.session.current_user().await
    }

    pub fn current_route(&self) -> Route {
        Route::parse(&self.navigator.current_path())
    }

    /// Ends the session and forgets every cached list fetched under it.
    pub async fn logout(&self) -> PortResult<()> {
        self.session.logout().await?;
        self.store.clear();
        self.navigator.navigate(Route::Home.into());
        info!("Logged out");
        Ok(())
    }
}
