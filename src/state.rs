use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;

use crate::{
    auth::{Authenticator, LocalAuthenticator},
    config::Config,
    quiz::{
        QuestionLoader, SessionRegistry, SubmissionGuard,
        expiry::{ExpiryReaper, ExpiryScheduler},
    },
    storage::Store,
    utils::clock::Clock,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub auth: Arc<dyn Authenticator>,
    pub loader: Arc<QuestionLoader>,
    pub guard: Arc<SubmissionGuard>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Wires the quiz core around `store`. `clock` schedules expiry cleanup.
    pub fn new(config: Config, store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        let auth = LocalAuthenticator::new(
            store.clone(),
            config.jwt_secret.clone(),
            config.jwt_expiration,
        );
        let guard = SubmissionGuard::new(
            store.clone(),
            config.lock_window(),
            ExpiryScheduler::new(store.clone(), clock),
        );

        Self {
            loader: Arc::new(QuestionLoader::new(&config.questions_source)),
            auth: Arc::new(auth),
            guard: Arc::new(guard),
            sessions: Arc::new(SessionRegistry::default()),
            store,
            config,
        }
    }

    /// Periodic sweeper for submissions whose deletion timer never fired.
    pub fn reaper(&self) -> ExpiryReaper {
        ExpiryReaper::new(
            self.store.clone(),
            Duration::from_secs(self.config.sweep_interval_secs),
        )
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Authenticator> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
