use crate::client::BackendClient;
use crate::config::AppConfig;
use crate::session::SessionStore;

/// Shared per-process state: configuration, the backend client and the
/// session store. All request-scoped state (cookies) stays out of here.
pub struct AppState {
    pub config: AppConfig,
    pub backend: BackendClient,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let refresh_path = format!("{}/refresh", config.paths.auth.trim_end_matches('/'));
        let backend = BackendClient::new(config.backend_base_url.clone(), refresh_path);
        let sessions = SessionStore::new(config.session_secret.clone());
        Self {
            config,
            backend,
            sessions,
        }
    }
}
