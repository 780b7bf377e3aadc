use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::config::Config;
use crate::errors::ClientError;
use crate::router::History;
use crate::session::{SessionCore, SessionService};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Everything a view needs, built once at startup and shared by handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionService>,
    pub api: Arc<ApiClient>,
    /// Location history; the gateway redirects through it on 401.
    pub history: Arc<History>,
}

impl AppState {
    pub fn build(config: Config) -> Result<Self, ClientError> {
        let store: Arc<dyn KeyValueStore> = match &config.session_store_path {
            Some(path) => {
                info!("Persisting session to {}", path.display());
                Arc::new(FileStore::new(path.clone()))
            }
            None => {
                info!("No SESSION_STORE_PATH set; session kept in memory");
                Arc::new(MemoryStore::new())
            }
        };

        let core = SessionCore::new(store);
        let history = Arc::new(History::default());
        let api = Arc::new(ApiClient::new(&config, core.clone(), history.clone())?);
        let session = Arc::new(SessionService::new(core, api.clone()));

        Ok(Self {
            config,
            session,
            api,
            history,
        })
    }
}
