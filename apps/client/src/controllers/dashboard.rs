use std::sync::Arc;

use tracing::warn;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::resume::Resume;
use crate::presentation;
use crate::session::SessionService;

/// Resumes listed under "recent" on the dashboard.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub resumes: usize,
    pub cover_letters: usize,
    pub portfolios: usize,
    pub total: usize,
}

pub struct Dashboard {
    api: Arc<ApiClient>,
    session: Arc<SessionService>,
    stats: DashboardStats,
    recent: Vec<Resume>,
}

fn count_or_zero<T>(what: &str, result: Result<Vec<T>, ClientError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Could not load {what} for dashboard: {e}");
        Vec::new()
    })
}

impl Dashboard {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionService>) -> Self {
        Self {
            api,
            session,
            stats: DashboardStats::default(),
            recent: Vec::new(),
        }
    }

    /// Fetches all three document lists at once. A failed list counts as empty.
    pub async fn load(&mut self) -> DashboardStats {
        let (resumes, letters, portfolios) = tokio::join!(
            self.api.list_resumes(),
            self.api.list_cover_letters(),
            self.api.list_portfolios()
        );
        let resumes = count_or_zero("resumes", resumes);
        let letters = count_or_zero("cover letters", letters);
        let portfolios = count_or_zero("portfolios", portfolios);

        self.stats = DashboardStats {
            resumes: resumes.len(),
            cover_letters: letters.len(),
            portfolios: portfolios.len(),
            total: resumes.len() + letters.len() + portfolios.len(),
        };
        self.recent = resumes.into_iter().take(RECENT_LIMIT).collect();
        self.stats
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    pub fn recent_resumes(&self) -> &[Resume] {
        &self.recent
    }

    pub fn greeting(&self) -> String {
        presentation::greeting(self.session.snapshot().user.as_ref())
    }
}
