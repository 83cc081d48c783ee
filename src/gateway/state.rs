use std::path::PathBuf;
use std::sync::Arc;

use crate::countries::{CountryStore, RefreshService};

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// Country store (read side and deletes)
    pub store: Arc<dyn CountryStore>,
    /// Refresh pipeline behind `POST /countries/refresh`
    pub refresh: Arc<RefreshService>,
    /// Where the summary artifact is served from
    pub summary_path: PathBuf,
}

impl AppState {
    pub fn new(store: Arc<dyn CountryStore>, refresh: Arc<RefreshService>) -> Self {
        let summary_path = refresh
            .summary_writer()
            .map(|w| w.path().to_path_buf())
            .unwrap_or_default();
        Self {
            store,
            refresh,
            summary_path,
        }
    }
}
