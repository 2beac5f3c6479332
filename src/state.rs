//! Application state shared by all handlers.

use std::sync::Arc;

use crate::db::DbPool;
use crate::session::SessionStore;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Passage repository, plans and results share one connection
    pub db: DbPool,

    /// Live recitation test sessions
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
