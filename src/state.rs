use std::sync::Arc;

use crate::auth::token::TokenIssuer;
use crate::storage::Storage;

/// Shared application services, constructed once in `main` and injected into
/// handlers as `web::Data<AppState>`. Tests build one over a
/// [`crate::storage::MemoryStorage`] instead of a database pool.
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, tokens: TokenIssuer) -> Self {
        Self { storage, tokens }
    }
}
