//! Application state shared by all handlers.

use casita_core::Config;
use casita_db::ItemRepository;
use casita_storage::MediaStore;
use std::sync::Arc;

/// Repository, media store, and configuration, injected at startup. Handlers
/// only see the trait objects; which backend sits behind them is a
/// deployment decision.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub items: Arc<dyn ItemRepository>,
    pub media: Arc<dyn MediaStore>,
}
