pub mod app;
pub mod bundle;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod progress;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use errors::{AppError, ProgressError};
pub use state::AppState;
pub use storage::{FileStore, MemoryStore, Store, StoreKey};
