pub mod app;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod preferences;
pub mod program;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use state::{AppState, Session};
pub use storage::{LocalStore, load_program, persist_program, resolve_data_path};
