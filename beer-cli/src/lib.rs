pub mod app;
pub mod cli;
pub mod logging;

pub use app::{AppState, build_router};
