// Doc Solver - convert uploaded documents to markdown and solve prompts with a local model

pub mod config;
pub mod conversion;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod solver;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use types::{AppError, AppResult};

pub fn create_router(state: AppState) -> AppResult<axum::Router> {
    routes::create_router(state)
}
