use std::sync::Arc;

use crate::config::Config;
use crate::conversion::{DocumentConverter, MarkdownConverter};
use crate::llm::LLM;
use crate::solver::Solver;
use crate::storage::ScratchDir;
use crate::types::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub solver: Arc<Solver>,
}

impl AppState {
    /// Wire the production converter and model client from configuration.
    pub fn new(config: Config) -> AppResult<Self> {
        let converter = Arc::new(MarkdownConverter::new(config.conversion.timeout()));
        let llm = LLM::from_config(&config.llm)?;
        Ok(Self::with_components(config, converter, llm))
    }

    pub fn with_components(
        config: Config,
        converter: Arc<dyn DocumentConverter>,
        llm: LLM,
    ) -> Self {
        let solver = Solver::new(
            converter,
            Arc::new(llm),
            ScratchDir::new(config.conversion.scratch_dir.clone()),
            config.llm.default_model.clone(),
        );

        Self {
            config,
            solver: Arc::new(solver),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SolutionResponse {
    pub solution: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub provider: String,
    pub model: String,
}
