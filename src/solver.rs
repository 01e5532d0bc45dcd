//! Solve pipeline shared by the HTTP handlers.
//!
//! A document solve is strictly sequential: store the upload, convert it to
//! markdown, ask the model. The [`ScratchFile`](crate::storage::ScratchFile)
//! guard lives for the whole pipeline, so the upload is removed from disk on
//! every exit path.

use std::sync::Arc;
use tracing::{debug, info};

use crate::conversion::DocumentConverter;
use crate::llm::LLM;
use crate::storage::ScratchDir;
use crate::types::AppResult;

const DOCUMENT_DELIMITER: &str = "--- Document Content ---";

pub struct Solver {
    converter: Arc<dyn DocumentConverter>,
    llm: Arc<LLM>,
    scratch: ScratchDir,
    model: String,
}

impl Solver {
    pub fn new(
        converter: Arc<dyn DocumentConverter>,
        llm: Arc<LLM>,
        scratch: ScratchDir,
        model: impl Into<String>,
    ) -> Self {
        Self {
            converter,
            llm,
            scratch,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn llm(&self) -> &LLM {
        &self.llm
    }

    /// Answer `prompt` against the contents of an uploaded document.
    pub async fn solve_document(
        &self,
        prompt: &str,
        filename: &str,
        content: &[u8],
    ) -> AppResult<String> {
        let upload = self.scratch.store(filename, content).await?;

        let markdown = self.converter.convert(upload.path()).await?;
        debug!("Extracted markdown:\n{}", markdown);

        let solution = self
            .llm
            .ask(&self.model, build_document_prompt(prompt, &markdown))
            .await?;

        info!("Solved document {}", filename);
        Ok(solution)
    }

    /// Answer `prompt` on its own.
    pub async fn solve_prompt(&self, prompt: &str) -> AppResult<String> {
        self.llm.ask(&self.model, prompt).await
    }
}

pub fn build_document_prompt(prompt: &str, document: &str) -> String {
    format!("{}\n\n{}\n{}\n", prompt, DOCUMENT_DELIMITER, document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMAdapter;
    use crate::types::{AppError, LLMProvider, LLMRequest, LLMResponse};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    struct FixedConverter(AppResult<String>);

    #[async_trait]
    impl DocumentConverter for FixedConverter {
        async fn convert(&self, path: &Path) -> AppResult<String> {
            assert!(path.exists(), "upload must be on disk during conversion");
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(AppError::Conversion(e.to_string())),
            }
        }
    }

    struct EchoAdapter {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl LLMAdapter for EchoAdapter {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            let content = request.messages[0].content.clone();
            self.prompts.lock().unwrap().push(content);
            Ok(LLMResponse {
                content: "solved".to_string(),
                finish_reason: None,
                usage: None,
            })
        }
    }

    fn solver(converter: FixedConverter, root: &Path) -> (Solver, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let llm = LLM::with_adapter(
            LLMProvider::Ollama,
            Box::new(EchoAdapter {
                prompts: prompts.clone(),
            }),
        );
        let solver = Solver::new(
            Arc::new(converter),
            Arc::new(llm),
            ScratchDir::new(root.join("uploads")),
            "gemma3n:e2b",
        );
        (solver, prompts)
    }

    #[test]
    fn test_build_document_prompt() {
        let prompt = build_document_prompt("Summarize", "## Page 1\n\nx = 2");
        assert_eq!(
            prompt,
            "Summarize\n\n--- Document Content ---\n## Page 1\n\nx = 2\n"
        );
    }

    #[tokio::test]
    async fn test_solve_document_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let (solver, prompts) = solver(FixedConverter(Ok("x + 2 = 5".into())), tmp.path());

        let solution = solver
            .solve_document("Solve for x", "problem.pdf", b"%PDF-1.5")
            .await
            .unwrap();

        assert_eq!(solution, "solved");
        assert_eq!(
            prompts.lock().unwrap()[0],
            build_document_prompt("Solve for x", "x + 2 = 5")
        );
        assert!(!tmp.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn test_solve_document_cleans_up_on_conversion_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let (solver, prompts) = solver(
            FixedConverter(Err(AppError::Conversion("corrupt".into()))),
            tmp.path(),
        );

        let err = solver
            .solve_document("Solve", "bad.pdf", b"junk")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conversion(_)));
        assert!(prompts.lock().unwrap().is_empty());
        assert!(!tmp.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn test_solve_prompt_passes_prompt_through() {
        let tmp = tempfile::tempdir().unwrap();
        let (solver, prompts) = solver(FixedConverter(Ok(String::new())), tmp.path());

        assert_eq!(solver.solve_prompt("What is 2+2?").await.unwrap(), "solved");
        assert_eq!(prompts.lock().unwrap()[0], "What is 2+2?");
        assert!(!tmp.path().join("uploads").exists());
    }
}
