use axum::{extract::State, routing::post, Json, Router};
use tracing::info;

use super::form::SolveForm;
use crate::models::{AppState, SolutionResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/text-file/", post(solve_text_file))
        .route("/text/", post(solve_text))
        .with_state(state)
}

/// POST /text-file/ - Solve a prompt against an uploaded document
///
/// - **prompt**: instruction for the model
/// - **file**: the document to convert and attach
async fn solve_text_file(
    State(state): State<AppState>,
    mut form: SolveForm,
) -> AppResult<Json<SolutionResponse>> {
    let prompt = form.require_text("prompt")?.to_string();
    let file = form.take_file("file")?;
    info!(
        "Received document solve request: {} ({} bytes)",
        file.filename,
        file.content.len()
    );

    let solution = state
        .solver
        .solve_document(&prompt, &file.filename, &file.content)
        .await?;

    Ok(Json(SolutionResponse { solution }))
}

/// POST /text/ - Solve a prompt on its own
async fn solve_text(
    State(state): State<AppState>,
    form: SolveForm,
) -> AppResult<Json<SolutionResponse>> {
    let prompt = form.require_text("prompt")?;
    info!("Received prompt solve request ({} characters)", prompt.len());

    let solution = state.solver.solve_prompt(prompt).await?;

    Ok(Json(SolutionResponse { solution }))
}
