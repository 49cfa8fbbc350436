//! Tool listing endpoint

use axum::{extract::State, routing::get, Json, Router};

use crate::types::ToolResponse;
use crate::AppState;

/// Build the tools router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_tools))
}

/// List the tools offered to the model
async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolResponse>> {
    let response = state
        .tool_registry
        .list_tools()
        .iter()
        .map(|t| ToolResponse {
            name: t.name.clone(),
            description: t.description.clone(),
        })
        .collect();

    Json(response)
}
