//! Public agent directory

use api_types::agent::AgentView;
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    ServerError,
    convert::{agent_view, parse_id},
    server::ServerState,
};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<AgentView>>, ServerError> {
    let agents = state.engine.agents().await?;
    Ok(Json(agents.into_iter().map(agent_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AgentView>, ServerError> {
    let agent = state.engine.agent(parse_id(&id, "agent")?).await?;
    Ok(Json(agent_view(agent)))
}
