//! Admin API endpoints

use api_types::admin::{Overview, PageQuery, PropertiesPage, UsersPage};
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use chrono::Utc;
use engine::Identity;

use crate::{
    ServerError,
    convert::{admin_property_view, page_request, parse_id, user_view},
    server::ServerState,
};

pub async fn overview(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Overview>, ServerError> {
    let overview = state.engine.overview(&caller).await?;
    Ok(Json(Overview {
        users: overview.users,
        agents: overview.agents,
        properties: overview.properties,
        bookings: overview.bookings,
    }))
}

pub async fn deactivate_user(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_user_active(&caller, parse_id(&id, "user")?, false)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate_property(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .admin_set_property_active(&caller, parse_id(&id, "property")?, false, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Guest accounts, newest first.
pub async fn users(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<UsersPage>, ServerError> {
    let Query(query) = query?;
    let page = state
        .engine
        .users_page(&caller, page_request(&query))
        .await?;
    Ok(Json(UsersPage {
        users: page.items.into_iter().map(user_view).collect(),
        total: page.total,
        page: page.page,
        limit: page.limit,
        pages: page.pages,
    }))
}

pub async fn properties(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PropertiesPage>, ServerError> {
    let Query(query) = query?;
    let page = state
        .engine
        .properties_page(&caller, page_request(&query))
        .await?;
    Ok(Json(PropertiesPage {
        properties: page.items.into_iter().map(admin_property_view).collect(),
        total: page.total,
        page: page.page,
        limit: page.limit,
        pages: page.pages,
    }))
}
