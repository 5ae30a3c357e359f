//! Property API endpoints

use api_types::property::{PropertyList, PropertyNew, PropertyView};
use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use engine::{Identity, PropertyDraft, PropertyFilter};

use crate::{
    ServerError,
    convert::{parse_amount, parse_id, parse_price, property_view},
    server::ServerState,
};

fn draft(payload: PropertyNew) -> Result<PropertyDraft, ServerError> {
    Ok(PropertyDraft {
        price: parse_amount(&payload.price, "price")?,
        title: payload.title,
        description: payload.description,
    })
}

pub async fn create(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    payload: Result<Json<PropertyNew>, JsonRejection>,
) -> Result<(StatusCode, Json<PropertyView>), ServerError> {
    let Json(payload) = payload?;
    let property = state
        .engine
        .create_property(&caller, draft(payload)?, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(property_view(property))))
}

/// Handle public property searches.
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<PropertyList>, QueryRejection>,
) -> Result<Json<Vec<PropertyView>>, ServerError> {
    let Query(query) = query?;
    let filter = PropertyFilter {
        search: query.search,
        min_price: query
            .min_price
            .as_deref()
            .map(|raw| parse_price(raw, "min_price"))
            .transpose()?,
        max_price: query
            .max_price
            .as_deref()
            .map(|raw| parse_price(raw, "max_price"))
            .transpose()?,
        include_inactive: query.include_inactive.unwrap_or(false),
    };

    let properties = state.engine.list_properties(&filter).await?;
    Ok(Json(properties.into_iter().map(property_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<PropertyView>, ServerError> {
    let property = state.engine.property(parse_id(&id, "property")?).await?;
    Ok(Json(property_view(property)))
}

pub async fn update(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<PropertyNew>, JsonRejection>,
) -> Result<Json<PropertyView>, ServerError> {
    let property_id = parse_id(&id, "property")?;
    let Json(payload) = payload?;
    let property = state
        .engine
        .update_property(&caller, property_id, draft(payload)?, Utc::now())
        .await?;
    Ok(Json(property_view(property)))
}

pub async fn delete(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_property(&caller, parse_id(&id, "property")?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
