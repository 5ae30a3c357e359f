//! Booking API endpoints

use api_types::booking::{BookingNew, BookingView};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use engine::Identity;

use crate::{
    ServerError,
    convert::{booking_detail_view, booking_view, parse_amount, parse_date, parse_id},
    server::ServerState,
};

/// Handle requests for a new pending booking of the caller.
pub async fn create(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    payload: Result<Json<BookingNew>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingView>), ServerError> {
    let Json(payload) = payload?;
    let property_id = parse_id(&payload.property_id, "property")?;
    let check_in = parse_date(&payload.check_in_date, "check_in_date")?;
    let check_out = parse_date(&payload.check_out_date, "check_out_date")?;
    let total_price = parse_amount(&payload.total_price, "total_price")?;

    let booking = state
        .engine
        .create_booking(
            &caller,
            property_id,
            check_in,
            check_out,
            total_price,
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(booking_view(booking, None))))
}

/// Handle requests for listing the bookings visible to the caller.
pub async fn list(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BookingView>>, ServerError> {
    let bookings = state.engine.list_bookings_for(&caller).await?;
    Ok(Json(bookings.into_iter().map(booking_detail_view).collect()))
}

pub async fn get(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, ServerError> {
    let booking_id = parse_id(&id, "booking")?;
    let detail = state.engine.booking(&caller, booking_id).await?;
    Ok(Json(booking_detail_view(detail)))
}

pub async fn confirm(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, ServerError> {
    let booking_id = parse_id(&id, "booking")?;
    let booking = state
        .engine
        .confirm_booking(&caller, booking_id, Utc::now())
        .await?;
    Ok(Json(booking_view(booking, None)))
}

pub async fn cancel(
    Extension(caller): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, ServerError> {
    let booking_id = parse_id(&id, "booking")?;
    let booking = state
        .engine
        .cancel_booking(&caller, booking_id, Utc::now())
        .await?;
    Ok(Json(booking_view(booking, None)))
}
