//! Storage access for bookings.
//!
//! Every function runs on the caller's transaction; none of them commits.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{Booking, BookingStatus, DateRange, EngineError, ResultEngine, bookings, properties};

pub(super) async fn find_booking(
    db: &DatabaseTransaction,
    booking_id: Uuid,
) -> ResultEngine<Option<Booking>> {
    bookings::Entity::find_by_id(booking_id.to_string())
        .one(db)
        .await?
        .map(Booking::try_from)
        .transpose()
}

pub(super) async fn require_booking(
    db: &DatabaseTransaction,
    booking_id: Uuid,
) -> ResultEngine<Booking> {
    find_booking(db, booking_id)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("booking not found".to_string()))
}

/// Confirmed bookings of `property_id` whose stay overlaps `stay`.
///
/// The overlap predicate is evaluated in SQL so only candidate rows are
/// loaded. `exclude` leaves one booking out, used when re-checking a booking
/// that is about to be confirmed.
pub(super) async fn find_confirmed_overlapping(
    db: &DatabaseTransaction,
    property_id: Uuid,
    stay: &DateRange,
    exclude: Option<Uuid>,
) -> ResultEngine<Vec<Booking>> {
    let mut query = bookings::Entity::find()
        .filter(bookings::Column::PropertyId.eq(property_id.to_string()))
        .filter(bookings::Column::Status.eq(BookingStatus::Confirmed.as_str()))
        .filter(bookings::Column::CheckInDate.lt(stay.end()))
        .filter(bookings::Column::CheckOutDate.gt(stay.start()));
    if let Some(id) = exclude {
        query = query.filter(bookings::Column::Id.ne(id.to_string()));
    }

    query
        .order_by_asc(bookings::Column::CheckInDate)
        .all(db)
        .await?
        .into_iter()
        .map(Booking::try_from)
        .collect()
}

pub(super) async fn insert_booking(
    db: &DatabaseTransaction,
    booking: &Booking,
) -> ResultEngine<Booking> {
    let model = bookings::ActiveModel::from(booking).insert(db).await?;
    Booking::try_from(model)
}

/// Compare-and-set of the booking status.
///
/// The row is only updated while it still holds `expected`; when another
/// writer got there first the update matches nothing and `Conflict` is
/// returned.
pub(super) async fn update_status(
    db: &DatabaseTransaction,
    booking_id: Uuid,
    expected: BookingStatus,
    status: BookingStatus,
    at: DateTime<Utc>,
) -> ResultEngine<Booking> {
    let res = bookings::Entity::update_many()
        .col_expr(bookings::Column::Status, Expr::value(status.as_str()))
        .col_expr(bookings::Column::UpdatedAt, Expr::value(at))
        .filter(bookings::Column::Id.eq(booking_id.to_string()))
        .filter(bookings::Column::Status.eq(expected.as_str()))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(EngineError::Conflict(
            "booking was modified concurrently".to_string(),
        ));
    }

    require_booking(db, booking_id).await
}

/// Bumps the property's booking revision.
///
/// Issued as the first statement of a booking write so the transaction holds
/// the write lock on the property row (the database lock on SQLite) until it
/// commits. Concurrent writers for the same property queue up behind it.
pub(super) async fn lock_property_bookings(
    db: &DatabaseTransaction,
    property_id: Uuid,
) -> ResultEngine<()> {
    let res = properties::Entity::update_many()
        .col_expr(
            properties::Column::BookingRevision,
            Expr::col(properties::Column::BookingRevision).add(1),
        )
        .filter(properties::Column::Id.eq(property_id.to_string()))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(EngineError::KeyNotFound("property not found".to_string()));
    }
    Ok(())
}
