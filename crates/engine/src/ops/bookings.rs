use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Booking, BookingDetail, BookingStatus, BookingStatusChanged, DateRange, EngineError,
    Identity, MoneyCents, Property, ResultEngine, Role, User, availability::has_conflict,
    bookings, properties, util::require_positive,
};

use super::{Engine, with_tx};

mod repository;

use repository::{
    find_confirmed_overlapping, insert_booking, lock_property_bookings, require_booking,
    update_status,
};

/// What a transition needs to know once the caller has been authorized.
struct TransitionContext {
    booking: Booking,
    property: Property,
    guest: User,
    owner: User,
}

/// Checks that `caller` may move `booking` to `target`.
///
/// Confirming is reserved to the owner of the property, and a guest-role
/// identity can never confirm. Cancelling is open to the guest of the booking
/// and to the owner. Admins have no implicit rights here.
fn authorize_transition(
    caller: &Identity,
    booking: &Booking,
    property: &Property,
    target: BookingStatus,
) -> ResultEngine<()> {
    let is_owner = property.is_owned_by(caller.subject_id);
    let allowed = match target {
        BookingStatus::Confirmed => is_owner && caller.role != Role::User,
        BookingStatus::Cancelled => is_owner || booking.guest_id == caller.subject_id,
        BookingStatus::Pending => false,
    };
    if !allowed {
        return Err(EngineError::Forbidden(format!(
            "not allowed to mark this booking {}",
            target.as_str()
        )));
    }
    Ok(())
}

fn validate_new_stay(
    check_in: NaiveDate,
    check_out: NaiveDate,
    total_price: MoneyCents,
    now: DateTime<Utc>,
) -> ResultEngine<DateRange> {
    require_positive(total_price, "total_price")?;
    let stay = DateRange::new(check_in, check_out)?;
    if check_in < now.date_naive() {
        return Err(EngineError::InvalidArgument(
            "check_in_date cannot be in the past".to_string(),
        ));
    }
    Ok(stay)
}

/// Stays of already confirmed bookings. A stored row with an invalid range
/// is an error, not a free night.
fn confirmed_stays(confirmed: &[Booking]) -> ResultEngine<Vec<DateRange>> {
    confirmed.iter().map(Booking::stay).collect()
}

fn booking_detail(
    (booking, property): (bookings::Model, Option<properties::Model>),
) -> ResultEngine<BookingDetail> {
    let property =
        property.ok_or_else(|| EngineError::KeyNotFound("property not found".to_string()))?;
    Ok(BookingDetail {
        booking: Booking::try_from(booking)?,
        property_title: property.title,
    })
}

impl Engine {
    /// Creates a `pending` booking for `caller` on `property_id`.
    ///
    /// `now` is the creation moment; its UTC date is the earliest allowed
    /// check-in. Only confirmed bookings block the requested stay, so
    /// overlapping pending holds may coexist.
    pub async fn create_booking(
        &self,
        caller: &Identity,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        total_price: MoneyCents,
        now: DateTime<Utc>,
    ) -> ResultEngine<Booking> {
        let booking = with_tx!(self, |db_tx| {
            lock_property_bookings(&db_tx, property_id).await?;
            let property = self.require_property(&db_tx, property_id).await?;
            property.require_bookable()?;

            let stay = validate_new_stay(check_in, check_out, total_price, now)?;
            let confirmed = find_confirmed_overlapping(&db_tx, property.id, &stay, None).await?;
            if has_conflict(&stay, confirmed_stays(&confirmed)?) {
                return Err(EngineError::Conflict(
                    "property is already booked for these dates".to_string(),
                ));
            }

            let booking = Booking::new(property.id, caller.subject_id, stay, total_price, now);
            insert_booking(&db_tx, &booking).await
        })?;

        tracing::info!(
            booking_id = %booking.id,
            property_id = %booking.property_id,
            guest_id = %booking.guest_id,
            "booking created"
        );
        Ok(booking)
    }

    /// Moves a booking along the status machine on behalf of `caller`.
    ///
    /// The status flip happens in its own transaction which first takes the
    /// property's booking lock, reloads the booking and, when confirming,
    /// re-runs the overlap query against the committed state. The notifier
    /// is called once the transaction has committed.
    pub async fn transition(
        &self,
        caller: &Identity,
        booking_id: Uuid,
        target: BookingStatus,
        at: DateTime<Utc>,
    ) -> ResultEngine<Booking> {
        let ctx = self.transition_context(caller, booking_id, target).await?;
        self.apply_transition(caller, ctx, target, at).await
    }

    /// Write half of [`Engine::transition`]. The edge and the caller's rights
    /// are checked again against the reloaded row, so a booking that moved
    /// since `ctx` was read is judged by its current status.
    async fn apply_transition(
        &self,
        caller: &Identity,
        ctx: TransitionContext,
        target: BookingStatus,
        at: DateTime<Utc>,
    ) -> ResultEngine<Booking> {
        let booking_id = ctx.booking.id;

        let (from, updated) = with_tx!(self, |db_tx| {
            lock_property_bookings(&db_tx, ctx.property.id).await?;

            let current = require_booking(&db_tx, booking_id).await?;
            current.status.require_transition_to(target)?;
            authorize_transition(caller, &current, &ctx.property, target)?;

            if target == BookingStatus::Confirmed {
                let stay = current.stay()?;
                let confirmed =
                    find_confirmed_overlapping(&db_tx, current.property_id, &stay, Some(current.id))
                        .await?;
                if has_conflict(&stay, confirmed_stays(&confirmed)?) {
                    return Err(EngineError::Conflict(
                        "another booking was confirmed for these dates".to_string(),
                    ));
                }
            }

            update_status(&db_tx, booking_id, current.status, target, at)
                .await
                .map(|updated| (current.status, updated))
        })?;

        tracing::info!(
            booking_id = %updated.id,
            from = from.as_str(),
            to = target.as_str(),
            "booking status changed"
        );

        let event = BookingStatusChanged {
            booking: updated.clone(),
            status: target,
            property_title: ctx.property.title,
            guest_email: ctx.guest.email,
            owner_email: ctx.owner.email,
        };
        self.dispatch(&event).await;

        Ok(updated)
    }

    /// `pending → confirmed`, owner only.
    pub async fn confirm_booking(
        &self,
        caller: &Identity,
        booking_id: Uuid,
        at: DateTime<Utc>,
    ) -> ResultEngine<Booking> {
        self.transition(caller, booking_id, BookingStatus::Confirmed, at)
            .await
    }

    /// `pending | confirmed → cancelled`, guest or owner.
    pub async fn cancel_booking(
        &self,
        caller: &Identity,
        booking_id: Uuid,
        at: DateTime<Utc>,
    ) -> ResultEngine<Booking> {
        self.transition(caller, booking_id, BookingStatus::Cancelled, at)
            .await
    }

    /// Single booking, visible to its guest and to the property owner.
    pub async fn booking(&self, caller: &Identity, booking_id: Uuid) -> ResultEngine<BookingDetail> {
        with_tx!(self, |db_tx| {
            let booking = require_booking(&db_tx, booking_id).await?;
            let property = self.require_property(&db_tx, booking.property_id).await?;
            if booking.guest_id != caller.subject_id && !property.is_owned_by(caller.subject_id) {
                return Err(EngineError::KeyNotFound("booking not found".to_string()));
            }
            Ok(BookingDetail {
                booking,
                property_title: property.title,
            })
        })
    }

    /// Bookings visible to `caller`, most recent first.
    ///
    /// Guests see their own bookings; agents and admins see the bookings of
    /// the properties they own.
    pub async fn list_bookings_for(&self, caller: &Identity) -> ResultEngine<Vec<BookingDetail>> {
        with_tx!(self, |db_tx| {
            let query = bookings::Entity::find().find_also_related(properties::Entity);
            let query = match caller.role {
                Role::User => {
                    query.filter(bookings::Column::GuestId.eq(caller.subject_id.to_string()))
                }
                Role::Agent | Role::Admin => {
                    query.filter(properties::Column::OwnerId.eq(caller.subject_id.to_string()))
                }
            };

            query
                .order_by_desc(bookings::Column::CreatedAt)
                .order_by_desc(bookings::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(booking_detail)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Loads and authorizes everything a transition needs, in a read-only
    /// transaction of its own.
    async fn transition_context(
        &self,
        caller: &Identity,
        booking_id: Uuid,
        target: BookingStatus,
    ) -> ResultEngine<TransitionContext> {
        with_tx!(self, |db_tx| {
            let booking = require_booking(&db_tx, booking_id).await?;
            booking.status.require_transition_to(target)?;

            let property = self.require_property(&db_tx, booking.property_id).await?;
            authorize_transition(caller, &booking, &property, target)?;

            let guest = self.require_user(&db_tx, booking.guest_id).await?;
            let owner = self.require_user(&db_tx, property.owner_id).await?;
            Ok(TransitionContext {
                booking,
                property,
                guest,
                owner,
            })
        })
    }
}
