//! Bookings and their status machine.
//!
//! ```text
//!   (create) ──► pending ──► confirmed
//!                   │            │
//!                   └──► cancelled ◄┘
//! ```
//!
//! `pending` is only ever the initial state; `cancelled` is terminal and
//! `confirmed` can only move to `cancelled`.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DateRange, EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` if `self → target` is an edge of the status machine.
    pub fn can_transition_to(self, target: BookingStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub(crate) fn require_transition_to(self, target: BookingStatus) -> ResultEngine<()> {
        if !self.can_transition_to(target) {
            return Err(EngineError::InvalidTransition(format!(
                "booking cannot go from {} to {}",
                self.as_str(),
                target.as_str()
            )));
        }
        Ok(())
    }
}

impl TryFrom<&str> for BookingStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid booking status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: MoneyCents,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// A new `pending` booking of `stay` for `guest_id`.
    pub fn new(
        property_id: Uuid,
        guest_id: Uuid,
        stay: DateRange,
        total_price: MoneyCents,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id,
            guest_id,
            check_in_date: stay.start(),
            check_out_date: stay.end(),
            total_price,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stay(&self) -> ResultEngine<DateRange> {
        DateRange::new(self.check_in_date, self.check_out_date)
    }
}

/// A booking together with the title of the booked property, as shown in
/// per-caller booking lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BookingDetail {
    pub booking: Booking,
    pub property_title: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub property_id: String,
    pub guest_id: String,
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub total_price_minor: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::properties::Entity",
        from = "Column::PropertyId",
        to = "super::properties::Column::Id"
    )]
    Properties,
}

impl Related<super::properties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Properties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Booking> for ActiveModel {
    fn from(value: &Booking) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            property_id: ActiveValue::Set(value.property_id.to_string()),
            guest_id: ActiveValue::Set(value.guest_id.to_string()),
            check_in_date: ActiveValue::Set(value.check_in_date),
            check_out_date: ActiveValue::Set(value.check_out_date),
            total_price_minor: ActiveValue::Set(value.total_price.cents()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Booking {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "booking")?,
            property_id: parse_uuid(&model.property_id, "property")?,
            guest_id: parse_uuid(&model.guest_id, "user")?,
            check_in_date: model.check_in_date,
            check_out_date: model.check_out_date,
            total_price: MoneyCents::new(model.total_price_minor),
            status: BookingStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
