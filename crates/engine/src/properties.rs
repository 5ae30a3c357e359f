//! Properties listed by agents.
//!
//! A property is exclusively owned by one user. Bookings reference it by id;
//! nothing cascades from a property to its bookings.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: MoneyCents,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn new(
        owner_id: Uuid,
        title: String,
        description: String,
        price: MoneyCents,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            description,
            price,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Inactive properties do not accept new bookings.
    pub fn require_bookable(&self) -> ResultEngine<()> {
        if !self.is_active {
            return Err(EngineError::InvalidState(
                "property is not accepting bookings".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price_minor: i64,
    pub is_active: bool,
    /// Bumped first thing by every booking write on this property so that
    /// concurrent writers serialize on the row.
    pub booking_revision: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Property> for ActiveModel {
    fn from(value: &Property) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            owner_id: ActiveValue::Set(value.owner_id.to_string()),
            title: ActiveValue::Set(value.title.clone()),
            description: ActiveValue::Set(value.description.clone()),
            price_minor: ActiveValue::Set(value.price.cents()),
            is_active: ActiveValue::Set(value.is_active),
            booking_revision: ActiveValue::NotSet,
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Property {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "property")?,
            owner_id: parse_uuid(&model.owner_id, "user")?,
            title: model.title,
            description: model.description,
            price: MoneyCents::new(model.price_minor),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
