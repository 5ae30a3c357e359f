//! Accounts: guests, agents (property owners) and admins.
//!
//! Every request is resolved into an [`Identity`] from the opaque API token
//! stored on the user row.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A guest, stored as `user`.
    User,
    Agent,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }

    /// Agents and admins may list properties.
    pub fn can_own_properties(self) -> bool {
        matches!(self, Self::Agent | Self::Admin)
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" | "guest" => Ok(Self::User),
            "agent" => Ok(Self::Agent),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::InvalidArgument(format!("invalid role: {other}"))),
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn new(subject_id: Uuid, role: Role) -> Self {
        Self { subject_id, role }
    }

    pub(crate) fn require_admin(&self) -> ResultEngine<()> {
        if self.role != Role::Admin {
            return Err(EngineError::Forbidden("admin role required".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }
}

/// Agent fields that are safe to show to anyone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublicAgent {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicAgent {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub api_token: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            role: Role::try_from(model.role.as_str())?,
            name: model.name,
            email: model.email,
            phone: model.phone,
            is_active: model.is_active,
            is_verified: model.is_verified,
            created_at: model.created_at,
        })
    }
}

impl ActiveModel {
    pub(crate) fn from_user(user: &User, api_token: &str) -> Self {
        Self {
            id: ActiveValue::Set(user.id.to_string()),
            name: ActiveValue::Set(user.name.clone()),
            email: ActiveValue::Set(user.email.clone()),
            phone: ActiveValue::Set(user.phone.clone()),
            role: ActiveValue::Set(user.role.as_str().to_string()),
            api_token: ActiveValue::Set(api_token.to_string()),
            is_active: ActiveValue::Set(user.is_active),
            is_verified: ActiveValue::Set(user.is_verified),
            created_at: ActiveValue::Set(user.created_at),
        }
    }
}
