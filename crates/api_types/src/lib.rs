use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A monetary amount as sent by clients.
///
/// Accepts either a JSON number (`250`, `250.5`) or a decimal string
/// (`"250.50"`). At most two fractional digits are meaningful; the server
/// rejects anything finer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Text(String),
    Number(f64),
}

impl Amount {
    /// Decimal text for parsing into minor units.
    pub fn to_decimal_string(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        }
    }
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
    }
}

pub mod error {
    use super::*;

    /// Body of every error response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        /// Machine-readable kind: `not_found`, `invalid_argument`, `conflict`…
        pub kind: String,
        pub error: String,
    }
}

pub mod booking {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BookingStatus {
        Pending,
        Confirmed,
        Cancelled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingNew {
        pub property_id: String,
        /// `YYYY-MM-DD`
        pub check_in_date: String,
        /// `YYYY-MM-DD`, strictly after `check_in_date`.
        pub check_out_date: String,
        pub total_price: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingView {
        pub id: Uuid,
        pub property_id: Uuid,
        pub guest_id: Uuid,
        pub check_in_date: NaiveDate,
        pub check_out_date: NaiveDate,
        /// Decimal string with two fractional digits, e.g. `"480.50"`.
        pub total_price: String,
        pub status: BookingStatus,
        /// Present on listings and single-booking reads.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub property_title: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod property {
    use super::*;

    /// Request body for creating or replacing a property.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PropertyNew {
        pub title: String,
        pub description: String,
        pub price: Amount,
    }

    /// Query string of `GET /properties`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PropertyList {
        pub search: Option<String>,
        pub min_price: Option<String>,
        pub max_price: Option<String>,
        pub include_inactive: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PropertyView {
        pub id: Uuid,
        pub owner_id: Uuid,
        pub title: String,
        pub description: String,
        /// Nightly price, decimal string.
        pub price: String,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod agent {
    use super::*;

    /// Public profile of an agent. Never carries credentials.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AgentView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
        pub is_verified: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod admin {
    use super::*;
    use crate::{agent::AgentView, property::PropertyView};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Overview {
        pub users: u64,
        pub agents: u64,
        pub properties: u64,
        pub bookings: u64,
    }

    /// `?page=&limit=` of the admin listings; both default server side.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PageQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
        pub role: String,
        pub is_active: bool,
        pub is_verified: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersPage {
        pub users: Vec<UserView>,
        pub total: u64,
        pub page: u64,
        pub limit: u64,
        pub pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdminPropertyView {
        #[serde(flatten)]
        pub property: PropertyView,
        pub owner: AgentView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PropertiesPage {
        pub properties: Vec<AdminPropertyView>,
        pub total: u64,
        pub page: u64,
        pub limit: u64,
        pub pages: u64,
    }
}
