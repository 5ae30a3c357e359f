//! Conversions between wire types and engine types.

use api_types::{
    Amount,
    admin::{AdminPropertyView, PageQuery, UserView},
    agent::AgentView,
    booking::{BookingStatus, BookingView},
    property::PropertyView,
};
use chrono::NaiveDate;
use engine::{
    Booking, BookingDetail, DEFAULT_PAGE_LIMIT, EngineError, MoneyCents, OwnedProperty,
    PageRequest, Property, PublicAgent, User,
};
use uuid::Uuid;

pub(crate) fn parse_id(raw: &str, label: &str) -> Result<Uuid, EngineError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// `YYYY-MM-DD` only.
pub(crate) fn parse_date(raw: &str, label: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidArgument(format!("{label} must be YYYY-MM-DD")))
}

pub(crate) fn parse_amount(amount: &Amount, label: &str) -> Result<MoneyCents, EngineError> {
    parse_price(&amount.to_decimal_string(), label)
}

pub(crate) fn parse_price(raw: &str, label: &str) -> Result<MoneyCents, EngineError> {
    raw.parse::<MoneyCents>()
        .map_err(|_| EngineError::InvalidArgument(format!("invalid {label}: {raw}")))
}

fn status_view(status: engine::BookingStatus) -> BookingStatus {
    match status {
        engine::BookingStatus::Pending => BookingStatus::Pending,
        engine::BookingStatus::Confirmed => BookingStatus::Confirmed,
        engine::BookingStatus::Cancelled => BookingStatus::Cancelled,
    }
}

pub(crate) fn booking_view(booking: Booking, property_title: Option<String>) -> BookingView {
    BookingView {
        id: booking.id,
        property_id: booking.property_id,
        guest_id: booking.guest_id,
        check_in_date: booking.check_in_date,
        check_out_date: booking.check_out_date,
        total_price: booking.total_price.to_string(),
        status: status_view(booking.status),
        property_title,
        created_at: booking.created_at,
        updated_at: booking.updated_at,
    }
}

pub(crate) fn booking_detail_view(detail: BookingDetail) -> BookingView {
    booking_view(detail.booking, Some(detail.property_title))
}

pub(crate) fn property_view(property: Property) -> PropertyView {
    PropertyView {
        id: property.id,
        owner_id: property.owner_id,
        title: property.title,
        description: property.description,
        price: property.price.to_string(),
        is_active: property.is_active,
        created_at: property.created_at,
        updated_at: property.updated_at,
    }
}

pub(crate) fn agent_view(agent: PublicAgent) -> AgentView {
    AgentView {
        id: agent.id,
        name: agent.name,
        email: agent.email,
        phone: agent.phone,
        is_verified: agent.is_verified,
        created_at: agent.created_at,
    }
}

pub(crate) fn page_request(query: &PageQuery) -> PageRequest {
    PageRequest {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    }
}

pub(crate) fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        phone: user.phone,
        role: user.role.as_str().to_string(),
        is_active: user.is_active,
        is_verified: user.is_verified,
        created_at: user.created_at,
    }
}

pub(crate) fn admin_property_view(listing: OwnedProperty) -> AdminPropertyView {
    AdminPropertyView {
        property: property_view(listing.property),
        owner: agent_view(listing.owner),
    }
}
