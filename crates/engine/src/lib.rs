//! Booking lifecycle and availability engine of the short-let marketplace.
//!
//! [`Engine`] owns the database pool and exposes every operation: property
//! listings, accounts, and the booking status machine with its availability
//! guarantee (confirmed stays of one property never overlap).

pub use availability::{DateRange, has_conflict};
pub use bookings::{Booking, BookingDetail, BookingStatus};
pub use error::EngineError;
pub use money::MoneyCents;
pub use notifier::{BookingStatusChanged, LogNotifier, Notifier, NotifyError};
pub use ops::{
    Engine, EngineBuilder, NewUser, OwnedProperty, Overview, PropertyDraft, PropertyFilter,
};
pub use page::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, Page, PageRequest};
pub use properties::Property;
pub use users::{Identity, PublicAgent, Role, User};

mod availability;
mod bookings;
mod error;
mod money;
mod notifier;
mod ops;
mod page;
mod properties;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
