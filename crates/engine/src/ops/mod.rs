use std::{fmt, sync::Arc};

use sea_orm::DatabaseConnection;

use crate::{BookingStatusChanged, LogNotifier, Notifier, ResultEngine};

mod access;
mod bookings;
mod properties;
mod users;

pub use properties::{OwnedProperty, PropertyDraft, PropertyFilter};
pub use users::{NewUser, Overview};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every booking, property and account operation.
///
/// The engine keeps no state besides the connection pool and the notifier:
/// several server instances can share one database.
pub struct Engine {
    database: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Hand a committed status change to the notifier. Failures are only
    /// logged.
    async fn dispatch(&self, event: &BookingStatusChanged) {
        if let Err(err) = self.notifier.notify(event).await {
            tracing::warn!(
                booking_id = %event.booking.id,
                status = event.status.as_str(),
                "booking notification failed: {err}"
            );
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    notifier: Option<Arc<dyn Notifier>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Notifier for booking status changes (defaults to [`LogNotifier`]).
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            notifier: self.notifier.unwrap_or_else(|| Arc::new(LogNotifier)),
        })
    }
}
