use api_types::error::ErrorBody;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use notify::WebhookNotifier;
pub use server::{ServerState, run, run_with_listener, spawn_with_listener};

mod admin;
mod agents;
mod bookings;
mod convert;
mod notify;
mod properties;
mod server;

pub mod types {
    pub mod booking {
        pub use api_types::booking::{BookingNew, BookingStatus, BookingView};
    }

    pub mod property {
        pub use api_types::property::{PropertyList, PropertyNew, PropertyView};
    }

    pub mod agent {
        pub use api_types::agent::AgentView;
    }

    pub mod admin {
        pub use api_types::admin::Overview;
    }

    pub use api_types::Amount;
    pub use api_types::error::ErrorBody;
}

pub enum ServerError {
    Engine(EngineError),
    /// Malformed request that never reached the engine.
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidArgument(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidState(_)
        | EngineError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
        EngineError::Conflict(_) | EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::Database(_) if err.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, error) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                err.kind(),
                message_for_engine_error(err),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, "invalid_argument", err),
        };

        (
            status,
            Json(ErrorBody {
                kind: kind.to_string(),
                error,
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
