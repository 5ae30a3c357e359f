use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use api_types::health::Health;

use std::sync::Arc;

use crate::{ServerError, admin, agents, bookings, properties};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the bearer token into an [`engine::Identity`] stored in the
/// request extensions.
async fn auth(
    State(state): State<ServerState>,
    auth_header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(auth_header) = auth_header else {
        return Err(EngineError::Unauthorized("missing bearer token".to_string()).into());
    };

    let identity = state.engine.authenticate(auth_header.token()).await?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/properties", get(properties::list))
        .route("/properties/{id}", get(properties::get))
        .route("/agents", get(agents::list))
        .route("/agents/{id}", get(agents::get));

    let private = Router::new()
        .route("/bookings", post(bookings::create).get(bookings::list))
        .route("/bookings/{id}", get(bookings::get))
        .route("/bookings/{id}/confirm", post(bookings::confirm))
        .route("/bookings/{id}/cancel", post(bookings::cancel))
        .route("/properties", post(properties::create))
        .route(
            "/properties/{id}",
            axum::routing::put(properties::update).delete(properties::delete),
        )
        .route("/admin/overview", get(admin::overview))
        .route("/admin/users", get(admin::users))
        .route("/admin/properties", get(admin::properties))
        .route("/admin/users/{id}/deactivate", post(admin::deactivate_user))
        .route(
            "/admin/properties/{id}/deactivate",
            post(admin::deactivate_property),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    public.merge(private).with_state(state)
}

pub async fn run(engine: Engine, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
