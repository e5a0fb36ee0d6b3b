pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

/// Catalog protocol plus the local control endpoints.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::handle_overview))
        .route("/interfaces", get(handlers::handle_interfaces))
        .route("/interfaces/{name}", get(handlers::handle_interface))
        .route("/specifications", get(handlers::handle_all_specifications))
        .route(
            "/specifications/{interface}",
            get(handlers::handle_specifications),
        )
        .route(
            "/specifications/{interface}/{name}",
            get(handlers::handle_specification_content),
        )
        .route("/implementations", get(handlers::handle_all_implementations))
        .route(
            "/implementations/{interface}",
            get(handlers::handle_implementations),
        )
        .route(
            "/implementations/{interface}/{name}",
            get(handlers::handle_implementation_content),
        )
        .route("/neighbors", get(handlers::handle_neighbors))
        .route("/status", get(handlers::handle_status))
        .route("/sync", post(handlers::handle_sync))
        .route("/evaluate/{interface}", post(handlers::handle_evaluate))
        .with_state(state)
        .layer(cors)
}

pub async fn serve(state: ApiState, bind_addr: &str, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind((bind_addr, port)).await?;
    tracing::info!(bind_addr, port, "catalog API listening");
    serve_listener(listener, state).await
}

/// Serve on an already bound listener.
pub async fn serve_listener(listener: TcpListener, state: ApiState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}
