mod registry;
mod repository;
mod routes;
mod state;
mod ws;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use tokio::net::TcpListener;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let bind_addr =
        std::env::var("ROADSENSE_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let app_state = AppState::new(&database_url).await?;

    let router = Router::new()
        .route("/records", post(routes::ingest).get(routes::list_records))
        .route(
            "/records/{id}",
            get(routes::fetch_record)
                .put(routes::update_record)
                .delete(routes::delete_record),
        )
        .route("/ws", get(ws::subscribe))
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
