//! Linkboard server
//!
//! Serves the GraphQL API over HTTP: `POST /graphql` executes
//! operations, `GET /graphql` serves the playground, and `/healthz`
//! answers liveness probes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use linkboard_api::{build_schema, LinkboardSchema};
use linkboard_core::{Config, Store};

mod auth;

#[derive(Parser)]
#[command(name = "linkboard")]
#[command(about = "Linkboard - a link-sharing GraphQL API")]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the listen address
    #[arg(long)]
    listen: Option<String>,
}

#[derive(Clone)]
struct AppState {
    schema: LinkboardSchema,
    store: Arc<Store>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path).context("Failed to load configuration")?,
        None => Config::load().context("Failed to load configuration")?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", config.data_dir))?;

    let store = Arc::new(Store::open(&config).context("Failed to open store")?);
    tracing::info!(
        db = %config.sqlite_path().display(),
        links = store.link_count().unwrap_or(0),
        "store opened"
    );

    let state = AppState {
        schema: build_schema(store.clone()),
        store,
    };

    let app = Router::new()
        .route("/graphql", get(graphql_playground).post(graphql_handler))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

/// Execute a GraphQL request with the caller's identity attached
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let current_user = match auth::resolve_current_user(&state.store, &headers) {
        Ok(current_user) => current_user,
        Err(err) => {
            tracing::error!(error = %err, "failed to resolve request identity");
            return async_graphql::Response::from_errors(vec![async_graphql::ServerError::new(
                "Internal error",
                None,
            )])
            .into();
        }
    };

    state
        .schema
        .execute(req.into_inner().data(current_user))
        .await
        .into()
}

/// GraphQL playground (for development)
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

async fn healthz() -> &'static str {
    "ok"
}
