use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gbif_client::GbifClient;
use inaturalist_client::INatClient;
use naturecard_cards::CardWriter;
use naturecard_common::Config;
use naturecard_species::{AggregatorConfig, SpeciesAggregator};

mod rest;

pub type Aggregator = SpeciesAggregator<INatClient, GbifClient>;

pub struct AppState {
    pub aggregator: Aggregator,
    /// `None` when no gateway token is configured.
    pub writer: Option<CardWriter>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.provider_timeout_secs);

        let primary = INatClient::new()
            .with_base_url(&config.inaturalist_base_url)
            .with_timeout(timeout);
        let secondary = GbifClient::new()
            .with_base_url(&config.gbif_base_url)
            .with_timeout(timeout);

        let aggregator = SpeciesAggregator::new(primary, secondary).with_config(AggregatorConfig {
            concurrency: config.fetch_concurrency,
            ..AggregatorConfig::default()
        });

        Self {
            aggregator,
            writer: CardWriter::from_config(config),
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // REST API
        .route("/api/species", get(rest::api_species))
        .route("/api/species/{source}/{id}/summary", get(rest::api_species_summary))
        .route(
            "/api/species/{source}/{id}/observations",
            get(rest::api_species_observations),
        )
        .route("/api/generate", post(rest::api_generate))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("naturecard=info".parse()?))
        .init();

    let config = Config::from_env()?;
    let state = Arc::new(AppState::from_config(&config));

    if state.writer.is_none() {
        info!("LLM_GATEWAY_TOKEN not set, card generation disabled");
    }

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("NatureCard API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
