use axum::http::{HeaderValue, Method, header};
use rentsplit::{
    api::{handlers::api_routes, openapi::ApiDoc},
    config::{CONFIG, Config},
    core::{
        errors::RentSplitError,
        scheduler::DailyScheduler,
        services::{Collaborators, RentSplitService, ServiceSettings},
    },
    infrastructure::{
        chain::json_rpc::JsonRpcChain,
        content::in_memory::InMemoryContentStore,
        logging::in_memory::InMemoryActivityLog,
        notifier::{Notifier, in_memory::InMemoryNotifier, webhook::WebhookNotifier},
        payments::{PaymentProcessor, http::HttpPaymentProcessor, simulated::SimulatedPaymentProcessor},
        storage::in_memory::InMemoryStorage,
    },
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Real adapters where configured, in-process stand-ins otherwise.
fn collaborators(config: &Config) -> Result<Collaborators, RentSplitError> {
    let payments: Arc<dyn PaymentProcessor> = match config.payment_credentials() {
        Some((app_id, api_key)) => Arc::new(HttpPaymentProcessor::new(
            &config.payments_base_url,
            app_id,
            api_key,
            config.http_timeout,
        )?),
        None => {
            warn!("Payment credentials not set, charges are simulated");
            Arc::new(SimulatedPaymentProcessor::new())
        }
    };
    let notifier: Arc<dyn Notifier> = match &config.messaging_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url, config.http_timeout)?),
        None => {
            warn!("Messaging webhook not set, group messages stay in memory");
            Arc::new(InMemoryNotifier::new())
        }
    };
    Ok(Collaborators {
        notifier,
        payments,
        content: Arc::new(InMemoryContentStore::new(
            &config.storage_network,
            config.storage_api_key.is_some(),
        )),
        chain: Arc::new(JsonRpcChain::new(&config.rpc_url, config.http_timeout)?),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&CONFIG.log_level)))
        .init();
    info!(config = ?*CONFIG, "Loaded configuration");

    let settings = ServiceSettings {
        approval_url: CONFIG.approval_url.clone(),
        chain_name: CONFIG.rpc_chain.clone(),
        token_symbol: CONFIG.rpc_token.clone(),
    };
    let service = Arc::new(RentSplitService::new(
        InMemoryStorage::new(),
        InMemoryActivityLog::new(),
        collaborators(&CONFIG)?,
        settings,
    ));

    if CONFIG.scheduler_enabled {
        DailyScheduler::new(service.clone()).spawn();
        info!("Daily scheduler started");
    }

    let cors = CorsLayer::new()
        .allow_origin(CONFIG.frontend_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE]);

    let app = api_routes(service)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
