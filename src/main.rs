use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use intake_core::config::{core_config_from_env_values, EnvValues};
use intake_core::gateway::gateway_from_env_values;
use intake_core::IntakeService;

/// Main entry point for the clinic intake server
///
/// Resolves configuration once, connects the records gateway and serves the REST API with
/// OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `INTAKE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `INTAKE_CLINIC_ID`, `INTAKE_DISPLAY_UTC_OFFSET`: clinic stamping and display settings
/// - `INTAKE_MESSAGING_DOMAIN`, `INTAKE_COUNTRY_PREFIX`, `INTAKE_REVIEW_URL`: WhatsApp settings
/// - `INTAKE_GATEWAY_URL`, `INTAKE_GATEWAY_TOKEN`: remote records service (unset: in-memory)
/// - `INTAKE_SEED_FILE`: YAML records preloaded into the in-memory gateway
/// - `INTAKE_STAFF_API_KEY`: `x-api-key` required on staff routes
///
/// # Errors
/// Returns an error if configuration is invalid, the seed file cannot be loaded, the address
/// cannot be bound, or the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake_run=info".parse()?)
                .add_directive("intake_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("INTAKE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(core_config_from_env_values(EnvValues::from_process_env())?);
    let gateway_cfg = gateway_from_env_values(
        std::env::var("INTAKE_GATEWAY_URL").ok(),
        std::env::var("INTAKE_GATEWAY_TOKEN").ok(),
        std::env::var("INTAKE_SEED_FILE").ok(),
    );
    let gateway = gateway_cfg.connect()?;

    let staff_api_key = std::env::var("INTAKE_STAFF_API_KEY").ok();
    if staff_api_key.is_none() {
        tracing::warn!("INTAKE_STAFF_API_KEY not set; staff routes are open");
    }

    tracing::info!(
        clinic = %cfg.clinic_id(),
        offset = %cfg.display_offset(),
        "++ Starting clinic intake REST on {}",
        rest_addr
    );

    let service = Arc::new(IntakeService::new(cfg, gateway));
    let app = router(AppState::new(service, staff_api_key));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
