use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

use outreach_nexus::config::load_settings;
use outreach_nexus::error::Error;

#[actix_web::main]
async fn main() -> Result<(), Error> {
    let settings = load_settings()?;

    tracing_subscriber::fmt()
        .with_max_level(settings.log_level)
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    info!(
        bind_addr = %settings.bind_addr,
        generation_delay = ?settings.generation_delay,
        soft_delete_policy = %settings.soft_delete_policy,
        seed_demo_data = settings.seed_demo_data,
        "loaded settings"
    );

    outreach_nexus::run(settings).await
}
