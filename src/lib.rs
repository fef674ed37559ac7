use actix_web::web::{self, Data, JsonConfig, PathConfig, ServiceConfig};
use actix_web::{App, HttpServer, ResponseError};
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod campaign;
pub mod config;
pub mod database;
pub mod error;
pub mod message;
pub mod seed;
pub mod typedid;

use crate::config::Settings;
use crate::database::{Database, MemoryDatabase};
use crate::error::Error;
use crate::message::MessageComposer;

/// Everything the request handlers share. The campaign store is only reached
/// through the database handle held here.
#[derive(Clone)]
pub struct AppState {
    db: Data<Box<dyn Database>>,
    composer: Data<MessageComposer>,
    settings: Data<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> AppState {
        let composer = MessageComposer::with_delay(settings.generation_delay);
        AppState::with_parts(settings, Box::new(MemoryDatabase::new()), composer)
    }

    pub fn with_parts(
        settings: Settings,
        db: Box<dyn Database>,
        composer: MessageComposer,
    ) -> AppState {
        AppState {
            db: Data::new(db),
            composer: Data::new(composer),
            settings: Data::new(settings),
        }
    }

    pub fn database(&self) -> &dyn Database {
        &***self.db
    }

    pub fn composer(&self) -> &MessageComposer {
        &self.composer
    }

    pub fn configure(&self, cfg: &mut ServiceConfig) {
        cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
            // format json errors with custom format
            Error::InvalidJson(err).into()
        }))
        .app_data(PathConfig::default().error_handler(|err, _req| {
            // format path errors with custom format
            Error::InvalidPath(err).into()
        }))
        .app_data(self.db.clone())
        .app_data(self.composer.clone())
        .app_data(self.settings.clone())
        .service(campaign::endpoints::create_campaign)
        .service(campaign::endpoints::get_campaigns)
        .service(campaign::endpoints::get_campaign_summary)
        .service(campaign::endpoints::get_campaign_by_id)
        .service(campaign::endpoints::edit_campaign)
        .service(campaign::endpoints::toggle_campaign_status)
        .service(campaign::endpoints::delete_campaign)
        .service(message::endpoints::generate_message)
        .service(message::endpoints::get_current_message)
        .service(message::endpoints::clear_current_message)
        .service(message::endpoints::copy_current_message)
        .service(message::endpoints::get_sample_profile)
        .service(message::endpoints::get_demo_profile);
    }
}

pub async fn run(settings: Settings) -> Result<(), Error> {
    let state = AppState::new(settings.clone());

    if settings.seed_demo_data {
        info!("seeding demo campaigns");
        seed::seed(state.database())?;
    }

    info!("listening on {}", settings.bind_addr);
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(TracingLogger::default())
            .configure(|cfg| state.configure(cfg))
            .default_service(web::to(|| async { Error::PathNotFound.error_response() }))
    })
    .bind(settings.bind_addr.as_str())?
    .run()
    .await?;

    Ok(())
}
