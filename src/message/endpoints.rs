use actix_web::web::{Data, Json};
use actix_web::{delete, get, post, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::Error;

use super::composer::{ComposerSnapshot, MessageComposer};
use super::LinkedInProfile;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[post("/messages")]
#[tracing::instrument(skip(composer))]
pub async fn generate_message(
    composer: Data<MessageComposer>,
    body: Json<LinkedInProfile>,
) -> Result<Json<MessageBody>, Error> {
    let pending = composer.generate(body.into_inner())?;

    let message = pending.await?;

    Ok(Json(MessageBody { message }))
}

#[get("/messages/current")]
#[tracing::instrument(skip(composer))]
pub async fn get_current_message(
    composer: Data<MessageComposer>,
) -> Result<Json<ComposerSnapshot>, Error> {
    Ok(Json(composer.snapshot()?))
}

#[delete("/messages/current")]
#[tracing::instrument(skip(composer))]
pub async fn clear_current_message(composer: Data<MessageComposer>) -> Result<HttpResponse, Error> {
    composer.clear()?;

    Ok(HttpResponse::NoContent().finish())
}

#[post("/messages/current/copy")]
#[tracing::instrument(skip(composer))]
pub async fn copy_current_message(
    composer: Data<MessageComposer>,
) -> Result<Json<MessageBody>, Error> {
    let message = composer.copy_to_clipboard()?;

    Ok(Json(MessageBody { message }))
}

#[get("/messages/sample-profile")]
#[tracing::instrument]
pub async fn get_sample_profile() -> Json<LinkedInProfile> {
    Json(LinkedInProfile::sample())
}

#[get("/messages/demo-profile")]
#[tracing::instrument]
pub async fn get_demo_profile() -> Json<LinkedInProfile> {
    Json(LinkedInProfile::demo())
}
