use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, patch, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::database::Database;
use crate::error::Error;

use super::listing::CampaignSummary;
use super::{form, manager, Campaign, CampaignId, CampaignPatch, CampaignStatus, NewCampaign};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub name: String,
    pub description: String,
    pub status: CampaignStatus,
    pub leads: Vec<String>,
    pub account_ids: Vec<String>,
    pub lead_count: usize,
    pub account_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            name: campaign.name,
            description: campaign.description,
            status: campaign.status,
            lead_count: campaign.leads.len(),
            account_count: campaign.account_ids.len(),
            leads: campaign.leads,
            account_ids: campaign.account_ids,
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
        }
    }
}

#[post("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: Data<Box<dyn Database>>,
    body: Json<NewCampaign>,
) -> Result<Json<CampaignBody>, Error> {
    let new_campaign = form::validate_new_campaign(body.into_inner())?;

    let campaign = manager::create_campaign(&***db, new_campaign)?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: Data<Box<dyn Database>>) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_visible_campaigns(&***db)?;

    let body = campaigns.into_iter().map(CampaignBody::render).collect();

    Ok(Json(body))
}

#[get("/campaigns/summary")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_summary(
    db: Data<Box<dyn Database>>,
) -> Result<Json<CampaignSummary>, Error> {
    let summary = manager::get_campaign_summary(&***db)?;

    Ok(Json(summary))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::expect_campaign_by_id(&***db, campaign_id)?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[patch("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn edit_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    body: Json<CampaignPatch>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let patch = form::validate_patch(body.into_inner())?;

    let campaign = manager::edit_campaign(&***db, campaign_id, patch)?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[post("/campaigns/{campaign_id}/toggle-status")]
#[tracing::instrument(skip(db))]
pub async fn toggle_campaign_status(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::toggle_campaign_status(&***db, campaign_id)?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[delete("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db, settings))]
pub async fn delete_campaign(
    db: Data<Box<dyn Database>>,
    settings: Data<Settings>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::delete_campaign(&***db, campaign_id, settings.soft_delete_policy)?;

    Ok(Json(CampaignBody::render(campaign)))
}
