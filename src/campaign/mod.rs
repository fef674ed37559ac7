use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod form;
pub mod listing;
pub mod manager;
pub use endpoints::*;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub description: String,
    pub status: CampaignStatus,
    pub leads: Vec<String>,
    pub account_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn is_visible(&self) -> bool {
        self.status != CampaignStatus::Deleted
    }
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Inactive,
    Deleted,
}

impl Default for CampaignStatus {
    fn default() -> CampaignStatus {
        CampaignStatus::Active
    }
}

/// The fields needed to create a campaign. Anything not given falls back to
/// an active campaign without leads or accounts.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct NewCampaign {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<CampaignStatus>,
    #[serde(default)]
    pub leads: Option<Vec<String>>,
    #[serde(default)]
    pub account_ids: Option<Vec<String>>,
}

/// A partial campaign for editing; only the fields that are `Some` replace
/// the stored values.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CampaignPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<CampaignStatus>,
    #[serde(default)]
    pub leads: Option<Vec<String>>,
    #[serde(default)]
    pub account_ids: Option<Vec<String>>,
}

impl CampaignPatch {
    pub fn apply(self, campaign: &mut Campaign) {
        if let Some(name) = self.name {
            campaign.name = name;
        }
        if let Some(description) = self.description {
            campaign.description = description;
        }
        if let Some(status) = self.status {
            campaign.status = status;
        }
        if let Some(leads) = self.leads {
            campaign.leads = leads;
        }
        if let Some(account_ids) = self.account_ids {
            campaign.account_ids = account_ids;
        }
    }
}
