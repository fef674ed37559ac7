use serde::{Deserialize, Serialize};

use super::{Campaign, CampaignStatus};

/// Campaigns a user gets to see, in the order they were created.
pub fn visible_campaigns(campaigns: Vec<Campaign>) -> Vec<Campaign> {
    campaigns.into_iter().filter(Campaign::is_visible).collect()
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct CampaignSummary {
    pub total_campaigns: usize,
    pub active_campaigns: usize,
    pub total_leads: usize,
}

impl CampaignSummary {
    /// Deleted campaigns never contribute to any of the counts.
    pub fn from_campaigns(campaigns: &[Campaign]) -> CampaignSummary {
        campaigns
            .iter()
            .filter(|campaign| campaign.is_visible())
            .fold(CampaignSummary::default(), |mut summary, campaign| {
                summary.total_campaigns += 1;
                if campaign.status == CampaignStatus::Active {
                    summary.active_campaigns += 1;
                }
                summary.total_leads += campaign.leads.len();
                summary
            })
    }
}
