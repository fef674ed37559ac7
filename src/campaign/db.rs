use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Error;

use super::{Campaign, CampaignId};

pub trait CampaignStore: Send + Sync {
    fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error>;

    fn fetch_campaign_by_id(&self, campaign_id: CampaignId) -> Result<Option<Campaign>, Error>;

    /// Runs `update` against the stored campaign and saves the result, with no
    /// other store operation in between. Nothing is saved if `update` fails.
    fn update_campaign(
        &self,
        campaign_id: CampaignId,
        update: &mut dyn FnMut(&mut Campaign) -> Result<(), Error>,
    ) -> Result<Campaign, Error>;
}

/// Campaigns kept in insertion order for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryCampaignStore {
    campaigns: RwLock<Vec<Campaign>>,
}

impl MemoryCampaignStore {
    pub fn new() -> MemoryCampaignStore {
        MemoryCampaignStore::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Campaign>>, Error> {
        self.campaigns
            .read()
            .map_err(|_| Error::ExistentialState("campaign store lock is poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Campaign>>, Error> {
        self.campaigns
            .write()
            .map_err(|_| Error::ExistentialState("campaign store lock is poisoned".into()))
    }
}

impl CampaignStore for MemoryCampaignStore {
    #[tracing::instrument(skip(self))]
    fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        let mut campaigns = self.write()?;
        if campaigns.iter().any(|c| c.id == campaign.id) {
            return Err(Error::DuplicateCampaignId {
                campaign_id: campaign.id,
            });
        }

        campaigns.push(campaign.clone());

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let campaigns = self.read()?.clone();

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    fn fetch_campaign_by_id(&self, campaign_id: CampaignId) -> Result<Option<Campaign>, Error> {
        let campaign = self.read()?.iter().find(|c| c.id == campaign_id).cloned();

        Ok(campaign)
    }

    #[tracing::instrument(skip(self, update))]
    fn update_campaign(
        &self,
        campaign_id: CampaignId,
        update: &mut dyn FnMut(&mut Campaign) -> Result<(), Error>,
    ) -> Result<Campaign, Error> {
        let mut campaigns = self.write()?;
        let stored = campaigns
            .iter_mut()
            .find(|c| c.id == campaign_id)
            .ok_or(Error::CampaignNotFound { campaign_id })?;

        let mut campaign = stored.clone();
        update(&mut campaign)?;
        *stored = campaign.clone();

        Ok(campaign)
    }
}
