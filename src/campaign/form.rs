//! Drafting of campaigns before they reach the store.
//!
//! Everything that comes out of this module is already validated: required
//! fields are present and lead/account lists contain no blank entries.

use serde::{Deserialize, Serialize};

use crate::error::Error;

use super::{Campaign, CampaignId, CampaignPatch, CampaignStatus, NewCampaign};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FormMode {
    Create,
    Edit(CampaignId),
}

/// The statuses a user may pick in the form. Deleting goes through its own
/// operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    Active,
    Inactive,
}

impl From<FormStatus> for CampaignStatus {
    fn from(status: FormStatus) -> CampaignStatus {
        match status {
            FormStatus::Active => CampaignStatus::Active,
            FormStatus::Inactive => CampaignStatus::Inactive,
        }
    }
}

/// An editable list of free-text entries that always shows at least one slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntrySlots {
    entries: Vec<String>,
}

impl EntrySlots {
    pub fn new(entries: &[String]) -> EntrySlots {
        if entries.is_empty() {
            EntrySlots {
                entries: vec![String::new()],
            }
        } else {
            EntrySlots {
                entries: entries.to_vec(),
            }
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn add(&mut self) {
        self.entries.push(String::new());
    }

    pub fn update(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                *entry = value.into();
                true
            }
            None => false,
        }
    }

    /// Removing the last remaining slot is refused.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.entries.len() <= 1 || index >= self.entries.len() {
            return false;
        }

        self.entries.remove(index);
        true
    }

    pub fn cleaned(&self) -> Vec<String> {
        clean_entries(self.entries.iter().cloned())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CampaignSubmission {
    Create(NewCampaign),
    Edit(CampaignId, CampaignPatch),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CampaignForm {
    mode: FormMode,
    pub name: String,
    pub description: String,
    pub status: FormStatus,
    pub leads: EntrySlots,
    pub account_ids: EntrySlots,
}

impl CampaignForm {
    pub fn open(campaign: Option<&Campaign>) -> CampaignForm {
        match campaign {
            Some(campaign) => CampaignForm {
                mode: FormMode::Edit(campaign.id),
                name: campaign.name.clone(),
                description: campaign.description.clone(),
                status: match campaign.status {
                    CampaignStatus::Active => FormStatus::Active,
                    CampaignStatus::Inactive | CampaignStatus::Deleted => FormStatus::Inactive,
                },
                leads: EntrySlots::new(&campaign.leads),
                account_ids: EntrySlots::new(&campaign.account_ids),
            },
            None => CampaignForm {
                mode: FormMode::Create,
                name: String::new(),
                description: String::new(),
                status: FormStatus::Active,
                leads: EntrySlots::new(&[]),
                account_ids: EntrySlots::new(&[]),
            },
        }
    }

    /// Discards every edit and starts over for the given target.
    pub fn reset(&mut self, campaign: Option<&Campaign>) {
        *self = CampaignForm::open(campaign);
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        missing_required(&self.name, &self.description)
    }

    pub fn can_submit(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn submit(&self) -> Result<CampaignSubmission, Error> {
        let missing_fields = self.missing_fields();
        if !missing_fields.is_empty() {
            return Err(Error::ValidationFailed { missing_fields });
        }

        let submission = match self.mode {
            FormMode::Create => CampaignSubmission::Create(NewCampaign {
                name: self.name.clone(),
                description: self.description.clone(),
                status: Some(self.status.into()),
                leads: Some(self.leads.cleaned()),
                account_ids: Some(self.account_ids.cleaned()),
            }),
            FormMode::Edit(campaign_id) => CampaignSubmission::Edit(
                campaign_id,
                CampaignPatch {
                    name: Some(self.name.clone()),
                    description: Some(self.description.clone()),
                    status: Some(self.status.into()),
                    leads: Some(self.leads.cleaned()),
                    account_ids: Some(self.account_ids.cleaned()),
                },
            ),
        };

        Ok(submission)
    }
}

/// Drops blank and whitespace-only entries, keeping the rest in order.
pub fn clean_entries<I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    entries
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .collect()
}

fn missing_required(name: &str, description: &str) -> Vec<&'static str> {
    let mut missing = vec![];
    if name.trim().is_empty() {
        missing.push("name");
    }
    if description.trim().is_empty() {
        missing.push("description");
    }
    missing
}

pub fn validate_new_campaign(new_campaign: NewCampaign) -> Result<NewCampaign, Error> {
    let missing_fields = missing_required(&new_campaign.name, &new_campaign.description);
    if !missing_fields.is_empty() {
        return Err(Error::ValidationFailed { missing_fields });
    }
    if new_campaign.status == Some(CampaignStatus::Deleted) {
        return Err(Error::InvalidInitialStatus {
            status: CampaignStatus::Deleted,
        });
    }

    Ok(NewCampaign {
        leads: new_campaign.leads.map(clean_entries),
        account_ids: new_campaign.account_ids.map(clean_entries),
        ..new_campaign
    })
}

/// A patch may leave name and description out, but may not blank them.
pub fn validate_patch(patch: CampaignPatch) -> Result<CampaignPatch, Error> {
    let mut missing_fields = vec![];
    if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
        missing_fields.push("name");
    }
    if matches!(&patch.description, Some(description) if description.trim().is_empty()) {
        missing_fields.push("description");
    }
    if !missing_fields.is_empty() {
        return Err(Error::ValidationFailed { missing_fields });
    }

    Ok(CampaignPatch {
        leads: patch.leads.map(clean_entries),
        account_ids: patch.account_ids.map(clean_entries),
        ..patch
    })
}
