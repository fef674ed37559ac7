use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;

use super::form::CampaignSubmission;
use super::listing::{self, CampaignSummary};
use super::{Campaign, CampaignId, CampaignPatch, CampaignStatus, NewCampaign};

/// Whether soft-deleting a campaign counts as a modification of it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoftDeletePolicy {
    #[serde(alias = "preserve")]
    PreserveUpdatedAt,
    #[serde(alias = "refresh")]
    RefreshUpdatedAt,
}

pub const DEFAULT_SOFT_DELETE_POLICY: SoftDeletePolicy = SoftDeletePolicy::PreserveUpdatedAt;

impl Default for SoftDeletePolicy {
    fn default() -> SoftDeletePolicy {
        DEFAULT_SOFT_DELETE_POLICY
    }
}

impl FromStr for SoftDeletePolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preserve-updated-at" | "preserve" => Ok(SoftDeletePolicy::PreserveUpdatedAt),
            "refresh-updated-at" | "refresh" => Ok(SoftDeletePolicy::RefreshUpdatedAt),
            other => Err(format!("unknown soft delete policy: {}", other)),
        }
    }
}

impl Display for SoftDeletePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            SoftDeletePolicy::PreserveUpdatedAt => f.write_str("preserve-updated-at"),
            SoftDeletePolicy::RefreshUpdatedAt => f.write_str("refresh-updated-at"),
        }
    }
}

// Never earlier than the last recorded modification, even if the clock steps
// backwards.
fn next_updated_at(campaign: &Campaign) -> DateTime<Utc> {
    Utc::now().max(campaign.updated_at)
}

#[tracing::instrument(skip(db))]
pub fn create_campaign(db: &dyn Database, new_campaign: NewCampaign) -> Result<Campaign, Error> {
    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        name: new_campaign.name,
        description: new_campaign.description,
        status: new_campaign.status.unwrap_or_default(),
        leads: new_campaign.leads.unwrap_or_default(),
        account_ids: new_campaign.account_ids.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    db.campaigns().insert_campaign(&campaign)?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub fn get_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_campaigns()?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub fn get_visible_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_campaigns()?;

    Ok(listing::visible_campaigns(campaigns))
}

#[tracing::instrument(skip(db))]
pub fn get_campaign_summary(db: &dyn Database) -> Result<CampaignSummary, Error> {
    let campaigns = db.campaigns().fetch_campaigns()?;

    Ok(CampaignSummary::from_campaigns(&campaigns))
}

#[tracing::instrument(skip(db))]
pub fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Option<Campaign>, Error> {
    let campaign = db.campaigns().fetch_campaign_by_id(campaign_id)?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub fn expect_campaign_by_id(db: &dyn Database, campaign_id: CampaignId) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub fn edit_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
    patch: CampaignPatch,
) -> Result<Campaign, Error> {
    db.campaigns().update_campaign(campaign_id, &mut |campaign| {
        if campaign.status == CampaignStatus::Deleted
            || patch.status == Some(CampaignStatus::Deleted)
        {
            return Err(Error::InvalidTransition {
                campaign_id,
                status: campaign.status,
            });
        }

        campaign.updated_at = next_updated_at(campaign);
        patch.clone().apply(campaign);

        Ok(())
    })
}

#[tracing::instrument(skip(db))]
pub fn toggle_campaign_status(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    db.campaigns().update_campaign(campaign_id, &mut |campaign| {
        campaign.status = match campaign.status {
            CampaignStatus::Active => CampaignStatus::Inactive,
            CampaignStatus::Inactive => CampaignStatus::Active,
            CampaignStatus::Deleted => {
                return Err(Error::InvalidTransition {
                    campaign_id,
                    status: campaign.status,
                });
            }
        };
        campaign.updated_at = next_updated_at(campaign);

        Ok(())
    })
}

#[tracing::instrument(skip(db))]
pub fn delete_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
    policy: SoftDeletePolicy,
) -> Result<Campaign, Error> {
    db.campaigns().update_campaign(campaign_id, &mut |campaign| {
        if campaign.status == CampaignStatus::Deleted {
            return Err(Error::InvalidTransition {
                campaign_id,
                status: campaign.status,
            });
        }

        campaign.status = CampaignStatus::Deleted;
        if policy == SoftDeletePolicy::RefreshUpdatedAt {
            campaign.updated_at = next_updated_at(campaign);
        }

        Ok(())
    })
}

/// Applies a submitted campaign form: creates in create mode, merges the
/// submitted values in edit mode.
#[tracing::instrument(skip(db))]
pub fn save_campaign(db: &dyn Database, submission: CampaignSubmission) -> Result<Campaign, Error> {
    match submission {
        CampaignSubmission::Create(new_campaign) => create_campaign(db, new_campaign),
        CampaignSubmission::Edit(campaign_id, patch) => edit_campaign(db, campaign_id, patch),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::campaign::form::CampaignForm;
    use crate::database::test::MockDatabase;
    use crate::database::MemoryDatabase;

    fn new_campaign(name: &str, description: &str) -> NewCampaign {
        NewCampaign {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    #[test]
    fn can_create_campaign() {
        let mut db = MockDatabase::new();
        let called_insert = Arc::new(Mutex::new(false));
        let called_insert_clone = Arc::clone(&called_insert);
        db.campaigns.on_insert_campaign = Box::new(move |campaign| {
            *called_insert_clone.lock().unwrap() = true;
            assert_eq!(campaign.name, "Tech Startup Outreach".to_string());
            assert_eq!(campaign.created_at, campaign.updated_at);
            Ok(())
        });

        let campaign =
            create_campaign(&db, new_campaign("Tech Startup Outreach", "Founders")).unwrap();

        assert_eq!(campaign.name, "Tech Startup Outreach".to_string());
        assert_eq!(campaign.status, CampaignStatus::Active);
        assert!(campaign.leads.is_empty());
        assert!(campaign.account_ids.is_empty());
        assert_eq!(campaign.created_at, campaign.updated_at);
        assert!(
            *called_insert.lock().unwrap(),
            "db.insert_campaign was not called"
        );
    }

    #[test]
    fn create_keeps_given_optional_fields() {
        let db = MemoryDatabase::new();

        let campaign = create_campaign(
            &db,
            NewCampaign {
                name: "Enterprise Sales Campaign".into(),
                description: "SaaS".into(),
                status: Some(CampaignStatus::Inactive),
                leads: Some(vec!["https://linkedin.com/in/enterprise-cto".into()]),
                account_ids: Some(vec!["acc_003".into()]),
            },
        )
        .unwrap();

        assert_eq!(campaign.status, CampaignStatus::Inactive);
        assert_eq!(campaign.leads.len(), 1);
        assert_eq!(campaign.account_ids, vec!["acc_003".to_string()]);
    }

    #[test]
    fn rapid_creates_have_unique_ids() {
        let db = MemoryDatabase::new();

        let ids: HashSet<_> = (0..1000)
            .map(|i| {
                create_campaign(&db, new_campaign(&format!("campaign {}", i), "burst"))
                    .unwrap()
                    .id
            })
            .collect();

        assert_eq!(ids.len(), 1000);
        assert_eq!(get_campaigns(&db).unwrap().len(), 1000);
    }

    #[test]
    fn expect_campaign_by_id_returns_error_if_doesnt_exist() {
        let mut db = MockDatabase::new();
        let test_campaign_id = CampaignId::new();
        let called_get_by_id = Arc::new(Mutex::new(false));
        let called_get_by_id_clone = Arc::clone(&called_get_by_id);
        db.campaigns.on_fetch_campaign_by_id = Box::new(move |campaign_id| {
            *called_get_by_id_clone.lock().unwrap() = true;
            assert_eq!(campaign_id, test_campaign_id);
            Ok(None)
        });

        let campaign_result = expect_campaign_by_id(&db, test_campaign_id);

        assert_eq!(
            campaign_result.unwrap_err(),
            Error::CampaignNotFound {
                campaign_id: test_campaign_id
            }
        );
        assert!(
            *called_get_by_id.lock().unwrap(),
            "db.fetch_campaign_by_id was not called"
        );
    }

    #[test]
    fn mutations_of_unknown_campaign_are_not_found() {
        let db = MemoryDatabase::new();
        let campaign_id = CampaignId::new();
        let not_found = Error::CampaignNotFound { campaign_id };

        assert_eq!(
            edit_campaign(&db, campaign_id, CampaignPatch::default()).unwrap_err(),
            not_found
        );
        assert_eq!(
            toggle_campaign_status(&db, campaign_id).unwrap_err(),
            not_found
        );
        assert_eq!(
            delete_campaign(&db, campaign_id, DEFAULT_SOFT_DELETE_POLICY).unwrap_err(),
            not_found
        );
    }

    #[test]
    fn edit_overrides_only_given_fields() {
        let db = MemoryDatabase::new();
        let created = create_campaign(
            &db,
            NewCampaign {
                leads: Some(vec!["https://linkedin.com/in/john-doe".into()]),
                ..new_campaign("A", "B")
            },
        )
        .unwrap();

        let edited = edit_campaign(
            &db,
            created.id,
            CampaignPatch {
                description: Some("C".into()),
                account_ids: Some(vec!["acc_001".into()]),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(edited.id, created.id);
        assert_eq!(edited.name, "A");
        assert_eq!(edited.description, "C");
        assert_eq!(edited.leads, created.leads);
        assert_eq!(edited.account_ids, vec!["acc_001".to_string()]);
        assert_eq!(edited.created_at, created.created_at);
        assert!(edited.updated_at >= created.updated_at);
        assert_eq!(get_campaign_by_id(&db, created.id).unwrap(), Some(edited));
    }

    #[test]
    fn edit_cannot_delete_or_touch_deleted_campaigns() {
        let db = MemoryDatabase::new();
        let created = create_campaign(&db, new_campaign("A", "B")).unwrap();

        let result = edit_campaign(
            &db,
            created.id,
            CampaignPatch {
                status: Some(CampaignStatus::Deleted),
                ..Default::default()
            },
        );
        assert_eq!(
            result.unwrap_err(),
            Error::InvalidTransition {
                campaign_id: created.id,
                status: CampaignStatus::Active,
            }
        );

        delete_campaign(&db, created.id, DEFAULT_SOFT_DELETE_POLICY).unwrap();
        let result = edit_campaign(
            &db,
            created.id,
            CampaignPatch {
                name: Some("revived".into()),
                ..Default::default()
            },
        );
        assert_eq!(
            result.unwrap_err(),
            Error::InvalidTransition {
                campaign_id: created.id,
                status: CampaignStatus::Deleted,
            }
        );
    }

    #[test]
    fn toggle_twice_returns_to_start() {
        let db = MemoryDatabase::new();
        let created = create_campaign(&db, new_campaign("A", "B")).unwrap();

        let toggled = toggle_campaign_status(&db, created.id).unwrap();
        assert_eq!(toggled.status, CampaignStatus::Inactive);
        assert!(toggled.updated_at >= created.updated_at);

        let toggled = toggle_campaign_status(&db, created.id).unwrap();
        assert_eq!(toggled.status, CampaignStatus::Active);
        assert!(toggled.created_at <= toggled.updated_at);
    }

    #[test]
    fn edit_decides_against_the_stored_campaign() {
        let mut db = MockDatabase::new();
        let now = Utc::now();
        let stored = Campaign {
            id: CampaignId::new(),
            name: "A".into(),
            description: "B".into(),
            status: CampaignStatus::Inactive,
            leads: vec![],
            account_ids: vec![],
            created_at: now,
            updated_at: now,
        };
        let stored_clone = stored.clone();
        db.campaigns.on_update_campaign = Box::new(
            move |campaign_id: CampaignId,
                  update: &mut dyn FnMut(&mut Campaign) -> Result<(), Error>| {
                assert_eq!(campaign_id, stored_clone.id);
                let mut campaign = stored_clone.clone();
                update(&mut campaign)?;
                Ok(campaign)
            },
        );

        let edited = edit_campaign(
            &db,
            stored.id,
            CampaignPatch {
                name: Some("A2".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(edited.name, "A2");
        assert_eq!(edited.status, CampaignStatus::Inactive);
        assert!(edited.updated_at >= stored.updated_at);
    }

    #[test]
    fn concurrent_toggles_never_conflict() {
        let db = MemoryDatabase::new();
        let created = create_campaign(&db, new_campaign("A", "B")).unwrap();

        let errors = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..50)
                            .filter_map(|_| toggle_campaign_status(&db, created.id).err())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            workers
                .into_iter()
                .flat_map(|worker| worker.join().unwrap())
                .collect::<Vec<_>>()
        });

        assert_eq!(errors, vec![]);
        let stored = expect_campaign_by_id(&db, created.id).unwrap();
        assert_eq!(stored.status, CampaignStatus::Active);
        assert!(stored.updated_at >= created.updated_at);
    }

    #[test]
    fn concurrent_toggle_and_delete_both_apply() {
        let db = MemoryDatabase::new();
        let created = create_campaign(&db, new_campaign("A", "B")).unwrap();

        let (toggled, deleted) = std::thread::scope(|scope| {
            let toggle = scope.spawn(|| toggle_campaign_status(&db, created.id));
            let delete =
                scope.spawn(|| delete_campaign(&db, created.id, DEFAULT_SOFT_DELETE_POLICY));
            (toggle.join().unwrap(), delete.join().unwrap())
        });

        // whichever ran second sees the other's result
        assert!(deleted.is_ok());
        match toggled {
            Ok(campaign) => assert_eq!(campaign.status, CampaignStatus::Inactive),
            Err(err) => assert_eq!(
                err,
                Error::InvalidTransition {
                    campaign_id: created.id,
                    status: CampaignStatus::Deleted,
                }
            ),
        }
        assert_eq!(
            expect_campaign_by_id(&db, created.id).unwrap().status,
            CampaignStatus::Deleted
        );
    }

    #[test]
    fn toggle_of_deleted_campaign_is_rejected() {
        let db = MemoryDatabase::new();
        let created = create_campaign(&db, new_campaign("A", "B")).unwrap();
        let deleted = delete_campaign(&db, created.id, DEFAULT_SOFT_DELETE_POLICY).unwrap();

        assert_eq!(
            toggle_campaign_status(&db, created.id).unwrap_err(),
            Error::InvalidTransition {
                campaign_id: created.id,
                status: CampaignStatus::Deleted,
            }
        );
        assert_eq!(get_campaign_by_id(&db, created.id).unwrap(), Some(deleted));
    }

    #[test]
    fn delete_twice_is_rejected() {
        let db = MemoryDatabase::new();
        let created = create_campaign(&db, new_campaign("A", "B")).unwrap();
        delete_campaign(&db, created.id, DEFAULT_SOFT_DELETE_POLICY).unwrap();

        assert_eq!(
            delete_campaign(&db, created.id, DEFAULT_SOFT_DELETE_POLICY).unwrap_err(),
            Error::InvalidTransition {
                campaign_id: created.id,
                status: CampaignStatus::Deleted,
            }
        );
    }

    #[test]
    fn soft_delete_preserving_updated_at() {
        let db = MemoryDatabase::new();
        let created = create_campaign(&db, new_campaign("A", "B")).unwrap();

        let deleted =
            delete_campaign(&db, created.id, SoftDeletePolicy::PreserveUpdatedAt).unwrap();

        assert_eq!(deleted.status, CampaignStatus::Deleted);
        assert_eq!(deleted.updated_at, created.updated_at);
    }

    #[test]
    fn soft_delete_refreshing_updated_at() {
        let db = MemoryDatabase::new();
        let created = create_campaign(&db, new_campaign("A", "B")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        let deleted =
            delete_campaign(&db, created.id, SoftDeletePolicy::RefreshUpdatedAt).unwrap();

        assert_eq!(deleted.status, CampaignStatus::Deleted);
        assert!(deleted.updated_at > created.updated_at);
        assert_eq!(deleted.created_at, created.created_at);
    }

    #[test]
    fn soft_delete_hides_campaign_but_keeps_it_stored() {
        let db = MemoryDatabase::new();
        let kept = create_campaign(
            &db,
            NewCampaign {
                leads: Some(vec!["https://linkedin.com/in/a".into()]),
                ..new_campaign("kept", "B")
            },
        )
        .unwrap();
        let removed = create_campaign(
            &db,
            NewCampaign {
                leads: Some(vec![
                    "https://linkedin.com/in/b".into(),
                    "https://linkedin.com/in/c".into(),
                ]),
                ..new_campaign("removed", "B")
            },
        )
        .unwrap();

        delete_campaign(&db, removed.id, DEFAULT_SOFT_DELETE_POLICY).unwrap();

        assert_eq!(get_visible_campaigns(&db).unwrap(), vec![kept]);
        assert_eq!(
            get_campaign_summary(&db).unwrap(),
            CampaignSummary {
                total_campaigns: 1,
                active_campaigns: 1,
                total_leads: 1,
            }
        );
        let stored = expect_campaign_by_id(&db, removed.id).unwrap();
        assert_eq!(stored.status, CampaignStatus::Deleted);
        assert_eq!(get_campaigns(&db).unwrap().len(), 2);
    }

    #[test]
    fn create_edit_delete_scenario() {
        let db = MemoryDatabase::new();

        let created = create_campaign(&db, new_campaign("A", "B")).unwrap();
        assert_eq!(get_campaigns(&db).unwrap().len(), 1);
        assert_eq!(created.status, CampaignStatus::Active);
        assert!(created.leads.is_empty());
        assert!(created.account_ids.is_empty());

        let edited = edit_campaign(
            &db,
            created.id,
            CampaignPatch {
                status: Some(CampaignStatus::Inactive),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(edited.id, created.id);
        assert_eq!(edited.status, CampaignStatus::Inactive);
        assert_eq!(edited.name, "A");
        assert_eq!(edited.description, "B");

        delete_campaign(&db, created.id, DEFAULT_SOFT_DELETE_POLICY).unwrap();
        assert!(get_visible_campaigns(&db).unwrap().is_empty());
        let raw = get_campaigns(&db).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].status, CampaignStatus::Deleted);
    }

    #[test]
    fn save_dispatches_on_form_mode() {
        let db = MemoryDatabase::new();

        let mut form = CampaignForm::open(None);
        form.name = "A".into();
        form.description = "B".into();
        form.leads.update(0, "");
        form.leads.add();
        form.leads.update(1, "https://linkedin.com/in/tech-founder");
        let created = save_campaign(&db, form.submit().unwrap()).unwrap();
        assert_eq!(
            created.leads,
            vec!["https://linkedin.com/in/tech-founder".to_string()]
        );

        let mut form = CampaignForm::open(Some(&created));
        form.name = "A2".into();
        let edited = save_campaign(&db, form.submit().unwrap()).unwrap();

        assert_eq!(edited.id, created.id);
        assert_eq!(edited.name, "A2");
        assert_eq!(edited.leads, created.leads);
        assert_eq!(get_campaigns(&db).unwrap().len(), 1);
    }

    #[test]
    fn soft_delete_policy_parses_from_config_values() {
        assert_eq!(
            "refresh".parse::<SoftDeletePolicy>().unwrap(),
            SoftDeletePolicy::RefreshUpdatedAt
        );
        assert_eq!(
            "preserve-updated-at".parse::<SoftDeletePolicy>().unwrap(),
            SoftDeletePolicy::PreserveUpdatedAt
        );
        assert!("sometimes".parse::<SoftDeletePolicy>().is_err());
    }
}
