use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::campaign::{Campaign, CampaignId, CampaignStatus};
use crate::database::Database;
use crate::error::Error;

const TECH_STARTUP_ID: CampaignId =
    CampaignId::from_uuid(Uuid::from_u128(0x16E77539_8873_4C8A_BCA3_2036010474AD));
const ENTERPRISE_SALES_ID: CampaignId =
    CampaignId::from_uuid(Uuid::from_u128(0x5EA81D0A_9788_4B8A_82D9_1A0D636B53CE));

fn date(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>, Error> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::ExistentialState(format!("invalid seed date {}-{}-{}", year, month, day)))
}

pub fn demo_campaigns() -> Result<Vec<Campaign>, Error> {
    Ok(vec![
        Campaign {
            id: TECH_STARTUP_ID,
            name: "Tech Startup Outreach".to_string(),
            description: "Reaching out to tech startup founders for collaboration opportunities"
                .to_string(),
            status: CampaignStatus::Active,
            leads: vec![
                "https://linkedin.com/in/john-doe".to_string(),
                "https://linkedin.com/in/jane-smith".to_string(),
                "https://linkedin.com/in/tech-founder".to_string(),
            ],
            account_ids: vec!["acc_001".to_string(), "acc_002".to_string()],
            created_at: date(2024, 1, 15)?,
            updated_at: date(2024, 1, 20)?,
        },
        Campaign {
            id: ENTERPRISE_SALES_ID,
            name: "Enterprise Sales Campaign".to_string(),
            description: "Targeting enterprise clients for our SaaS platform".to_string(),
            status: CampaignStatus::Inactive,
            leads: vec![
                "https://linkedin.com/in/enterprise-cto".to_string(),
                "https://linkedin.com/in/decision-maker".to_string(),
            ],
            account_ids: vec!["acc_003".to_string()],
            created_at: date(2024, 1, 10)?,
            updated_at: date(2024, 1, 18)?,
        },
    ])
}

#[tracing::instrument(skip(db))]
pub fn seed(db: &dyn Database) -> Result<(), Error> {
    for campaign in demo_campaigns()? {
        db.campaigns().insert_campaign(&campaign)?;
    }

    Ok(())
}
