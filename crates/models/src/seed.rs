//! Demo catalog used for local development and tests.
//!
//! Eight services with three versions each. Timestamps are spread out so that
//! "newest first" ordering is deterministic even on stores with coarse clocks.

use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, TransactionTrait};
use tracing::info;

use crate::{errors::ModelError, service, service_version};

pub struct SeedService {
    pub name: &'static str,
    pub description: &'static str,
    pub versions: [&'static str; 3],
}

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Turpis non a, pellentesque ipsum aliquet id...";

pub const DEMO_SERVICES: [SeedService; 8] = [
    SeedService { name: "Locate Us", description: LOREM, versions: ["1.0.0", "1.1.0", "2.0.0"] },
    SeedService { name: "Collect Monday", description: LOREM, versions: ["1.0.0", "1.2.0", "2.1.0"] },
    SeedService { name: "Contact Us", description: LOREM, versions: ["1.0.0", "1.1.0", "1.2.0"] },
    SeedService { name: "FX Rates International", description: LOREM, versions: ["1.0.0", "2.0.0", "3.0.0"] },
    SeedService { name: "Notifications", description: LOREM, versions: ["1.0.0", "1.1.0", "1.2.0"] },
    SeedService { name: "Priority Services", description: LOREM, versions: ["1.0.0", "2.0.0", "2.1.0"] },
    SeedService { name: "Reporting", description: LOREM, versions: ["1.0.0", "1.1.0", "2.0.0"] },
    SeedService { name: "Security", description: LOREM, versions: ["1.0.0", "1.1.0", "1.2.0"] },
];

/// Insert `DEMO_SERVICES` when the catalog is empty; returns the number of services inserted.
pub async fn seed_if_empty(db: &DatabaseConnection) -> Result<u64, ModelError> {
    let existing = service::Entity::find().count(db).await?;
    if existing > 0 {
        info!(existing, "catalog already populated, skip seeding");
        return Ok(0);
    }

    let txn = db.begin().await?;
    // 每个服务间隔一分钟、每个版本间隔一秒，保证排序稳定
    let base = Utc::now() - Duration::hours(1);
    for (i, seed) in DEMO_SERVICES.iter().enumerate() {
        let created = base + Duration::minutes(i as i64);
        let svc = service::create(&txn, seed.name, seed.description, created.into()).await?;
        for (j, label) in seed.versions.iter().enumerate() {
            let at = created + Duration::seconds(j as i64 + 1);
            service_version::create(&txn, svc.id, label, at.into()).await?;
        }
    }
    txn.commit().await?;

    let inserted = DEMO_SERVICES.len() as u64;
    info!(inserted, "seeded demo catalog");
    Ok(inserted)
}
