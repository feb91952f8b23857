use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::{errors, service_version};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Versions,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Versions => Entity::has_many(service_version::Entity).into(),
        }
    }
}

impl Related<service_version::Entity> for Entity {
    fn to() -> RelationDef { Relation::Versions.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if name.chars().count() > 128 {
        return Err(errors::ModelError::Validation("name too long (<=128)".into()));
    }
    Ok(())
}

/// Insert a service with explicit timestamps (used by seeding and imports).
pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: &str,
    created_at: DateTimeWithTimeZone,
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    let am = ActiveModel {
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
