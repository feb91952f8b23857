//! Create `service_version` table with FK to `service`.
//!
//! Versions are owned by their service and removed with it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceVersion::Table)
                    .if_not_exists()
                    .col(pk_auto(ServiceVersion::Id))
                    .col(integer(ServiceVersion::ServiceId).not_null())
                    .col(string_len(ServiceVersion::Version, 64).not_null())
                    .col(
                        timestamp_with_time_zone(ServiceVersion::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_version_service")
                            .from(ServiceVersion::Table, ServiceVersion::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceVersion::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceVersion { Table, Id, ServiceId, Version, CreatedAt }

#[derive(DeriveIden)]
enum Service { Table, Id }
