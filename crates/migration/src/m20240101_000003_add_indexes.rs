use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ServiceVersion: composite unique (service_id, version)
        manager
            .create_index(
                Index::create()
                    .name("uniq_service_version_label")
                    .table(ServiceVersion::Table)
                    .col(ServiceVersion::ServiceId)
                    .col(ServiceVersion::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ServiceVersion: newest-first lookups per service
        manager
            .create_index(
                Index::create()
                    .name("idx_service_version_service_created")
                    .table(ServiceVersion::Table)
                    .col(ServiceVersion::ServiceId)
                    .col(ServiceVersion::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Service: sortable timestamps
        manager
            .create_index(
                Index::create()
                    .name("idx_service_created_at")
                    .table(Service::Table)
                    .col(Service::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_updated_at")
                    .table(Service::Table)
                    .col(Service::UpdatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_service_version_label").table(ServiceVersion::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_version_service_created").table(ServiceVersion::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_created_at").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_updated_at").table(Service::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ServiceVersion { Table, ServiceId, Version, CreatedAt }

#[derive(DeriveIden)]
enum Service { Table, CreatedAt, UpdatedAt }
