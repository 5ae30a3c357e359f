//! Indexes backing the availability query and the per-caller booking lists.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Bookings {
    Table,
    PropertyId,
    GuestId,
    Status,
    CheckInDate,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-property_id-status-check_in_date")
                    .table(Bookings::Table)
                    .col(Bookings::PropertyId)
                    .col(Bookings::Status)
                    .col(Bookings::CheckInDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-guest_id-created_at")
                    .table(Bookings::Table)
                    .col(Bookings::GuestId)
                    .col(Bookings::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-bookings-guest_id-created_at")
                    .table(Bookings::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-bookings-property_id-status-check_in_date")
                    .table(Bookings::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
