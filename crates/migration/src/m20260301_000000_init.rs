//! Initial schema migration.
//!
//! Creates the complete schema for Shortlet:
//!
//! - `users`: guests, agents and admins, with their API token
//! - `properties`: listings owned by agents
//! - `bookings`: stays requested by guests on a property

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Role,
    ApiToken,
    IsActive,
    IsVerified,
    CreatedAt,
}

#[derive(Iden)]
enum Properties {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    PriceMinor,
    IsActive,
    BookingRevision,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Bookings {
    Table,
    Id,
    PropertyId,
    GuestId,
    CheckInDate,
    CheckOutDate,
    TotalPriceMinor,
    Status,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("user"),
                    )
                    .col(ColumnDef::new(Users::ApiToken).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-api_token-unique")
                    .table(Users::Table)
                    .col(Users::ApiToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Properties
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Properties::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Properties::OwnerId).string().not_null())
                    .col(ColumnDef::new(Properties::Title).string().not_null())
                    .col(ColumnDef::new(Properties::Description).text().not_null())
                    .col(
                        ColumnDef::new(Properties::PriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Properties::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Properties::BookingRevision)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Properties::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Properties::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-properties-owner_id")
                            .from(Properties::Table, Properties::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-properties-owner_id")
                    .table(Properties::Table)
                    .col(Properties::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Bookings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::PropertyId).string().not_null())
                    .col(ColumnDef::new(Bookings::GuestId).string().not_null())
                    .col(ColumnDef::new(Bookings::CheckInDate).date().not_null())
                    .col(ColumnDef::new(Bookings::CheckOutDate).date().not_null())
                    .col(
                        ColumnDef::new(Bookings::TotalPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Bookings::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Bookings::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-property_id")
                            .from(Bookings::Table, Bookings::PropertyId)
                            .to(Properties::Table, Properties::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-guest_id")
                            .from(Bookings::Table, Bookings::GuestId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
