use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum LookupValues {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    Line1,
    Line2,
    City,
    Region,
    PostalCode,
    Country,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Title,
    Description,
    StartsAt,
    EndsAt,
    Capacity,
    RegistrationsCount,
    TicketPrice,
    CurrencyId,
    CategoryId,
    StatusId,
    AddressId,
    RegistrationDeadline,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EventRegistrations {
    Table,
    Id,
    EventId,
    UserId,
    StatusId,
    PaymentStatusId,
    RegisteredAt,
    CancelledAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// registrations_count 是活跃报名数的计数器，报名时通过
/// `UPDATE .. WHERE registrations_count < capacity` 原子递增
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Addresses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Addresses::Line1).string_len(255).not_null())
                    .col(ColumnDef::new(Addresses::Line2).string_len(255).null())
                    .col(ColumnDef::new(Addresses::City).string_len(120).not_null())
                    .col(ColumnDef::new(Addresses::Region).string_len(120).null())
                    .col(ColumnDef::new(Addresses::PostalCode).string_len(32).null())
                    .col(ColumnDef::new(Addresses::Country).string_len(2).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Events::Description).text().not_null())
                    .col(
                        ColumnDef::new(Events::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Events::EndsAt).timestamp_with_time_zone().null())
                    // NULL = 不限人数
                    .col(ColumnDef::new(Events::Capacity).integer().null())
                    .col(
                        ColumnDef::new(Events::RegistrationsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Events::TicketPrice)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Events::CurrencyId).big_integer().not_null())
                    .col(ColumnDef::new(Events::CategoryId).big_integer().null())
                    .col(ColumnDef::new(Events::StatusId).big_integer().not_null())
                    .col(ColumnDef::new(Events::AddressId).big_integer().null())
                    .col(
                        ColumnDef::new(Events::RegistrationDeadline)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Events::ImageUrl).text().null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Events::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_currency")
                            .from(Events::Table, Events::CurrencyId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_status")
                            .from(Events::Table, Events::StatusId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_address")
                            .from(Events::Table, Events::AddressId)
                            .to(Addresses::Table, Addresses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventRegistrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventRegistrations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventRegistrations::EventId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventRegistrations::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventRegistrations::StatusId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventRegistrations::PaymentStatusId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventRegistrations::RegisteredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventRegistrations::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_registrations_event")
                            .from(EventRegistrations::Table, EventRegistrations::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_registrations_user")
                            .from(EventRegistrations::Table, EventRegistrations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_registrations_status")
                            .from(EventRegistrations::Table, EventRegistrations::StatusId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 一个用户对同一活动只保留一条报名记录（取消后重新报名复用该行）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_event_registrations_event_user_unique")
                    .table(EventRegistrations::Table)
                    .col(EventRegistrations::EventId)
                    .col(EventRegistrations::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(EventRegistrations::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Addresses::Table).to_owned())
            .await?;
        Ok(())
    }
}
