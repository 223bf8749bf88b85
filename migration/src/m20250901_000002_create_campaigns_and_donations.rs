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
enum Campaigns {
    Table,
    Id,
    Title,
    Description,
    GoalAmount,
    CurrencyId,
    CategoryId,
    StatusId,
    UrgencyLevelId,
    StartDate,
    EndDate,
    TargetBeneficiaries,
    ImageUrl,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

/// 活动募捐汇总（冗余统计，随捐款增删同步维护）
#[derive(DeriveIden)]
enum CampaignStatistics {
    Table,
    Id,
    CampaignId,
    CurrentAmount,
    DonationsCount,
    UniqueDonorsCount,
    AverageDonation,
    CompletionPercentage,
    LastDonationAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Donors {
    Table,
    Id,
    UserId,
    DisplayName,
    Email,
    IsAnonymous,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Donations {
    Table,
    Id,
    Amount,
    CurrencyId,
    DonorId,
    CampaignId,
    PaymentMethodId,
    PaymentStatusId,
    IsAnonymous,
    IsRecurring,
    FrequencyId,
    ProcessingFee,
    NetAmount,
    Message,
    DonatedAt,
    ProcessedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 金额字段统一使用美分 (big integer)
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Campaigns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Campaigns::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Campaigns::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Campaigns::Description).text().not_null())
                    .col(ColumnDef::new(Campaigns::GoalAmount).big_integer().not_null())
                    .col(ColumnDef::new(Campaigns::CurrencyId).big_integer().not_null())
                    .col(ColumnDef::new(Campaigns::CategoryId).big_integer().not_null())
                    .col(ColumnDef::new(Campaigns::StatusId).big_integer().not_null())
                    .col(ColumnDef::new(Campaigns::UrgencyLevelId).big_integer().null())
                    .col(ColumnDef::new(Campaigns::StartDate).date().not_null())
                    .col(ColumnDef::new(Campaigns::EndDate).date().null())
                    .col(ColumnDef::new(Campaigns::TargetBeneficiaries).integer().null())
                    .col(ColumnDef::new(Campaigns::ImageUrl).text().null())
                    .col(ColumnDef::new(Campaigns::CreatedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Campaigns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Campaigns::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_campaigns_currency")
                            .from(Campaigns::Table, Campaigns::CurrencyId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_campaigns_category")
                            .from(Campaigns::Table, Campaigns::CategoryId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_campaigns_status")
                            .from(Campaigns::Table, Campaigns::StatusId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_campaigns_created_by")
                            .from(Campaigns::Table, Campaigns::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CampaignStatistics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CampaignStatistics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CampaignStatistics::CampaignId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(CampaignStatistics::CurrentAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CampaignStatistics::DonationsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CampaignStatistics::UniqueDonorsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CampaignStatistics::AverageDonation)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CampaignStatistics::CompletionPercentage)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(CampaignStatistics::LastDonationAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CampaignStatistics::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_campaign_statistics_campaign")
                            .from(CampaignStatistics::Table, CampaignStatistics::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Donors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donors::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Donors::UserId).big_integer().null().unique_key())
                    .col(ColumnDef::new(Donors::DisplayName).string_len(200).not_null())
                    .col(ColumnDef::new(Donors::Email).string_len(320).null())
                    .col(
                        ColumnDef::new(Donors::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Donors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Donors::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donors_user")
                            .from(Donors::Table, Donors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Donations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Donations::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Donations::CurrencyId).big_integer().not_null())
                    .col(ColumnDef::new(Donations::DonorId).big_integer().not_null())
                    // NULL = general fund
                    .col(ColumnDef::new(Donations::CampaignId).big_integer().null())
                    .col(ColumnDef::new(Donations::PaymentMethodId).big_integer().not_null())
                    .col(ColumnDef::new(Donations::PaymentStatusId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Donations::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Donations::IsRecurring)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Donations::FrequencyId).big_integer().null())
                    .col(
                        ColumnDef::new(Donations::ProcessingFee)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Donations::NetAmount).big_integer().not_null())
                    .col(ColumnDef::new(Donations::Message).text().null())
                    .col(
                        ColumnDef::new(Donations::DonatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Donations::ProcessedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Donations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Donations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donations_donor")
                            .from(Donations::Table, Donations::DonorId)
                            .to(Donors::Table, Donors::Id),
                    )
                    // 删除活动时捐款转入通用基金，不删除捐款记录
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donations_campaign")
                            .from(Donations::Table, Donations::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donations_currency")
                            .from(Donations::Table, Donations::CurrencyId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donations_payment_method")
                            .from(Donations::Table, Donations::PaymentMethodId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donations_payment_status")
                            .from(Donations::Table, Donations::PaymentStatusId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_donations_campaign")
                    .table(Donations::Table)
                    .col(Donations::CampaignId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_donations_donor")
                    .table(Donations::Table)
                    .col(Donations::DonorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：捐款 -> 捐赠人 -> 统计 -> 活动
        manager
            .drop_table(Table::drop().if_exists().table(Donations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Donors::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(CampaignStatistics::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Campaigns::Table).to_owned())
            .await?;
        Ok(())
    }
}
