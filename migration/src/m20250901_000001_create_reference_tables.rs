use sea_orm_migration::prelude::*;

/// Static vocabularies (statuses, categories, currencies ...), one row per (kind, name)
#[derive(DeriveIden)]
enum LookupValues {
    Table,
    Id,
    Kind,
    Name,
    Label,
    SortOrder,
    CreatedAt,
}

/// Local mirror of identities managed by the hosted auth provider
#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    ExternalId,
    Email,
    FirstName,
    LastName,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LookupValues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LookupValues::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LookupValues::Kind).string_len(64).not_null())
                    .col(ColumnDef::new(LookupValues::Name).string_len(64).not_null())
                    .col(ColumnDef::new(LookupValues::Label).string_len(255).not_null())
                    .col(
                        ColumnDef::new(LookupValues::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LookupValues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 种子数据按 (kind, name) 幂等插入，依赖此唯一索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lookup_values_kind_name_unique")
                    .table(LookupValues::Table)
                    .col(LookupValues::Kind)
                    .col(LookupValues::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::ExternalId)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(320).null())
                    .col(ColumnDef::new(Users::FirstName).string_len(100).null())
                    .col(ColumnDef::new(Users::LastName).string_len(100).null())
                    .col(ColumnDef::new(Users::ImageUrl).text().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(LookupValues::Table).to_owned())
            .await?;
        Ok(())
    }
}
