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
enum Events {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum EmergencyContacts {
    Table,
    Id,
    Name,
    Phone,
    Relationship,
}

#[derive(DeriveIden)]
enum Volunteers {
    Table,
    Id,
    UserId,
    Availability,
    EmergencyContactId,
    BackgroundCheckStatusId,
    BackgroundCheckDate,
    BackgroundCheckExpiresOn,
    StatusId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VolunteerStatistics {
    Table,
    Id,
    VolunteerId,
    TotalHours,
    ActivitiesCount,
    ProjectsCount,
    EventsCount,
    TeamsCount,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    Name,
    Description,
    CategoryId,
    LeaderId,
    MaxMembers,
    MemberCount,
    StatusId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeamMembers {
    Table,
    Id,
    TeamId,
    UserId,
    Role,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    TeamId,
    Name,
    Description,
    StartDate,
    EndDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VolunteerActivities {
    Table,
    Id,
    VolunteerId,
    ActivityTypeId,
    Hours,
    ActivityDate,
    ProjectId,
    EventId,
    Description,
    CreatedAt,
}

fn id_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn counter_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .default(0)
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmergencyContacts::Table)
                    .if_not_exists()
                    .col(&mut id_column(EmergencyContacts::Id))
                    .col(ColumnDef::new(EmergencyContacts::Name).string_len(200).not_null())
                    .col(ColumnDef::new(EmergencyContacts::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(EmergencyContacts::Relationship).string_len(64).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Volunteers::Table)
                    .if_not_exists()
                    .col(&mut id_column(Volunteers::Id))
                    .col(
                        ColumnDef::new(Volunteers::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Volunteers::Availability).text().null())
                    .col(ColumnDef::new(Volunteers::EmergencyContactId).big_integer().null())
                    .col(
                        ColumnDef::new(Volunteers::BackgroundCheckStatusId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Volunteers::BackgroundCheckDate).date().null())
                    .col(ColumnDef::new(Volunteers::BackgroundCheckExpiresOn).date().null())
                    .col(ColumnDef::new(Volunteers::StatusId).big_integer().not_null())
                    .col(&mut timestamp_column(Volunteers::CreatedAt))
                    .col(&mut timestamp_column(Volunteers::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_volunteers_user")
                            .from(Volunteers::Table, Volunteers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_volunteers_emergency_contact")
                            .from(Volunteers::Table, Volunteers::EmergencyContactId)
                            .to(EmergencyContacts::Table, EmergencyContacts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_volunteers_status")
                            .from(Volunteers::Table, Volunteers::StatusId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VolunteerStatistics::Table)
                    .if_not_exists()
                    .col(&mut id_column(VolunteerStatistics::Id))
                    .col(
                        ColumnDef::new(VolunteerStatistics::VolunteerId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(VolunteerStatistics::TotalHours)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(&mut counter_column(VolunteerStatistics::ActivitiesCount))
                    .col(&mut counter_column(VolunteerStatistics::ProjectsCount))
                    .col(&mut counter_column(VolunteerStatistics::EventsCount))
                    .col(&mut counter_column(VolunteerStatistics::TeamsCount))
                    .col(&mut timestamp_column(VolunteerStatistics::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_volunteer_statistics_volunteer")
                            .from(VolunteerStatistics::Table, VolunteerStatistics::VolunteerId)
                            .to(Volunteers::Table, Volunteers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(&mut id_column(Teams::Id))
                    .col(ColumnDef::new(Teams::Name).string_len(120).not_null())
                    .col(ColumnDef::new(Teams::Description).text().null())
                    .col(ColumnDef::new(Teams::CategoryId).big_integer().null())
                    .col(ColumnDef::new(Teams::LeaderId).big_integer().not_null())
                    // NULL = 不限人数
                    .col(ColumnDef::new(Teams::MaxMembers).integer().null())
                    .col(
                        ColumnDef::new(Teams::MemberCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Teams::StatusId).big_integer().not_null())
                    .col(&mut timestamp_column(Teams::CreatedAt))
                    .col(&mut timestamp_column(Teams::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_leader")
                            .from(Teams::Table, Teams::LeaderId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_status")
                            .from(Teams::Table, Teams::StatusId)
                            .to(LookupValues::Table, LookupValues::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamMembers::Table)
                    .if_not_exists()
                    .col(&mut id_column(TeamMembers::Id))
                    .col(ColumnDef::new(TeamMembers::TeamId).big_integer().not_null())
                    .col(ColumnDef::new(TeamMembers::UserId).big_integer().not_null())
                    .col(ColumnDef::new(TeamMembers::Role).string_len(32).not_null())
                    .col(
                        ColumnDef::new(TeamMembers::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_team")
                            .from(TeamMembers::Table, TeamMembers::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_user")
                            .from(TeamMembers::Table, TeamMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_team_user_unique")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::TeamId)
                    .col(TeamMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(&mut id_column(Projects::Id))
                    .col(ColumnDef::new(Projects::TeamId).big_integer().not_null())
                    .col(ColumnDef::new(Projects::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Projects::Description).text().null())
                    .col(ColumnDef::new(Projects::StartDate).date().null())
                    .col(ColumnDef::new(Projects::EndDate).date().null())
                    .col(&mut timestamp_column(Projects::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_team")
                            .from(Projects::Table, Projects::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VolunteerActivities::Table)
                    .if_not_exists()
                    .col(&mut id_column(VolunteerActivities::Id))
                    .col(
                        ColumnDef::new(VolunteerActivities::VolunteerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VolunteerActivities::ActivityTypeId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(VolunteerActivities::Hours).double().not_null())
                    .col(ColumnDef::new(VolunteerActivities::ActivityDate).date().not_null())
                    .col(ColumnDef::new(VolunteerActivities::ProjectId).big_integer().null())
                    .col(ColumnDef::new(VolunteerActivities::EventId).big_integer().null())
                    .col(ColumnDef::new(VolunteerActivities::Description).text().null())
                    .col(&mut timestamp_column(VolunteerActivities::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_volunteer_activities_volunteer")
                            .from(VolunteerActivities::Table, VolunteerActivities::VolunteerId)
                            .to(Volunteers::Table, Volunteers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_volunteer_activities_project")
                            .from(VolunteerActivities::Table, VolunteerActivities::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_volunteer_activities_event")
                            .from(VolunteerActivities::Table, VolunteerActivities::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按外键依赖逆序删除
        manager
            .drop_table(Table::drop().if_exists().table(VolunteerActivities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(TeamMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(VolunteerStatistics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Volunteers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(EmergencyContacts::Table).to_owned())
            .await?;
        Ok(())
    }
}
