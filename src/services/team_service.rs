use crate::entities::{
    project_entity as projects, team_entity as teams, team_member_entity as members,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthenticatedUser, CreateProjectRequest, CreateTeamRequest, LookupKind, PaginatedResponse,
    PaginationParams, ProjectResponse, ReadOutcome, TeamDetail, TeamMemberResponse, TeamQuery,
    TeamResponse, UpdateTeamRequest, names,
};
use crate::services::{ActivityLink, LookupService, StatsDelta, UserService, VolunteerService};
use crate::utils::Validate;
use chrono::Utc;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

pub const TEAM_FULL: &str = "Team is full";
pub const ALREADY_MEMBER: &str = "Already a member of this team";
pub const LEADER_CANNOT_LEAVE: &str = "Team leader cannot leave the team";

#[derive(Clone)]
pub struct TeamService {
    pool: DatabaseConnection,
}

impl TeamService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &TeamQuery,
    ) -> AppResult<ReadOutcome<PaginatedResponse<TeamResponse>>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let result = self.fetch_page(query, &params).await;
        ReadOutcome::recover_with("teams.list", result, || PaginatedResponse::empty(&params))
    }

    async fn fetch_page(
        &self,
        query: &TeamQuery,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<TeamResponse>> {
        let mut select = teams::Entity::find();
        let filters = [
            (LookupKind::TeamCategory, query.category.as_deref(), teams::Column::CategoryId),
            (LookupKind::TeamStatus, query.status.as_deref(), teams::Column::StatusId),
        ];
        for (kind, name, column) in filters {
            let Some(name) = name else { continue };
            match LookupService::find_by_name(&self.pool, kind, name).await? {
                Some(row) => select = select.filter(column.eq(row.id)),
                None => return Ok(PaginatedResponse::empty(params)),
            }
        }

        let total = select.clone().count(&self.pool).await?;
        let rows = select
            .order_by_asc(teams::Column::Name)
            .order_by_asc(teams::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;
        let labels = LookupService::labels(
            &self.pool,
            rows.iter().flat_map(|t| [t.category_id, Some(t.status_id)]),
        )
        .await?;
        let items = rows
            .into_iter()
            .map(|t| TeamResponse::build(t, &labels))
            .collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    /// 团队详情，包含成员与项目
    pub async fn get(&self, id: i64) -> AppResult<TeamDetail> {
        let team = Self::find(&self.pool, id).await?;
        let member_rows = members::Entity::find()
            .filter(members::Column::TeamId.eq(id))
            .find_also_related(users::Entity)
            .order_by_asc(members::Column::JoinedAt)
            .all(&self.pool)
            .await?;
        let project_rows = projects::Entity::find()
            .filter(projects::Column::TeamId.eq(id))
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        let labels =
            LookupService::labels(&self.pool, [team.category_id, Some(team.status_id)]).await?;

        Ok(TeamDetail {
            team: TeamResponse::build(team, &labels),
            members: member_rows
                .into_iter()
                .map(|(m, user)| {
                    let name = user
                        .map(|u| u.display_name())
                        .unwrap_or_else(|| "Member".to_string());
                    TeamMemberResponse::build(m, name)
                })
                .collect(),
            projects: project_rows.into_iter().map(Into::into).collect(),
        })
    }

    /// 创建团队，创建者成为队长并自动入队
    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        req: CreateTeamRequest,
    ) -> AppResult<TeamDetail> {
        req.validate()?;
        let leader = UserService::ensure(&self.pool, caller).await?;

        let txn = self.pool.begin().await?;
        let status = LookupService::require_or_default(
            &txn,
            "status_id",
            LookupKind::TeamStatus,
            req.status_id,
            names::TEAM_ACTIVE,
        )
        .await?;
        let category = LookupService::require_optional(
            &txn,
            "category_id",
            LookupKind::TeamCategory,
            req.category_id,
        )
        .await?;

        let now = Utc::now();
        let team = teams::ActiveModel {
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            category_id: Set(category.map(|c| c.id)),
            leader_id: Set(leader.id),
            max_members: Set(req.max_members),
            member_count: Set(1),
            status_id: Set(status.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        members::ActiveModel {
            team_id: Set(team.id),
            user_id: Set(leader.id),
            role: Set(members::ROLE_LEADER.to_string()),
            joined_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        Self::bump_volunteer_teams(&txn, leader.id, 1).await?;
        txn.commit().await?;

        log::info!("Team {} created by user {}", team.id, leader.id);
        self.get(team.id).await
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: i64,
        req: UpdateTeamRequest,
    ) -> AppResult<TeamDetail> {
        req.validate()?;
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);

        let txn = self.pool.begin().await?;
        let team = Self::find(&txn, id).await?;
        UserService::authorize_owner(caller, caller_id, Some(team.leader_id))?;
        if let Some(max) = req.max_members
            && max < team.member_count
        {
            return Err(AppError::BusinessRule(
                "Maximum members cannot be lower than the current member count".to_string(),
            ));
        }

        let mut am = team.into_active_model();
        if let Some(name) = req.name {
            am.name = Set(name.trim().to_string());
        }
        if let Some(description) = req.description {
            am.description = Set(Some(description));
        }
        if let Some(category_id) = req.category_id {
            LookupService::require(&txn, "category_id", LookupKind::TeamCategory, category_id)
                .await?;
            am.category_id = Set(Some(category_id));
        }
        if let Some(max) = req.max_members {
            am.max_members = Set(Some(max));
        }
        if let Some(status_id) = req.status_id {
            LookupService::require(&txn, "status_id", LookupKind::TeamStatus, status_id).await?;
            am.status_id = Set(status_id);
        }
        am.updated_at = Set(Utc::now());
        am.update(&txn).await?;
        txn.commit().await?;
        self.get(id).await
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: i64) -> AppResult<()> {
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);
        let txn = self.pool.begin().await?;
        let team = Self::find(&txn, id).await?;
        UserService::authorize_owner(caller, caller_id, Some(team.leader_id))?;

        let member_ids: Vec<i64> = members::Entity::find()
            .select_only()
            .column(members::Column::UserId)
            .filter(members::Column::TeamId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;
        for user_id in member_ids {
            Self::bump_volunteer_teams(&txn, user_id, -1).await?;
        }
        members::Entity::delete_many()
            .filter(members::Column::TeamId.eq(id))
            .exec(&txn)
            .await?;
        let project_ids: Vec<i64> = projects::Entity::find()
            .select_only()
            .column(projects::Column::Id)
            .filter(projects::Column::TeamId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;
        VolunteerService::detach_activities(&txn, ActivityLink::Project, project_ids).await?;
        projects::Entity::delete_many()
            .filter(projects::Column::TeamId.eq(id))
            .exec(&txn)
            .await?;
        teams::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        log::info!("Team {id} deleted");
        Ok(())
    }

    /// 加入团队：条件递增 member_count (< max_members)，0 行受影响即已满
    pub async fn join(&self, caller: &AuthenticatedUser, team_id: i64) -> AppResult<TeamDetail> {
        let user = UserService::ensure(&self.pool, caller).await?;

        let txn = self.pool.begin().await?;
        Self::find(&txn, team_id).await?;
        if Self::membership(&txn, team_id, user.id).await?.is_some() {
            return Err(AppError::BusinessRule(ALREADY_MEMBER.to_string()));
        }

        if !Self::claim_seat(&txn, team_id).await? {
            return Err(AppError::BusinessRule(TEAM_FULL.to_string()));
        }

        members::ActiveModel {
            team_id: Set(team_id),
            user_id: Set(user.id),
            role: Set(members::ROLE_MEMBER.to_string()),
            joined_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        Self::bump_volunteer_teams(&txn, user.id, 1).await?;
        txn.commit().await?;

        log::info!("User {} joined team {team_id}", user.id);
        self.get(team_id).await
    }

    pub async fn leave(&self, caller: &AuthenticatedUser, team_id: i64) -> AppResult<()> {
        let user_id = UserService::local_id(&self.pool, caller).await?;

        let txn = self.pool.begin().await?;
        let team = Self::find(&txn, team_id).await?;
        if team.leader_id == user_id {
            return Err(AppError::BusinessRule(LEADER_CANNOT_LEAVE.to_string()));
        }
        let membership = Self::membership(&txn, team_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Team membership not found".to_string()))?;

        members::Entity::delete_by_id(membership.id).exec(&txn).await?;
        teams::Entity::update_many()
            .col_expr(
                teams::Column::MemberCount,
                Expr::col(teams::Column::MemberCount).sub(1),
            )
            .filter(teams::Column::Id.eq(team_id))
            .filter(teams::Column::MemberCount.gt(0))
            .exec(&txn)
            .await?;
        Self::bump_volunteer_teams(&txn, user_id, -1).await?;
        txn.commit().await?;

        log::info!("User {user_id} left team {team_id}");
        Ok(())
    }

    pub async fn create_project(
        &self,
        caller: &AuthenticatedUser,
        team_id: i64,
        req: CreateProjectRequest,
    ) -> AppResult<ProjectResponse> {
        req.validate()?;
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);
        let team = Self::find(&self.pool, team_id).await?;
        UserService::authorize_owner(caller, caller_id, Some(team.leader_id))?;

        let project = projects::ActiveModel {
            team_id: Set(team_id),
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            start_date: Set(req.start_date),
            end_date: Set(req.end_date),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(project.into())
    }

    pub async fn projects(&self, team_id: i64) -> AppResult<ReadOutcome<Vec<ProjectResponse>>> {
        let result = self.fetch_projects(team_id).await;
        ReadOutcome::recover("teams.projects", result)
    }

    async fn fetch_projects(&self, team_id: i64) -> AppResult<Vec<ProjectResponse>> {
        Self::find(&self.pool, team_id).await?;
        let rows = projects::Entity::find()
            .filter(projects::Column::TeamId.eq(team_id))
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// 条件递增 member_count（max_members 为空或未满），返回 false 表示团队已满
    pub async fn claim_seat<C: ConnectionTrait>(db: &C, team_id: i64) -> AppResult<bool> {
        let claimed = teams::Entity::update_many()
            .col_expr(
                teams::Column::MemberCount,
                Expr::col(teams::Column::MemberCount).add(1),
            )
            .filter(teams::Column::Id.eq(team_id))
            .filter(
                Condition::any()
                    .add(teams::Column::MaxMembers.is_null())
                    .add(Expr::col(teams::Column::MemberCount).lt(Expr::col(teams::Column::MaxMembers))),
            )
            .exec(db)
            .await?;
        Ok(claimed.rows_affected > 0)
    }

    async fn find<C: ConnectionTrait>(db: &C, id: i64) -> AppResult<teams::Model> {
        teams::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Team", id))
    }

    async fn membership<C: ConnectionTrait>(
        db: &C,
        team_id: i64,
        user_id: i64,
    ) -> AppResult<Option<members::Model>> {
        let row = members::Entity::find()
            .filter(members::Column::TeamId.eq(team_id))
            .filter(members::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        Ok(row)
    }

    /// 用户是志愿者时同步其 teams_count
    async fn bump_volunteer_teams<C: ConnectionTrait>(db: &C, user_id: i64, n: i64) -> AppResult<()> {
        if let Some(volunteer) = VolunteerService::find_by_user(db, user_id).await? {
            VolunteerService::adjust_statistics(db, volunteer.id, StatsDelta::teams(n)).await?;
        }
        Ok(())
    }
}
