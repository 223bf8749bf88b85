use crate::entities::{
    emergency_contact_entity as contacts, event_entity as events, project_entity as projects,
    team_member_entity as members, user_entity as users, volunteer_activity_entity as activities, volunteer_entity as volunteers,
    volunteer_statistics_entity as stats,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    ActivityResponse, AuthenticatedUser, CreateVolunteerRequest, EmergencyContactInput,
    LogActivityRequest, LookupKind, PaginatedResponse, PaginationParams, ReadOutcome,
    UpdateVolunteerRequest, VolunteerQuery, VolunteerResponse, VolunteerStatisticsResponse, names,
};
use crate::services::{LookupService, UserService};
use crate::utils::Validate;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

/// 志愿者统计的增量，删除时取反
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsDelta {
    pub hours: f64,
    pub activities: i64,
    pub projects: i64,
    pub events: i64,
    pub teams: i64,
}

impl StatsDelta {
    pub fn for_activity(activity: &activities::Model) -> Self {
        StatsDelta {
            hours: activity.hours,
            activities: 1,
            projects: activity.project_id.is_some() as i64,
            events: activity.event_id.is_some() as i64,
            teams: 0,
        }
    }

    pub fn teams(n: i64) -> Self {
        StatsDelta {
            teams: n,
            ..Default::default()
        }
    }

    pub fn detached(link: ActivityLink) -> Self {
        match link {
            ActivityLink::Event => StatsDelta {
                events: -1,
                ..Default::default()
            },
            ActivityLink::Project => StatsDelta {
                projects: -1,
                ..Default::default()
            },
        }
    }

    pub fn negated(self) -> Self {
        StatsDelta {
            hours: -self.hours,
            activities: -self.activities,
            projects: -self.projects,
            events: -self.events,
            teams: -self.teams,
        }
    }
}

/// 活动记录可挂靠的对象，被删除时活动记录与之解绑
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLink {
    Event,
    Project,
}

impl ActivityLink {
    fn column(self) -> activities::Column {
        match self {
            ActivityLink::Event => activities::Column::EventId,
            ActivityLink::Project => activities::Column::ProjectId,
        }
    }
}

#[derive(Clone)]
pub struct VolunteerService {
    pool: DatabaseConnection,
}

impl VolunteerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &VolunteerQuery,
    ) -> AppResult<ReadOutcome<PaginatedResponse<VolunteerResponse>>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let result = self.fetch_page(query, &params).await;
        ReadOutcome::recover_with("volunteers.list", result, || PaginatedResponse::empty(&params))
    }

    async fn fetch_page(
        &self,
        query: &VolunteerQuery,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<VolunteerResponse>> {
        let mut select = volunteers::Entity::find();
        if let Some(status) = query.status.as_deref() {
            match LookupService::find_by_name(&self.pool, LookupKind::VolunteerStatus, status)
                .await?
            {
                Some(row) => select = select.filter(volunteers::Column::StatusId.eq(row.id)),
                None => return Ok(PaginatedResponse::empty(params)),
            }
        }

        let total = select.clone().count(&self.pool).await?;
        let rows = select
            .find_also_related(users::Entity)
            .order_by_desc(volunteers::Column::CreatedAt)
            .order_by_desc(volunteers::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let ids: Vec<i64> = rows.iter().map(|(v, _)| v.id).collect();
        let stats_map: HashMap<i64, stats::Model> = stats::Entity::find()
            .filter(stats::Column::VolunteerId.is_in(ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|s| (s.volunteer_id, s))
            .collect();
        let contact_ids: Vec<i64> = rows.iter().filter_map(|(v, _)| v.emergency_contact_id).collect();
        let contact_map: HashMap<i64, contacts::Model> = if contact_ids.is_empty() {
            HashMap::new()
        } else {
            contacts::Entity::find()
                .filter(contacts::Column::Id.is_in(contact_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };
        let labels = LookupService::labels(
            &self.pool,
            rows.iter()
                .flat_map(|(v, _)| [Some(v.status_id), v.background_check_status_id]),
        )
        .await?;

        let items = rows
            .into_iter()
            .map(|(v, user)| {
                let contact = v.emergency_contact_id.and_then(|id| contact_map.get(&id).cloned());
                let s = stats_map.get(&v.id);
                VolunteerResponse::build(v, user.as_ref(), contact, s, &labels)
            })
            .collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn get(&self, id: i64) -> AppResult<VolunteerResponse> {
        let (volunteer, user) = volunteers::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Volunteer", id))?;
        let contact = match volunteer.emergency_contact_id {
            Some(cid) => contacts::Entity::find_by_id(cid).one(&self.pool).await?,
            None => None,
        };
        let statistics = Self::statistics_row(&self.pool, id).await?;
        let labels = LookupService::labels(
            &self.pool,
            [Some(volunteer.status_id), volunteer.background_check_status_id],
        )
        .await?;
        Ok(VolunteerResponse::build(
            volunteer,
            user.as_ref(),
            contact,
            statistics.as_ref(),
            &labels,
        ))
    }

    /// 当前用户报名成为志愿者（每个用户一条）
    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        req: CreateVolunteerRequest,
    ) -> AppResult<VolunteerResponse> {
        req.validate()?;
        let user = UserService::ensure(&self.pool, caller).await?;

        let txn = self.pool.begin().await?;
        if Self::find_by_user(&txn, user.id).await?.is_some() {
            return Err(AppError::BusinessRule(
                "Already registered as a volunteer".to_string(),
            ));
        }
        let status = LookupService::require_or_default(
            &txn,
            "status_id",
            LookupKind::VolunteerStatus,
            req.status_id,
            names::VOLUNTEER_ACTIVE,
        )
        .await?;
        let check = LookupService::require_optional(
            &txn,
            "background_check_status_id",
            LookupKind::BackgroundCheckStatus,
            req.background_check_status_id,
        )
        .await?;
        let contact_id = match req.emergency_contact {
            Some(contact) => Some(Self::insert_contact(&txn, contact).await?.id),
            None => None,
        };

        let now = Utc::now();
        let volunteer = volunteers::ActiveModel {
            user_id: Set(user.id),
            availability: Set(req.availability),
            emergency_contact_id: Set(contact_id),
            background_check_status_id: Set(check.map(|c| c.id)),
            background_check_date: Set(req.background_check_date),
            background_check_expires_on: Set(req.background_check_expires_on),
            status_id: Set(status.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        Self::ensure_statistics_row(&txn, volunteer.id).await?;
        // 成为志愿者之前已加入的团队也计入 teams_count
        let teams_joined = members::Entity::find()
            .filter(members::Column::UserId.eq(user.id))
            .count(&txn)
            .await? as i64;
        if teams_joined > 0 {
            Self::adjust_statistics(&txn, volunteer.id, StatsDelta::teams(teams_joined)).await?;
        }
        txn.commit().await?;

        log::info!("User {} registered as volunteer {}", user.id, volunteer.id);
        self.get(volunteer.id).await
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: i64,
        req: UpdateVolunteerRequest,
    ) -> AppResult<VolunteerResponse> {
        req.validate()?;
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);

        let txn = self.pool.begin().await?;
        let volunteer = Self::find(&txn, id).await?;
        UserService::authorize_owner(caller, caller_id, Some(volunteer.user_id))?;

        let contact_id = volunteer.emergency_contact_id;
        let mut am = volunteer.into_active_model();
        if let Some(availability) = req.availability {
            am.availability = Set(Some(availability));
        }
        if let Some(contact) = req.emergency_contact {
            match contact_id {
                Some(cid) => {
                    contacts::ActiveModel {
                        id: Set(cid),
                        name: Set(contact.name),
                        phone: Set(contact.phone),
                        relationship: Set(contact.relationship),
                    }
                    .update(&txn)
                    .await?;
                }
                None => {
                    let inserted = Self::insert_contact(&txn, contact).await?;
                    am.emergency_contact_id = Set(Some(inserted.id));
                }
            }
        }
        if let Some(check_id) = req.background_check_status_id {
            LookupService::require(
                &txn,
                "background_check_status_id",
                LookupKind::BackgroundCheckStatus,
                check_id,
            )
            .await?;
            am.background_check_status_id = Set(Some(check_id));
        }
        if let Some(date) = req.background_check_date {
            am.background_check_date = Set(Some(date));
        }
        if let Some(date) = req.background_check_expires_on {
            am.background_check_expires_on = Set(Some(date));
        }
        if let Some(status_id) = req.status_id {
            LookupService::require(&txn, "status_id", LookupKind::VolunteerStatus, status_id)
                .await?;
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
        let volunteer = Self::find(&txn, id).await?;
        UserService::authorize_owner(caller, caller_id, Some(volunteer.user_id))?;

        activities::Entity::delete_many()
            .filter(activities::Column::VolunteerId.eq(id))
            .exec(&txn)
            .await?;
        stats::Entity::delete_many()
            .filter(stats::Column::VolunteerId.eq(id))
            .exec(&txn)
            .await?;
        volunteers::Entity::delete_by_id(id).exec(&txn).await?;
        if let Some(cid) = volunteer.emergency_contact_id {
            contacts::Entity::delete_by_id(cid).exec(&txn).await?;
        }
        txn.commit().await?;
        log::info!("Volunteer {id} deleted");
        Ok(())
    }

    /// 记录志愿服务时长，同一事务内累加统计
    pub async fn log_activity(
        &self,
        caller: &AuthenticatedUser,
        volunteer_id: i64,
        req: LogActivityRequest,
    ) -> AppResult<ActivityResponse> {
        req.validate()?;
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);

        let txn = self.pool.begin().await?;
        let volunteer = Self::find(&txn, volunteer_id).await?;
        UserService::authorize_owner(caller, caller_id, Some(volunteer.user_id))?;

        if let Some(project_id) = req.project_id
            && projects::Entity::find_by_id(project_id).one(&txn).await?.is_none()
        {
            return Err(AppError::not_found("Project", project_id));
        }
        if let Some(event_id) = req.event_id
            && events::Entity::find_by_id(event_id).one(&txn).await?.is_none()
        {
            return Err(AppError::not_found("Event", event_id));
        }
        let activity_type = LookupService::require_optional(
            &txn,
            "activity_type_id",
            LookupKind::ActivityType,
            req.activity_type_id,
        )
        .await?;

        let now = Utc::now();
        let activity = activities::ActiveModel {
            volunteer_id: Set(volunteer_id),
            activity_type_id: Set(activity_type.map(|t| t.id)),
            hours: Set(req.hours),
            activity_date: Set(req.activity_date.unwrap_or_else(|| now.date_naive())),
            project_id: Set(req.project_id),
            event_id: Set(req.event_id),
            description: Set(req.description),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        Self::adjust_statistics(&txn, volunteer_id, StatsDelta::for_activity(&activity)).await?;
        txn.commit().await?;

        log::info!(
            "Volunteer {volunteer_id} logged {} hours (activity {})",
            activity.hours,
            activity.id
        );
        let labels = LookupService::labels(&self.pool, [activity.activity_type_id]).await?;
        Ok(ActivityResponse::build(activity, &labels))
    }

    pub async fn activities(
        &self,
        volunteer_id: i64,
    ) -> AppResult<ReadOutcome<Vec<ActivityResponse>>> {
        let result = self.fetch_activities(volunteer_id).await;
        ReadOutcome::recover("volunteers.activities", result)
    }

    async fn fetch_activities(&self, volunteer_id: i64) -> AppResult<Vec<ActivityResponse>> {
        Self::find(&self.pool, volunteer_id).await?;
        let rows = activities::Entity::find()
            .filter(activities::Column::VolunteerId.eq(volunteer_id))
            .order_by_desc(activities::Column::ActivityDate)
            .order_by_desc(activities::Column::Id)
            .all(&self.pool)
            .await?;
        let labels =
            LookupService::labels(&self.pool, rows.iter().map(|a| a.activity_type_id)).await?;
        Ok(rows
            .into_iter()
            .map(|a| ActivityResponse::build(a, &labels))
            .collect())
    }

    /// 删除活动记录并对称扣减统计
    pub async fn delete_activity(&self, caller: &AuthenticatedUser, activity_id: i64) -> AppResult<()> {
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);
        let txn = self.pool.begin().await?;
        let activity = activities::Entity::find_by_id(activity_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Activity", activity_id))?;
        let volunteer = Self::find(&txn, activity.volunteer_id).await?;
        UserService::authorize_owner(caller, caller_id, Some(volunteer.user_id))?;

        activities::Entity::delete_by_id(activity_id).exec(&txn).await?;
        Self::adjust_statistics(
            &txn,
            activity.volunteer_id,
            StatsDelta::for_activity(&activity).negated(),
        )
        .await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn statistics(&self, volunteer_id: i64) -> AppResult<VolunteerStatisticsResponse> {
        Self::find(&self.pool, volunteer_id).await?;
        let row = Self::statistics_row(&self.pool, volunteer_id).await?;
        Ok(VolunteerStatisticsResponse::from_row(volunteer_id, row.as_ref()))
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn find<C: ConnectionTrait>(db: &C, id: i64) -> AppResult<volunteers::Model> {
        volunteers::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Volunteer", id))
    }

    pub(crate) async fn find_by_user<C: ConnectionTrait>(
        db: &C,
        user_id: i64,
    ) -> AppResult<Option<volunteers::Model>> {
        let volunteer = volunteers::Entity::find()
            .filter(volunteers::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        Ok(volunteer)
    }

    async fn statistics_row<C: ConnectionTrait>(
        db: &C,
        volunteer_id: i64,
    ) -> AppResult<Option<stats::Model>> {
        let row = stats::Entity::find()
            .filter(stats::Column::VolunteerId.eq(volunteer_id))
            .one(db)
            .await?;
        Ok(row)
    }

    async fn insert_contact<C: ConnectionTrait>(
        db: &C,
        input: EmergencyContactInput,
    ) -> AppResult<contacts::Model> {
        let contact = contacts::ActiveModel {
            name: Set(input.name.trim().to_string()),
            phone: Set(input.phone.trim().to_string()),
            relationship: Set(input.relationship),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(contact)
    }

    async fn ensure_statistics_row<C: ConnectionTrait>(db: &C, volunteer_id: i64) -> AppResult<()> {
        let row = stats::ActiveModel {
            volunteer_id: Set(volunteer_id),
            total_hours: Set(0.0),
            activities_count: Set(0),
            projects_count: Set(0),
            events_count: Set(0),
            teams_count: Set(0),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        stats::Entity::insert(row)
            .on_conflict(
                OnConflict::column(stats::Column::VolunteerId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// 活动或项目删除前调用：扣减相关志愿者的 events_count / projects_count 并清空外键，
    /// 之后删除这些活动记录时不再重复扣减
    pub(crate) async fn detach_activities<C: ConnectionTrait>(
        db: &C,
        link: ActivityLink,
        target_ids: Vec<i64>,
    ) -> AppResult<u64> {
        if target_ids.is_empty() {
            return Ok(0);
        }
        let column = link.column();
        let volunteer_ids: Vec<i64> = activities::Entity::find()
            .select_only()
            .column(activities::Column::VolunteerId)
            .filter(column.is_in(target_ids.clone()))
            .into_tuple()
            .all(db)
            .await?;
        for volunteer_id in &volunteer_ids {
            Self::adjust_statistics(db, *volunteer_id, StatsDelta::detached(link)).await?;
        }
        activities::Entity::update_many()
            .col_expr(column, Expr::value(Option::<i64>::None))
            .filter(column.is_in(target_ids))
            .exec(db)
            .await?;
        Ok(volunteer_ids.len() as u64)
    }

    /// upsert 统计行后原子累加各计数
    pub(crate) async fn adjust_statistics<C: ConnectionTrait>(
        db: &C,
        volunteer_id: i64,
        delta: StatsDelta,
    ) -> AppResult<()> {
        Self::ensure_statistics_row(db, volunteer_id).await?;
        stats::Entity::update_many()
            .col_expr(
                stats::Column::TotalHours,
                Expr::col(stats::Column::TotalHours).add(delta.hours),
            )
            .col_expr(
                stats::Column::ActivitiesCount,
                Expr::col(stats::Column::ActivitiesCount).add(delta.activities),
            )
            .col_expr(
                stats::Column::ProjectsCount,
                Expr::col(stats::Column::ProjectsCount).add(delta.projects),
            )
            .col_expr(
                stats::Column::EventsCount,
                Expr::col(stats::Column::EventsCount).add(delta.events),
            )
            .col_expr(
                stats::Column::TeamsCount,
                Expr::col(stats::Column::TeamsCount).add(delta.teams),
            )
            .col_expr(stats::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(stats::Column::VolunteerId.eq(volunteer_id))
            .exec(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_delta_for_activity() {
        let activity = activities::Model {
            id: 1,
            volunteer_id: 2,
            activity_type_id: None,
            hours: 3.5,
            activity_date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            project_id: Some(7),
            event_id: None,
            description: None,
            created_at: Utc::now(),
        };
        let delta = StatsDelta::for_activity(&activity);
        assert_eq!(delta.hours, 3.5);
        assert_eq!((delta.activities, delta.projects, delta.events), (1, 1, 0));
        assert_eq!(delta.negated().projects, -1);
    }

    #[test]
    fn test_detached_delta() {
        let event = StatsDelta::detached(ActivityLink::Event);
        assert_eq!((event.events, event.projects, event.activities), (-1, 0, 0));
        let project = StatsDelta::detached(ActivityLink::Project);
        assert_eq!((project.events, project.projects, project.hours), (0, -1, 0.0));
    }
}
