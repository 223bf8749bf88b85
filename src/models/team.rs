use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{LookupLabels, LookupRef};
use crate::entities::{project_entity, team_entity, team_member_entity};
use crate::error::AppResult;
use crate::utils::{Validate, optional_text, require_positive, require_text, validate_date_order};

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct TeamQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    /// 为空表示不限人数（包含队长）
    pub max_members: Option<i32>,
    /// 默认 active
    pub status_id: Option<i64>,
}

impl Validate for CreateTeamRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name, 2, 120)?;
        optional_text("description", self.description.as_deref(), 2000)?;
        if let Some(max) = self.max_members {
            require_positive("max_members", max as i64)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub max_members: Option<i32>,
    pub status_id: Option<i64>,
}

impl Validate for UpdateTeamRequest {
    fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            require_text("name", name, 2, 120)?;
        }
        optional_text("description", self.description.as_deref(), 2000)?;
        if let Some(max) = self.max_members {
            require_positive("max_members", max as i64)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<LookupRef>,
    pub status: Option<LookupRef>,
    pub leader_id: i64,
    pub max_members: Option<i32>,
    pub member_count: i32,
    pub available_spots: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl TeamResponse {
    pub fn build(m: team_entity::Model, labels: &LookupLabels) -> Self {
        TeamResponse {
            available_spots: m.max_members.map(|max| (max - m.member_count).max(0)),
            category: labels.get(m.category_id),
            status: labels.get(Some(m.status_id)),
            id: m.id,
            name: m.name,
            description: m.description,
            leader_id: m.leader_id,
            max_members: m.max_members,
            member_count: m.member_count,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamMemberResponse {
    pub user_id: i64,
    pub name: String,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

impl TeamMemberResponse {
    pub fn build(m: team_member_entity::Model, name: String) -> Self {
        TeamMemberResponse {
            user_id: m.user_id,
            name,
            role: m.role,
            joined_at: m.joined_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamDetail {
    pub team: TeamResponse,
    pub members: Vec<TeamMemberResponse>,
    pub projects: Vec<ProjectResponse>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Validate for CreateProjectRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name, 2, 200)?;
        optional_text("description", self.description.as_deref(), 5000)?;
        validate_date_order("end_date", self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: i64,
    pub team_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<project_entity::Model> for ProjectResponse {
    fn from(m: project_entity::Model) -> Self {
        ProjectResponse {
            id: m.id,
            team_id: m.team_id,
            name: m.name,
            description: m.description,
            start_date: m.start_date,
            end_date: m.end_date,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_team_validation() {
        let req = CreateTeamRequest {
            name: "Food bank crew".into(),
            max_members: Some(0),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_available_spots_never_negative() {
        let now = Utc::now();
        let team = team_entity::Model {
            id: 1,
            name: "Logistics".into(),
            description: None,
            category_id: None,
            leader_id: 1,
            max_members: Some(2),
            member_count: 3,
            status_id: 1,
            created_at: now,
            updated_at: now,
        };
        let response = TeamResponse::build(team, &LookupLabels::default());
        assert_eq!(response.available_spots, Some(0));
    }
}
