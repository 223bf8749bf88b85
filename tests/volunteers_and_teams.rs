mod common;

use charity_backend::error::AppError;
use charity_backend::models::{
    CreateEventRequest, CreateProjectRequest, CreateTeamRequest, CreateVolunteerRequest,
    LogActivityRequest,
};
use charity_backend::services::{
    EventService, LEADER_CANNOT_LEAVE, TEAM_FULL, TeamService, VolunteerService,
};
use chrono::{Duration, Utc};

fn hours(h: f64) -> LogActivityRequest {
    LogActivityRequest {
        hours: h,
        ..Default::default()
    }
}

#[tokio::test]
async fn activity_log_and_delete_keep_statistics_in_step() {
    let db = common::setup().await;
    let caller = common::user("vol_1", "Vera");
    let leader = common::user("lead_1", "Leo");
    let volunteers = VolunteerService::new(db.clone());
    let teams = TeamService::new(db.clone());

    let volunteer = volunteers
        .create(&caller, CreateVolunteerRequest::default())
        .await
        .unwrap();
    assert_eq!(volunteer.statistics.activities_count, 0);

    let team = teams
        .create(
            &leader,
            CreateTeamRequest {
                name: "Food bank".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let project = teams
        .create_project(
            &leader,
            team.team.id,
            CreateProjectRequest {
                name: "Winter drive".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    volunteers.log_activity(&caller, volunteer.id, hours(2.5)).await.unwrap();
    let mut with_project = hours(4.0);
    with_project.project_id = Some(project.id);
    let second = volunteers
        .log_activity(&caller, volunteer.id, with_project)
        .await
        .unwrap();

    let stats = volunteers.statistics(volunteer.id).await.unwrap();
    assert_eq!(stats.total_hours, 6.5);
    assert_eq!(stats.activities_count, 2);
    assert_eq!(stats.projects_count, 1);

    volunteers.delete_activity(&caller, second.id).await.unwrap();
    let stats = volunteers.statistics(volunteer.id).await.unwrap();
    assert_eq!(stats.total_hours, 2.5);
    assert_eq!(stats.activities_count, 1);
    assert_eq!(stats.projects_count, 0);

    let activities = volunteers.activities(volunteer.id).await.unwrap().into_data();
    assert_eq!(activities.len(), 1);
}

#[tokio::test]
async fn activity_hours_and_references_are_checked() {
    let db = common::setup().await;
    let caller = common::user("vol_1", "Vera");
    let volunteers = VolunteerService::new(db.clone());
    let volunteer = volunteers
        .create(&caller, CreateVolunteerRequest::default())
        .await
        .unwrap();

    for bad in [0.0, -1.0, 24.5] {
        let err = volunteers
            .log_activity(&caller, volunteer.id, hours(bad))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError { ref field, .. } if field == "hours"));
    }
    volunteers.log_activity(&caller, volunteer.id, hours(24.0)).await.unwrap();

    let mut missing_event = hours(1.0);
    missing_event.event_id = Some(404);
    let err = volunteers
        .log_activity(&caller, volunteer.id, missing_event)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let other = common::user("vol_2", "Walt");
    let err = volunteers
        .log_activity(&other, volunteer.id, hours(1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn one_volunteer_profile_per_user() {
    let db = common::setup().await;
    let caller = common::user("vol_1", "Vera");
    let volunteers = VolunteerService::new(db.clone());
    volunteers
        .create(&caller, CreateVolunteerRequest::default())
        .await
        .unwrap();
    let err = volunteers
        .create(&caller, CreateVolunteerRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
}

#[tokio::test]
async fn team_membership_respects_max_members() {
    let db = common::setup().await;
    let leader = common::user("lead_1", "Leo");
    let member = common::user("mem_1", "Mia");
    let late = common::user("mem_2", "Ned");
    let teams = TeamService::new(db.clone());
    let volunteers = VolunteerService::new(db.clone());

    let member_volunteer = volunteers
        .create(&member, CreateVolunteerRequest::default())
        .await
        .unwrap();

    let team = teams
        .create(
            &leader,
            CreateTeamRequest {
                name: "Tutors".to_string(),
                max_members: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let team_id = team.team.id;
    assert_eq!(team.team.member_count, 1);
    assert_eq!(team.members.len(), 1);

    let joined = teams.join(&member, team_id).await.unwrap();
    assert_eq!(joined.team.member_count, 2);
    assert_eq!(joined.team.available_spots, Some(0));
    assert_eq!(
        volunteers.statistics(member_volunteer.id).await.unwrap().teams_count,
        1
    );

    match teams.join(&late, team_id).await.unwrap_err() {
        AppError::BusinessRule(msg) => assert_eq!(msg, TEAM_FULL),
        other => panic!("unexpected error: {other:?}"),
    }

    match teams.leave(&leader, team_id).await.unwrap_err() {
        AppError::BusinessRule(msg) => assert_eq!(msg, LEADER_CANNOT_LEAVE),
        other => panic!("unexpected error: {other:?}"),
    }

    teams.leave(&member, team_id).await.unwrap();
    assert_eq!(
        volunteers.statistics(member_volunteer.id).await.unwrap().teams_count,
        0
    );
    let after = teams.join(&late, team_id).await.unwrap();
    assert_eq!(after.team.member_count, 2);
}

#[tokio::test]
async fn teams_joined_before_volunteering_are_counted() {
    let db = common::setup().await;
    let leader = common::user("lead_1", "Leo");
    let member = common::user("mem_1", "Mia");
    let teams = TeamService::new(db.clone());
    let volunteers = VolunteerService::new(db.clone());

    let team = teams
        .create(
            &leader,
            CreateTeamRequest {
                name: "Gardeners".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    teams.join(&member, team.team.id).await.unwrap();

    let volunteer = volunteers
        .create(&member, CreateVolunteerRequest::default())
        .await
        .unwrap();
    assert_eq!(volunteer.statistics.teams_count, 1);

    teams.leave(&member, team.team.id).await.unwrap();
    assert_eq!(volunteers.statistics(volunteer.id).await.unwrap().teams_count, 0);
}

#[tokio::test]
async fn deleting_an_event_releases_volunteer_event_counts() {
    let db = common::setup().await;
    let admin = common::admin("admin_1");
    let caller = common::user("vol_1", "Vera");
    let events = EventService::new(db.clone());
    let volunteers = VolunteerService::new(db.clone());

    let event = events
        .create(
            &admin,
            CreateEventRequest {
                title: "Beach cleanup".to_string(),
                description: "Bags provided".to_string(),
                starts_at: Utc::now() + Duration::days(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let volunteer = volunteers
        .create(&caller, CreateVolunteerRequest::default())
        .await
        .unwrap();
    let mut at_event = hours(3.0);
    at_event.event_id = Some(event.id);
    let activity = volunteers
        .log_activity(&caller, volunteer.id, at_event)
        .await
        .unwrap();
    assert_eq!(volunteers.statistics(volunteer.id).await.unwrap().events_count, 1);

    events.delete(&admin, event.id).await.unwrap();
    let stats = volunteers.statistics(volunteer.id).await.unwrap();
    assert_eq!(stats.events_count, 0);
    assert_eq!(stats.activities_count, 1);
    assert_eq!(stats.total_hours, 3.0);

    volunteers.delete_activity(&caller, activity.id).await.unwrap();
    let stats = volunteers.statistics(volunteer.id).await.unwrap();
    assert_eq!((stats.activities_count, stats.events_count), (0, 0));
    assert_eq!(stats.total_hours, 0.0);
}

#[tokio::test]
async fn deleting_a_team_releases_volunteer_project_counts() {
    let db = common::setup().await;
    let leader = common::user("lead_1", "Leo");
    let caller = common::user("vol_1", "Vera");
    let teams = TeamService::new(db.clone());
    let volunteers = VolunteerService::new(db.clone());

    let team = teams
        .create(
            &leader,
            CreateTeamRequest {
                name: "Builders".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let project = teams
        .create_project(
            &leader,
            team.team.id,
            CreateProjectRequest {
                name: "Ramp".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let volunteer = volunteers
        .create(&caller, CreateVolunteerRequest::default())
        .await
        .unwrap();
    let mut on_project = hours(2.0);
    on_project.project_id = Some(project.id);
    let activity = volunteers
        .log_activity(&caller, volunteer.id, on_project)
        .await
        .unwrap();

    teams.delete(&leader, team.team.id).await.unwrap();
    let stats = volunteers.statistics(volunteer.id).await.unwrap();
    assert_eq!(stats.projects_count, 0);
    assert_eq!(stats.activities_count, 1);

    volunteers.delete_activity(&caller, activity.id).await.unwrap();
    let stats = volunteers.statistics(volunteer.id).await.unwrap();
    assert_eq!((stats.activities_count, stats.projects_count), (0, 0));
}

#[tokio::test]
async fn seat_claim_is_refused_when_team_is_full() {
    let db = common::setup().await;
    let leader = common::user("lead_1", "Leo");
    let teams = TeamService::new(db.clone());

    let team = teams
        .create(
            &leader,
            CreateTeamRequest {
                name: "Duo".to_string(),
                max_members: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let team_id = team.team.id;

    assert!(TeamService::claim_seat(&db, team_id).await.unwrap());
    // member_count == max_members
    assert!(!TeamService::claim_seat(&db, team_id).await.unwrap());
    assert_eq!(teams.get(team_id).await.unwrap().team.member_count, 2);
}
