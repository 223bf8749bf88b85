use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::database::SeedReport;
use crate::handlers;
use crate::models::*;
use crate::services::ReconcileReport;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::me,
        handlers::lookup::list_lookups,
        handlers::campaign::list_campaigns,
        handlers::campaign::get_campaign,
        handlers::campaign::get_campaign_statistics,
        handlers::campaign::create_campaign,
        handlers::campaign::update_campaign,
        handlers::campaign::delete_campaign,
        handlers::donation::list_donations,
        handlers::donation::list_my_donations,
        handlers::donation::get_donation,
        handlers::donation::create_donation,
        handlers::donation::update_donation,
        handlers::donation::delete_donation,
        handlers::donation::update_donor_preferences,
        handlers::event::list_events,
        handlers::event::get_event,
        handlers::event::create_event,
        handlers::event::update_event,
        handlers::event::delete_event,
        handlers::event::register_for_event,
        handlers::event::cancel_registration,
        handlers::event::list_registrations,
        handlers::volunteer::list_volunteers,
        handlers::volunteer::get_volunteer,
        handlers::volunteer::create_volunteer,
        handlers::volunteer::update_volunteer,
        handlers::volunteer::delete_volunteer,
        handlers::volunteer::get_volunteer_statistics,
        handlers::volunteer::list_activities,
        handlers::volunteer::log_activity,
        handlers::volunteer::delete_activity,
        handlers::team::list_teams,
        handlers::team::get_team,
        handlers::team::create_team,
        handlers::team::update_team,
        handlers::team::delete_team,
        handlers::team::join_team,
        handlers::team::leave_team,
        handlers::team::list_projects,
        handlers::team::create_project,
        handlers::blog_post::list_blog_posts,
        handlers::blog_post::get_blog_post,
        handlers::blog_post::create_blog_post,
        handlers::blog_post::update_blog_post,
        handlers::blog_post::delete_blog_post,
        handlers::blog_post::publish_blog_post,
        handlers::dashboard::get_summary,
        handlers::dashboard::get_overview,
        handlers::partnership::submit_inquiry,
        handlers::admin::reseed,
        handlers::admin::reconcile_all,
        handlers::admin::reconcile_campaign,
    ),
    components(
        schemas(
            ApiError,
            LookupKind,
            LookupRef,
            LookupResponse,
            UserResponse,
            CampaignQuery,
            CreateCampaignRequest,
            UpdateCampaignRequest,
            CampaignStatisticsResponse,
            CampaignSummary,
            CampaignDetail,
            DonationQuery,
            CreateDonationRequest,
            UpdateDonationRequest,
            DonorPreferencesRequest,
            DonorResponse,
            DonationResponse,
            EventQuery,
            AddressInput,
            AddressResponse,
            CreateEventRequest,
            UpdateEventRequest,
            EventResponse,
            RegistrationResponse,
            VolunteerQuery,
            EmergencyContactInput,
            EmergencyContactResponse,
            CreateVolunteerRequest,
            UpdateVolunteerRequest,
            VolunteerStatisticsResponse,
            VolunteerResponse,
            LogActivityRequest,
            ActivityResponse,
            TeamQuery,
            CreateTeamRequest,
            UpdateTeamRequest,
            TeamResponse,
            TeamMemberResponse,
            TeamDetail,
            CreateProjectRequest,
            ProjectResponse,
            BlogPostQuery,
            CreateBlogPostRequest,
            UpdateBlogPostRequest,
            BlogPostResponse,
            DashboardSummary,
            UpcomingRegistration,
            PlatformOverview,
            PartnershipInquiry,
            PartnershipReceipt,
            SeedReport,
            ReconcileReport,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Current user API"),
        (name = "lookup", description = "Reference data API"),
        (name = "campaign", description = "Fundraising campaign API"),
        (name = "donation", description = "Donation API"),
        (name = "event", description = "Event and registration API"),
        (name = "volunteer", description = "Volunteer and activity API"),
        (name = "team", description = "Volunteer team API"),
        (name = "blog", description = "Blog post API"),
        (name = "dashboard", description = "Dashboard API"),
        (name = "partnership", description = "Partnership inquiry API"),
        (name = "admin", description = "Administration API"),
    ),
    info(
        title = "Charity Backend API",
        version = "1.0.0",
        description = "Donations, campaigns, events, volunteers, teams and blog REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
