pub mod addresses;
pub mod blog_posts;
pub mod campaign_statistics;
pub mod campaigns;
pub mod donations;
pub mod donors;
pub mod emergency_contacts;
pub mod event_registrations;
pub mod events;
pub mod lookup_values;
pub mod projects;
pub mod team_members;
pub mod teams;
pub mod users;
pub mod volunteer_activities;
pub mod volunteer_statistics;
pub mod volunteers;

pub use addresses as address_entity;
pub use blog_posts as blog_post_entity;
pub use campaign_statistics as campaign_statistics_entity;
pub use campaigns as campaign_entity;
pub use donations as donation_entity;
pub use donors as donor_entity;
pub use emergency_contacts as emergency_contact_entity;
pub use event_registrations as event_registration_entity;
pub use events as event_entity;
pub use lookup_values as lookup_entity;
pub use projects as project_entity;
pub use team_members as team_member_entity;
pub use teams as team_entity;
pub use users as user_entity;
pub use volunteer_activities as volunteer_activity_entity;
pub use volunteer_statistics as volunteer_statistics_entity;
pub use volunteers as volunteer_entity;
