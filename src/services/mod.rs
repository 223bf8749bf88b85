pub mod blog_post_service;
pub mod campaign_service;
pub mod dashboard_service;
pub mod donation_service;
pub mod event_service;
pub mod lookup_service;
pub mod partnership_service;
pub mod team_service;
pub mod user_service;
pub mod volunteer_service;

pub use blog_post_service::*;
pub use campaign_service::*;
pub use dashboard_service::*;
pub use donation_service::*;
pub use event_service::*;
pub use lookup_service::*;
pub use partnership_service::*;
pub use team_service::*;
pub use user_service::*;
pub use volunteer_service::*;
