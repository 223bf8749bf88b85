pub mod blog_post;
pub mod campaign;
pub mod common;
pub mod dashboard;
pub mod donation;
pub mod event;
pub mod lookup;
pub mod pagination;
pub mod partnership;
pub mod team;
pub mod user;
pub mod volunteer;

pub use blog_post::*;
pub use campaign::*;
pub use common::*;
pub use dashboard::*;
pub use donation::*;
pub use event::*;
pub use lookup::*;
pub use pagination::*;
pub use partnership::*;
pub use team::*;
pub use user::*;
pub use volunteer::*;
