pub mod fees;
pub mod jwt;
pub mod validation;

pub use fees::*;
pub use jwt::*;
pub use validation::*;
