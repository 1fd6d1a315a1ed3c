mod health_check;
mod newsletter;

pub use health_check::*;
pub use newsletter::*;
