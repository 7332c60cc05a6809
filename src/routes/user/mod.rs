mod handler;
mod model;

pub use handler::{login, me, signup};
pub use model::UserProfile;
