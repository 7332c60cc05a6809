mod handler;
mod model;

pub use handler::{create_league, get_league, list_leagues};
pub use model::League;
