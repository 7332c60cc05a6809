mod handler;
mod model;

pub use handler::{create_season, get_season, list_seasons};
pub use model::Season;
