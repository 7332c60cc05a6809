mod handler;
mod model;

pub use handler::{add_players_by_ifpa, list_players};
