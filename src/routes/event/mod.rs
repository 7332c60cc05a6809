mod handler;
mod model;

pub use handler::{create_event, get_event, list_events};
