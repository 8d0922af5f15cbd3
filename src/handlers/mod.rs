pub mod events;
pub mod orgs;

pub use events::{create_event, delete_event, list_events, update_event};
pub use orgs::list_orgs;
