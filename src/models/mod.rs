pub mod event;
pub mod org;

pub use event::{Event, EventPayload};
pub use org::{NewOrg, Org};
