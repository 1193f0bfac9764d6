pub mod display_event;
pub mod feed;
pub mod mapper;
pub mod resource;

pub use display_event::{BookingKind, DisplayEvent, Placement, ResourceRef};
pub use feed::{EventFeed, FeedState};
pub use resource::{RecurringClass, Session};
