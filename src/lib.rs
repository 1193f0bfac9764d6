pub mod api;
pub mod app;
pub mod booking;
pub mod checkout;
pub mod display;
pub mod selection;
pub mod storage;

pub use app::{AppError, BookingApp};
pub use booking::{DisplayEvent, EventFeed, FeedState};
pub use selection::{PendingSelection, SelectionOutcome, SelectionState};
