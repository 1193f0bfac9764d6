use tokio::sync::watch;

use crate::api::client::BookingApi;
use crate::booking::display_event::DisplayEvent;
use crate::booking::mapper::map_events;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Ready(Vec<DisplayEvent>),
    Failed(String),
}

pub struct EventFeed {
    state: watch::Sender<FeedState>,
}

impl EventFeed {
    pub fn new() -> Self {
        let (state, _) = watch::channel(FeedState::Loading);
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        match &*self.state.borrow() {
            FeedState::Ready(events) => events.clone(),
            FeedState::Loading | FeedState::Failed(_) => Vec::new(),
        }
    }

    pub fn find(&self, event_id: &str) -> Option<DisplayEvent> {
        match &*self.state.borrow() {
            FeedState::Ready(events) => events.iter().find(|e| e.id == event_id).cloned(),
            FeedState::Loading | FeedState::Failed(_) => None,
        }
    }

    /// The previous list stays visible until the new one is ready.
    pub async fn load<A: BookingApi + ?Sized>(&self, api: &A) -> FeedState {
        let (sessions, classes) = tokio::join!(api.fetch_sessions(), api.fetch_classes());

        let next = match (sessions, classes) {
            (Ok(sessions), Ok(classes)) => {
                let events = map_events(Some(&sessions), Some(&classes));
                tracing::info!(
                    "Calendar loaded: {} sessions, {} classes",
                    sessions.len(),
                    classes.len()
                );
                FeedState::Ready(events)
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::error!("Failed to load calendar: {}", err);
                FeedState::Failed(err.to_string())
            }
        };

        self.state.send_replace(next.clone());
        next
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::{ApiError, MockBookingApi};
    use crate::booking::resource::Session;
    use chrono::{DateTime, Utc};

    fn session(id: u64) -> Session {
        let start = DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Session {
            id,
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
            price_per_seat: 0,
            max_participants: 1,
            current_bookings: 0,
        }
    }

    #[test]
    fn new_feed_is_loading_and_empty() {
        let feed = EventFeed::new();

        assert_eq!(feed.state(), FeedState::Loading);
        assert!(feed.events().is_empty());
    }

    #[tokio::test]
    async fn load_publishes_mapped_events() {
        let mut api = MockBookingApi::new();
        api.expect_fetch_sessions().returning(|| Ok(vec![session(1)]));
        api.expect_fetch_classes().returning(|| Ok(vec![]));
        let feed = EventFeed::new();
        let mut updates = feed.subscribe();

        feed.load(&api).await;

        assert!(updates.has_changed().unwrap());
        let published = updates.borrow_and_update().clone();
        assert!(matches!(published, FeedState::Ready(ref events) if events.len() == 1));
        assert_eq!(feed.find("1").unwrap().title, "1:1 Slot");
    }

    #[tokio::test]
    async fn one_failed_source_fails_the_whole_feed() {
        let mut api = MockBookingApi::new();
        api.expect_fetch_sessions().returning(|| Ok(vec![session(1)]));
        api.expect_fetch_classes()
            .returning(|| Err(ApiError::Rejected { status: 503, detail: None }));
        let feed = EventFeed::new();

        let state = feed.load(&api).await;

        assert!(matches!(state, FeedState::Failed(_)));
        assert!(feed.events().is_empty());
        assert!(feed.find("1").is_none());
    }
}
