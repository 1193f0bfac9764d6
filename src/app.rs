use chrono::NaiveDateTime;
use thiserror::Error;
use tokio::sync::watch;

use crate::api::client::{ApiError, BookingApi, NextSession};
use crate::booking::feed::{EventFeed, FeedState};
use crate::checkout::handoff::{CheckoutHandoff, HandoffError, HandoffOutcome, Navigator, Notice};
use crate::display::join::{JoinView, MISSING_INVITE_CODE};
use crate::selection::pending::{PendingSelection, SelectionError, SelectionOutcome, SelectionState};
use crate::selection::rules::{DurationPreference, RulesError, WorkHours};
use crate::storage::config::{Config, ConfigError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Handoff(#[from] HandoffError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error("No slot with id {0}")]
    UnknownEvent(String),
    #[error("No invite code provided")]
    MissingInviteCode,
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Handoff(err) => err.notice().to_string(),
            AppError::Api(err) => err.user_detail(),
            AppError::MissingInviteCode => MISSING_INVITE_CODE.to_string(),
            other => other.to_string(),
        }
    }
}

pub struct BookingApp<A, N> {
    feed: EventFeed,
    selection: PendingSelection,
    handoff: CheckoutHandoff<A, N>,
    hourly_rate_cents: Option<u32>,
    display_hours: WorkHours,
}

impl<A: BookingApi, N: Navigator> BookingApp<A, N> {
    pub fn new(config: &Config, api: A, navigator: N) -> Result<Self, ConfigError> {
        let selection = PendingSelection::new(config.booking.duration_preference()?);
        Ok(Self {
            feed: EventFeed::new(),
            selection,
            handoff: CheckoutHandoff::new(api, navigator, config.api.student_id),
            hourly_rate_cents: config.booking.hourly_rate_cents,
            display_hours: config.booking.display_hours()?,
        })
    }

    pub fn display_hours(&self) -> WorkHours {
        self.display_hours
    }

    pub fn feed(&self) -> &EventFeed {
        &self.feed
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.feed.subscribe()
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub async fn reload(&self) -> FeedState {
        self.feed.load(self.handoff.api()).await
    }

    pub fn set_duration(&mut self, minutes: u32) -> Result<(), AppError> {
        self.selection.set_preference(DurationPreference::new(minutes)?);
        Ok(())
    }

    pub fn select(&mut self, start: NaiveDateTime, end: NaiveDateTime) -> SelectionOutcome {
        self.selection.select(start, end)
    }

    pub fn click_start(&mut self, point: NaiveDateTime) -> SelectionOutcome {
        self.selection.click_start(point)
    }

    pub fn move_event(&mut self, event_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> SelectionOutcome {
        self.selection.mutate(event_id, start, end)
    }

    pub fn cancel(&mut self) -> SelectionOutcome {
        self.selection.cancel()
    }

    pub fn price_preview(&self) -> Option<u64> {
        let rate = self.hourly_rate_cents?;
        self.selection.candidate().map(|c| c.price_preview(rate))
    }

    pub async fn confirm_pending(&mut self) -> Result<HandoffOutcome, AppError> {
        let request = self.selection.confirm()?;

        match self.handoff.checkout_candidate(&request).await {
            Ok(outcome @ HandoffOutcome::Redirected(_)) => {
                self.selection.checkout_succeeded()?;
                Ok(outcome)
            }
            Ok(outcome) => {
                self.selection.checkout_failed()?;
                Ok(outcome)
            }
            Err(err) => {
                tracing::error!("Checkout failed: {}", err);
                self.selection.checkout_failed()?;
                Err(err.into())
            }
        }
    }

    pub async fn book_event(&self, event_id: &str) -> Result<HandoffOutcome, AppError> {
        let event = self
            .feed
            .find(event_id)
            .ok_or_else(|| AppError::UnknownEvent(event_id.to_string()))?;

        let outcome = self.handoff.book_resource(&event).await?;
        if outcome == HandoffOutcome::Booked {
            self.reload().await;
        }
        Ok(outcome)
    }

    pub async fn join_view(&self, invite_code: &str) -> Result<JoinView, AppError> {
        if invite_code.trim().is_empty() {
            return Err(AppError::MissingInviteCode);
        }
        let info = self.handoff.api().join_info(invite_code.trim()).await?;
        Ok(JoinView::from_info(&info))
    }

    pub async fn pay_to_join(&self, view: &JoinView) -> Result<Option<HandoffOutcome>, AppError> {
        match view {
            JoinView::PayToJoin { session_id, .. } => Ok(Some(self.handoff.pay_to_join(*session_id).await?)),
            JoinView::Links { .. } | JoinView::NoLinks => Ok(None),
        }
    }

    pub async fn next_session(&self) -> Result<NextSession, AppError> {
        Ok(self.handoff.api().next_session().await?)
    }

    pub fn load_failure_notice(&self) -> Option<Notice> {
        match self.feed.state() {
            FeedState::Failed(_) => Some(Notice::LoadFailed),
            FeedState::Loading | FeedState::Ready(_) => None,
        }
    }
}
