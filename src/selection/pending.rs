use chrono::NaiveDateTime;
use thiserror::Error;

use crate::api::client::CheckoutRequest;
use crate::selection::rules::{duration_minutes, is_allowed_duration, DurationPreference, WorkHours};

/// Identifier of the pending candidate. Never collides with a mapped event id,
/// which are either numeric or prefixed with `class-`.
pub const PENDING_ID: &str = "pending";

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("No slot is selected")]
    NoCandidate,
    #[error("A checkout for this slot is already in progress")]
    CheckoutInFlight,
    #[error("No checkout is in progress")]
    NotInFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingCandidate {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl PendingCandidate {
    pub fn id(&self) -> &'static str {
        PENDING_ID
    }

    pub fn duration_minutes(&self) -> u32 {
        duration_minutes(self.start, self.end)
    }

    /// Advisory only; the backend computes the amount actually charged.
    pub fn price_preview(&self, hourly_rate_cents: u32) -> u64 {
        u64::from(hourly_rate_cents) * u64::from(self.duration_minutes()) / 60
    }

    pub fn to_checkout_request(&self) -> CheckoutRequest {
        CheckoutRequest {
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    Empty,
    Active(PendingCandidate),
    CheckoutInFlight(PendingCandidate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Created,
    Normalized,
    Rejected,
    Moved,
    Snapped,
    Reverted,
    Ignored,
    Cancelled,
}

pub struct PendingSelection {
    state: SelectionState,
    preference: DurationPreference,
    hours: WorkHours,
}

impl PendingSelection {
    /// Selections are always bounded by the standard 06:00-21:00 work hours,
    /// whatever range the calendar happens to display.
    pub fn new(preference: DurationPreference) -> Self {
        Self {
            state: SelectionState::Empty,
            preference,
            hours: WorkHours::default(),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn candidate(&self) -> Option<&PendingCandidate> {
        match &self.state {
            SelectionState::Empty => None,
            SelectionState::Active(c) | SelectionState::CheckoutInFlight(c) => Some(c),
        }
    }

    pub fn preference(&self) -> DurationPreference {
        self.preference
    }

    pub fn set_preference(&mut self, preference: DurationPreference) {
        self.preference = preference;
    }

    pub fn is_checkout_in_flight(&self) -> bool {
        matches!(self.state, SelectionState::CheckoutInFlight(_))
    }

    pub fn select(&mut self, start: NaiveDateTime, end: NaiveDateTime) -> SelectionOutcome {
        if self.is_checkout_in_flight() {
            return SelectionOutcome::Ignored;
        }
        self.state = SelectionState::Empty;
        let end = end.max(start);

        if !self.hours.contains(start, end) {
            tracing::warn!("Selection {} - {} is outside work hours, discarded", start, end);
            return SelectionOutcome::Rejected;
        }

        if is_allowed_duration(duration_minutes(start, end)) {
            self.activate(start, end);
            return SelectionOutcome::Created;
        }

        let end = start + self.preference.as_duration();
        if !self.hours.contains(start, end) {
            tracing::warn!("Selection starting {} cannot fit {} minutes", start, self.preference.minutes());
            return SelectionOutcome::Rejected;
        }
        self.activate(start, end);
        SelectionOutcome::Normalized
    }

    pub fn click_start(&mut self, point: NaiveDateTime) -> SelectionOutcome {
        if self.is_checkout_in_flight() {
            return SelectionOutcome::Ignored;
        }
        self.state = SelectionState::Empty;

        let end = point + self.preference.as_duration();
        if !self.hours.contains(point, end) {
            tracing::warn!("Click at {} is outside work hours, discarded", point);
            return SelectionOutcome::Rejected;
        }
        self.activate(point, end);
        SelectionOutcome::Created
    }

    pub fn mutate(
        &mut self,
        target_id: &str,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) -> SelectionOutcome {
        if target_id != PENDING_ID {
            return SelectionOutcome::Ignored;
        }
        let SelectionState::Active(candidate) = &mut self.state else {
            return SelectionOutcome::Ignored;
        };

        if self.hours.contains(new_start, new_end)
            && is_allowed_duration(duration_minutes(new_start, new_end))
        {
            candidate.start = new_start;
            candidate.end = new_end;
            tracing::info!("Candidate moved to {} - {}", new_start, new_end);
            return SelectionOutcome::Moved;
        }

        let snapped_end = new_start + self.preference.as_duration();
        if self.hours.contains(new_start, snapped_end) {
            candidate.start = new_start;
            candidate.end = snapped_end;
            tracing::info!("Candidate snapped to {} - {}", new_start, snapped_end);
            return SelectionOutcome::Snapped;
        }

        tracing::warn!(
            "Move to {} - {} rejected, keeping {} - {}",
            new_start,
            new_end,
            candidate.start,
            candidate.end
        );
        SelectionOutcome::Reverted
    }

    pub fn cancel(&mut self) -> SelectionOutcome {
        if self.is_checkout_in_flight() {
            return SelectionOutcome::Ignored;
        }
        self.state = SelectionState::Empty;
        SelectionOutcome::Cancelled
    }

    pub fn confirm(&mut self) -> Result<CheckoutRequest, SelectionError> {
        match std::mem::replace(&mut self.state, SelectionState::Empty) {
            SelectionState::Empty => Err(SelectionError::NoCandidate),
            SelectionState::CheckoutInFlight(candidate) => {
                self.state = SelectionState::CheckoutInFlight(candidate);
                Err(SelectionError::CheckoutInFlight)
            }
            SelectionState::Active(candidate) => {
                let request = candidate.to_checkout_request();
                tracing::info!("Checkout started for {} - {}", candidate.start, candidate.end);
                self.state = SelectionState::CheckoutInFlight(candidate);
                Ok(request)
            }
        }
    }

    pub fn checkout_succeeded(&mut self) -> Result<(), SelectionError> {
        if !self.is_checkout_in_flight() {
            return Err(SelectionError::NotInFlight);
        }
        self.state = SelectionState::Empty;
        Ok(())
    }

    pub fn checkout_failed(&mut self) -> Result<(), SelectionError> {
        match std::mem::replace(&mut self.state, SelectionState::Empty) {
            SelectionState::CheckoutInFlight(candidate) => {
                self.state = SelectionState::Active(candidate);
                Ok(())
            }
            other => {
                self.state = other;
                Err(SelectionError::NotInFlight)
            }
        }
    }

    fn activate(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        tracing::info!("Candidate selected {} - {}", start, end);
        self.state = SelectionState::Active(PendingCandidate { start, end });
    }
}

impl Default for PendingSelection {
    fn default() -> Self {
        Self::new(DurationPreference::default())
    }
}
