use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

use thiserror::Error;

use crate::api::client::{ApiError, BookingApi, BookingRequest, CheckoutRequest, ClassBookingRequest};
use crate::booking::display_event::DisplayEvent;
use crate::booking::resource::ResourceId;

pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    FullyBooked,
    BookingSucceeded,
    BookingFailed(String),
    PaymentError(String),
    LoadFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::FullyBooked => write!(f, "This slot is fully booked."),
            Notice::BookingSucceeded => write!(f, "Booking successful"),
            Notice::BookingFailed(detail) => write!(f, "Booking failed: {}", detail),
            Notice::PaymentError(detail) => write!(f, "Payment error: {}", detail),
            Notice::LoadFailed => write!(f, "Failed to load calendar."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandoffOutcome {
    Redirected(String),
    Booked,
    FullyBooked,
    AlreadyInFlight,
}

impl HandoffOutcome {
    pub fn notice(&self) -> Option<Notice> {
        match self {
            HandoffOutcome::Booked => Some(Notice::BookingSucceeded),
            HandoffOutcome::FullyBooked => Some(Notice::FullyBooked),
            HandoffOutcome::Redirected(_) | HandoffOutcome::AlreadyInFlight => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("Booking request failed: {0}")]
    Booking(#[source] ApiError),
    #[error("Payment request failed: {0}")]
    Payment(#[source] ApiError),
    #[error("Backend returned no checkout URL")]
    MissingCheckoutUrl,
}

impl HandoffError {
    pub fn notice(&self) -> Notice {
        match self {
            HandoffError::Booking(err) => Notice::BookingFailed(err.user_detail()),
            HandoffError::Payment(err) => Notice::PaymentError(err.user_detail()),
            HandoffError::MissingCheckoutUrl => {
                Notice::PaymentError(crate::api::client::GENERIC_FAILURE.to_string())
            }
        }
    }
}

struct InFlight<'a> {
    targets: &'a Mutex<HashSet<String>>,
    key: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut targets = self.targets.lock().unwrap_or_else(|e| e.into_inner());
        targets.remove(&self.key);
    }
}

pub struct CheckoutHandoff<A, N> {
    api: A,
    navigator: N,
    student_id: u64,
    in_flight: Mutex<HashSet<String>>,
}

impl<A: BookingApi, N: Navigator> CheckoutHandoff<A, N> {
    pub fn new(api: A, navigator: N, student_id: u64) -> Self {
        Self {
            api,
            navigator,
            student_id,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    fn claim(&self, key: String) -> Option<InFlight<'_>> {
        let mut targets = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !targets.insert(key.clone()) {
            tracing::debug!("Ignoring repeated request for {}", key);
            return None;
        }
        Some(InFlight {
            targets: &self.in_flight,
            key,
        })
    }

    pub async fn book_resource(&self, event: &DisplayEvent) -> Result<HandoffOutcome, HandoffError> {
        let Some(_guard) = self.claim(format!("resource:{}", event.id)) else {
            return Ok(HandoffOutcome::AlreadyInFlight);
        };

        let resource = &event.resource;
        if resource.is_full() {
            tracing::warn!("Slot {} is full ({}/{})", event.id, resource.booked, resource.max);
            return Ok(HandoffOutcome::FullyBooked);
        }

        if resource.is_free() {
            let request = BookingRequest {
                session_id: resource.id,
                call_type: resource.kind.call_type().to_string(),
            };
            let confirmation = self
                .api
                .create_booking(&request)
                .await
                .map_err(HandoffError::Booking)?;
            tracing::info!("Booked slot {} as booking {}", event.id, confirmation.id);
            return Ok(HandoffOutcome::Booked);
        }

        self.pay_for_session(resource.id).await
    }

    pub async fn checkout_candidate(&self, request: &CheckoutRequest) -> Result<HandoffOutcome, HandoffError> {
        let Some(_guard) = self.claim(crate::selection::pending::PENDING_ID.to_string()) else {
            return Ok(HandoffOutcome::AlreadyInFlight);
        };

        let session = self
            .api
            .create_checkout_session(request)
            .await
            .map_err(HandoffError::Payment)?;
        Ok(self.redirect(session.url))
    }

    pub async fn pay_to_join(&self, session_id: ResourceId) -> Result<HandoffOutcome, HandoffError> {
        let Some(_guard) = self.claim(format!("join:{}", session_id)) else {
            return Ok(HandoffOutcome::AlreadyInFlight);
        };
        self.pay_for_session(session_id).await
    }

    async fn pay_for_session(&self, session_id: ResourceId) -> Result<HandoffOutcome, HandoffError> {
        let request = ClassBookingRequest {
            student_id: self.student_id,
            session_id,
        };
        let response = self
            .api
            .book_class(&request)
            .await
            .map_err(HandoffError::Payment)?;
        let url = response
            .stripe_checkout_url
            .filter(|u| !u.is_empty())
            .ok_or(HandoffError::MissingCheckoutUrl)?;
        Ok(self.redirect(url))
    }

    fn redirect(&self, url: String) -> HandoffOutcome {
        tracing::info!("Redirecting to payment page {}", url);
        self.navigator.navigate(&url);
        HandoffOutcome::Redirected(url)
    }
}
