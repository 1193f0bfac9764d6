pub mod client;

pub use client::{ApiError, BookingApi, CheckoutRequest, HttpBookingClient};
