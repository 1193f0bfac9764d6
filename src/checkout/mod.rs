pub mod handoff;

pub use handoff::{CheckoutHandoff, HandoffError, HandoffOutcome, Navigator, Notice};
