pub mod pending;
pub mod rules;

pub use pending::{PendingCandidate, PendingSelection, SelectionOutcome, SelectionState};
pub use rules::{DurationPreference, WorkHours};
