pub mod agenda;
pub mod boundary;
pub mod join;
pub mod session_card;
