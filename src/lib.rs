use thiserror::Error;

pub mod clock;
pub mod scheduling;

/// Error type for all timer operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArmillaError {
    #[error("interval is zero, timer would always be due")]
    ZeroInterval,
    #[error("timer store could not grow to hold a new slot")]
    StoreExhausted,
    #[error("stale or unknown timer handle")]
    StaleHandle,
}
