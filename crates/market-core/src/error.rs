use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Price series is empty")]
    EmptySeries,

    #[error("Misaligned price series: {0}")]
    MisalignedSeries(String),

    #[error("Non-positive price {price} on {date}")]
    NonPositivePrice { date: String, price: f64 },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Unknown trade timing: {0}")]
    UnknownTiming(String),

    #[error("Session is paused waiting for a decision")]
    SessionPaused,

    #[error("Session already completed")]
    SessionCompleted,

    #[error("No pending event to resolve")]
    NoPendingEvent,
}
