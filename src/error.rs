//! Crate-wide error taxonomy.
//!
//! One variant per error kind in the propagation policy: `Config` is fatal
//! at stage start, `Parse`/`Validation` terminate a single event (logged,
//! no publish, committed as processed), `Upstream` rolls back the current
//! write chunk and surfaces, `Bus` is fatal to the owning stage, `Handler`
//! is isolated to the event that raised it.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("bus error: {0}")]
    Bus(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("handler error: {0}")]
    Handler(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
