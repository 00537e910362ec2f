use thiserror::Error;

pub type OtResult<T> = Result<T, OtError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OtError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Wall-clock limit of {limit_s:.1}s exceeded after {elapsed_s:.1}s")]
    WallClock { limit_s: f64, elapsed_s: f64 },
}
