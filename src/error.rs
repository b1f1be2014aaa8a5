//! Error types for the bridge relayer

use thiserror::Error;

/// Main error type for the relayer core
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No batch stored in the executor")]
    NilBatch,

    #[error("Invalid deposit nonce for deposit {deposit}, got {nonce}, expected {expected}")]
    InvalidDepositNonce {
        deposit: String,
        nonce: u64,
        expected: u64,
    },

    #[error("Batch not found, requested nonce {requested}, fetched nonce {fetched}, num deposits {num_deposits}")]
    BatchNotFound {
        requested: u64,
        fetched: u64,
        num_deposits: usize,
    },

    #[error("Invalid gas price selector: {0:?}")]
    InvalidGasPriceSelector(String),

    #[error("Latest gas prices were not fetched")]
    GasPricesNotFetched,

    #[error("Gas price is higher than the maximum set, maximum {maximum}, fetched {fetched}, selector {selector}")]
    GasPriceAboveMaximum {
        maximum: u64,
        fetched: u64,
        selector: &'static str,
    },

    #[error("Invalid value for {name}, got {got}, minimum {minimum}")]
    InvalidValue {
        name: &'static str,
        got: u64,
        minimum: u64,
    },

    #[error("Invalid duration for {name}, got {got_millis} ms, minimum {minimum_millis} ms")]
    InvalidDuration {
        name: &'static str,
        got_millis: u128,
        minimum_millis: u128,
    },

    #[error("Unknown step identifier: {0}")]
    UnknownStep(String),

    #[error("Chain client error: {0}")]
    Client(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BridgeError {
    /// Recoverable errors make a step rewind to the initial step identifier;
    /// everything else is a construction or driver fault and propagates.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BridgeError::NilBatch
                | BridgeError::InvalidDepositNonce { .. }
                | BridgeError::BatchNotFound { .. }
                | BridgeError::Client(_)
                | BridgeError::Http(_)
        )
    }
}

/// Result type for relayer operations
pub type BridgeResult<T> = Result<T, BridgeError>;
