use std::net::IpAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Address resolution failed for {0}")]
    AddressResolution(String),

    #[error("No geolocation record for {0}")]
    NoRecord(IpAddr),

    #[error("Database lookup error: {0}")]
    Lookup(String),

    #[error("Failed to open country database: {0}")]
    Database(#[from] maxminddb::MaxMindDbError),
}

pub type Result<T> = std::result::Result<T, Error>;
