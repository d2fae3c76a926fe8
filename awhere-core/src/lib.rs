//! Core library for the `awhere` weather client.
//!
//! This crate defines:
//! - Credentials handling and the OAuth2 client-credentials exchange
//! - Validation of query options and reshaping of weather responses
//! - `WeatherClient` and its location-bound `WeatherStation`
//!
//! Everything is blocking and single-threaded: one call, one round trip.
//! It is used by `awhere-cli`, but can also be reused by other binaries.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod station;
pub mod transport;

pub use auth::{AccessToken, encode_credentials};
pub use client::{ClientState, WeatherClient};
pub use config::{ClientConfig, Credentials, CredentialsFile};
pub use error::{Error, Result};
pub use model::{Attribute, Dataset, QueryOptions, reshape_response, validate_parameters};
pub use station::WeatherStation;
pub use transport::{HttpResponse, HttpTransport, Transport};
