//! Core library for the beacon CLI.
//!
//! Three concerns live here: the REST client and resource models
//! ([`rest`], [`types`]), name-to-identifier resolution ([`resolve`]), and
//! the result transcoders that turn a call's response into rendered bytes
//! ([`output`]). The transcoders are the interesting part; everything else
//! is request-construction glue.

pub mod error;
pub mod output;
pub mod resolve;
pub mod rest;
pub mod types;

pub use error::ApiError;
pub use rest::{ApiClient, Envelope, Method};
