//! Transport layer for the Polarion SDK.

pub mod http;

pub use http::HttpTransport;
