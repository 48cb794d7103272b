//! HTTP front ends: the real axum server and a raw-socket mock.

pub mod http;
pub mod mock;

pub use http::{router, SharedPredictor};
