//! REST API for Evaluacion records.
//!
//! Provides the `/api/evaluacions` endpoints, request routing and the
//! hyper server loop.

pub mod handlers;
pub mod router;
pub mod server;
