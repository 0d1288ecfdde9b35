//! HTTP API: routing, request validation and response mapping over the
//! clinic agents.

pub mod app;
