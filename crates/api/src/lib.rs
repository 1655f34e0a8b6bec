//! HTTP API: server, routing, and request/response mapping.
//!
//! Handlers are thin adapters: they parse a request, call into the domain
//! services, and map the result onto JSON. Domain records never serialize
//! straight onto the wire.

pub mod app;
