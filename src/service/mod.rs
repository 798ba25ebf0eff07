//! Service layer: connection event dispatch.
//!
//! [`Dispatcher`] sits between the transports and the topic table and is
//! the only place that decides what a request or frame gets back.

pub mod dispatcher;

pub use dispatcher::{ConnectionEvent, ConnectionPhase, DispatchOptions, Dispatcher, Reply};
