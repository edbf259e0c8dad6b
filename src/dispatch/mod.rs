//! Background job dispatch for finished uploads.

mod dispatcher;
mod latest;

pub use dispatcher::JobDispatcher;
pub use latest::LatestResult;
