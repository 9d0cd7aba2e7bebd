//! The upload -> processing -> report job subsystem.
//!
//! One analysis job exists per session. Its state lives in [`store::JobStore`]
//! (persisted to local storage on every write), all transitions go through the
//! pure [`machine::apply`] function, and the async edges (upload transfer,
//! status polling, report retrieval) each live in their own submodule and
//! report back as plain `Result` events.

pub mod machine;
pub mod poller;
pub mod report;
pub mod store;
pub mod upload;
