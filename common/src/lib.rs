//! Data model shared between the phone validation service and its clients.

pub mod jobs;
pub mod model;
pub mod requests;
pub mod responses;
