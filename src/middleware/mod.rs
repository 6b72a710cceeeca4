//! Middleware module
//!
//! Cached device session on top of the raw driver.

pub mod rtc_api;
