//! Drivers module
//!
//! Register map, codec and bus access for the DS1307 family.

pub mod model;
pub mod registers;
pub mod rtc;
