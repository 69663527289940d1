//! Functionality that needs the standard library, such as interacting with
//! audio devices.

pub mod recording;
