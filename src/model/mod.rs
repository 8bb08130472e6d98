//! Per-user behavioral model: bounded history of past daily profiles.

mod window;

pub use window::{Eviction, Window, WindowCapacity};
