//! Data models for the application

mod item;

pub use item::*;
