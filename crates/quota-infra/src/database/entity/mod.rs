//! SeaORM entities.

pub mod usage_window;
