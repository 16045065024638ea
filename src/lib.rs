//! rowsel library: row selection controller and the terminal app built on it.

pub mod app_core;
pub mod data;
pub mod model;
pub mod selection;
pub mod theme;
pub mod ui;
