pub mod config;
pub mod features;
pub mod form;
pub mod importance;
pub mod logging;
pub mod model;
pub mod stats;
