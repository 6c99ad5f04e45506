pub mod config;
pub mod datasets;
pub mod frame;
pub mod join;
pub mod logging;
pub mod names;
pub mod pipeline;
pub mod players;
pub mod reconcile;
pub mod report;
