pub mod charts;
pub mod config;
pub mod data;
pub mod layout;
pub mod logging;
pub mod reconcile;
pub mod server;
pub mod view;
