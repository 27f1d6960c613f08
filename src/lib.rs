pub mod config;
pub mod exercise;
pub mod logging;
pub mod pose;
pub mod replay;
