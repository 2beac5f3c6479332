pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod planner;
pub mod scoring;
pub mod session;
pub mod state;

#[cfg(test)]
pub mod testing;
