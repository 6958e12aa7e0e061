// Library for tests to access modules

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod health;
pub mod metrics_client;
pub mod models;
pub mod snapshot_repo;
pub mod views;
