// Library for tests to access modules

pub mod calendar;
pub mod config;
pub mod engine;
pub mod models;
pub mod provider;
pub mod routes;
pub mod view;
pub mod worker;
