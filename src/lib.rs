// Library for tests to access modules

pub mod config;
pub mod history;
pub mod interference;
pub mod models;
pub mod probes;
pub mod quality;
pub mod routes;
pub mod sampler;
pub mod tips;
pub mod version;
