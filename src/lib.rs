pub mod config;
pub mod db;
pub mod http;
pub mod mapper;
pub mod mirror;
pub mod model;
pub mod notion;
pub mod provision;
pub mod resolver;
pub mod sample;
pub mod service;
