pub mod assets;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod generator;
pub mod models;
pub mod palette;
pub mod resolver;
pub mod services;
pub mod store;
pub mod utils;
pub mod web;
