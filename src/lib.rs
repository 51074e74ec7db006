pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod imaging;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod upstream;
pub mod validation;
