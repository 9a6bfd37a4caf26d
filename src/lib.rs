pub mod config;
pub mod error;
pub mod metrics;
pub mod player;
pub mod registry;
pub mod room;
pub mod routes;
pub mod startup;
pub mod websocket;
pub mod words;
