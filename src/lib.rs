pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod input;
pub mod model;
pub mod render;
pub mod sink;
pub mod ui;
