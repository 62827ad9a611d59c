pub mod app;
pub mod config;
pub mod connectivity;
pub mod debounce;
pub mod detail;
pub mod favorites;
pub mod models;
pub mod omdb;
pub mod recent;
pub mod search;
pub mod store;
pub mod theme;
pub mod view;
