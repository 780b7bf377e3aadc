pub mod api;
pub mod config;
pub mod controllers;
pub mod errors;
pub mod models;
pub mod presentation;
pub mod router;
pub mod session;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;
