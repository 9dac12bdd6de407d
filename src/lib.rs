// Library surface for headless/integration tests and reuse.
// The binary in main.rs only wires the terminal to these pieces.
pub mod app;
pub mod app_dirs;
pub mod bounce;
pub mod clock;
pub mod config;
pub mod controller;
pub mod flash;
pub mod format;
pub mod log_store;
pub mod log_worker;
pub mod runtime;
pub mod session;
pub mod store;
pub mod ui;
