pub mod engine;
pub mod services;
pub mod session;
pub mod utils;
