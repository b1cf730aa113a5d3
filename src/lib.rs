pub mod commands;
pub mod http;
pub mod input;
pub mod pagination;
pub mod provider;
pub mod render;
pub mod runtime;
pub mod session;
