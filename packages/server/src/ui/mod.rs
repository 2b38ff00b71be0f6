//! HTTP and server-sent event surface of the quiz host.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
