//! UI layer: HTTP / WebSocket server.

mod config;
mod handler;
mod router;
mod server;
mod signal;
pub mod state; // UseCase の組み立てをテストからも行うため public

pub use config::ServerConfig;
pub use router::{MessageRouter, RouterState};
pub use server::Server;
