//! Language server publishing disposal diagnostics.

mod capabilities;
mod handlers;
mod server;

pub use handlers::ServerState;
pub use server::run_server;
