pub mod server;
pub mod manager;
pub mod session;
pub mod messages;

pub use server::GameSession;
pub use manager::GameSessionManager;
