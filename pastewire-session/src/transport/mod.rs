mod config;
mod connection;
mod event;
mod gather;

pub use config::TransportConfig;
pub use connection::ConnectionHandle;
pub use event::{ConnectionStatus, TransportEvent};
pub use gather::gather;
