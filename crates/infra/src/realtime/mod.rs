//! Push channel adapters

pub mod websocket;

pub use websocket::{WebSocketChannel, WebSocketConnector};
