//! Request handlers.

mod http;
mod websocket;

pub use http::{clear_chat_history, get_chat_history, health_check};
pub use websocket::websocket_handler;
