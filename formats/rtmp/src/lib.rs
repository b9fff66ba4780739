pub mod chunk;
pub mod command;
pub mod handshake;
pub mod message;
pub mod protocol_control;
pub mod shared_object;
pub mod user_control;
