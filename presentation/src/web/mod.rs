//! Browser front end: a static chat page plus a WebSocket per session

pub mod protocol;
pub mod server;

pub use protocol::{ClientFrame, ServerFrame, THINKING_TEXT};
pub use server::{WebState, drive_socket, router, serve};
