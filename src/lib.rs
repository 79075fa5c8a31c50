//! cmd-relay: a single-shot remote command relay over TCP
//!
//! A client connects, sends a command name, and receives the raw output
//! bytes until the server closes the connection. The server runs in one
//! of two modes:
//! - `exec`: execute the command if it is whitelisted, stream its stdout
//! - `stream`: ignore the request and stream a fixed synthetic payload
//!
//! The protocol is deliberately one-shot and unframed: one request per
//! connection, response end signalled by connection close.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod exec;
pub mod payload;
pub mod server;
