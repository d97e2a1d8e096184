//! carctl
//!
//! Terminal remote control for a WebSocket-connected wheeled robot.
//! The firmware reads single ASCII characters off the socket, so the
//! whole wire protocol is one character per command.

#![forbid(unsafe_code)]

pub mod command;
pub mod config;
pub mod console;
pub mod controller;
pub mod transport;
