//! Live update pipeline: watch, render, broadcast.
//!
//! One logical flow per file-change event: the watcher debounces raw
//! filesystem events, each drained event becomes a generation-tagged render
//! cycle, and the broadcaster fans the accepted cycle out to every connected
//! WebSocket consumer.

mod broadcaster;
mod debouncer;
mod watcher;
mod websocket;

pub(crate) use broadcaster::UpdateBroadcaster;
pub(crate) use watcher::ChangeWatcher;
pub(crate) use websocket::ws_handler;
