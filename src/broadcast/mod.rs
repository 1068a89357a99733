//! Broadcast module
//!
//! Pushes alert transitions, snapshots and cycle stats to any number of
//! subscribers, locally or over WebSocket.

mod channel;
mod events;
mod server;

pub use channel::{BroadcastChannel, Subscription, SubscriptionId, DEFAULT_SUBSCRIBER_BUFFER};
pub use events::ScannerEvent;
pub use server::DashboardServer;
