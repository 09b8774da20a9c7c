//! Student-facing announcement pipeline of the academy portal.
//!
//! Wires the REST client, the live channel and the announcement store to a
//! host platform: push subscription setup, the background notification
//! handler, foreground notification dispatch and the announcements view.

pub mod app;
pub mod backend;
pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod events;
pub mod notification;
pub mod platform;
pub mod publish;
pub mod push;
pub mod shutdown;
pub mod view;

#[cfg(test)]
mod testing;

pub use bootstrap::init_foundation;
pub use notification::worker::BackgroundNotificationHandler;
pub use push::PushSubscriptionManager;
pub use view::AnnouncementsView;
