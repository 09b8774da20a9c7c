//! Client-held announcement state for a single course.
//!
//! Provides the normalized announcement model, the ordered de-duplicating
//! store that merges REST history with live deliveries, and the presenter
//! that decides how a new announcement is surfaced as an OS notification.

pub mod model;
pub mod presenter;
pub mod store;

#[cfg(test)]
mod tests;

pub use model::{Announcement, AnnouncementId, AnnouncementKind};
pub use presenter::{
    CLASS_LINK_HINT, ClickAction, NotificationPermission, NotificationPlan, NotificationPresenter,
};
pub use store::AnnouncementStore;
