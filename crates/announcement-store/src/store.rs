//! Ordered, de-duplicated announcement list for one course.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::model::{Announcement, AnnouncementId};

/// Announcements newest-first, unique by id.
///
/// History loads replace everything; live deliveries are prepended
/// without re-sorting, so a late socket item can sit above a newer
/// REST item until the next reload.
#[derive(Debug, Default, Clone)]
pub struct AnnouncementStore {
    items: Vec<Announcement>,
    seen: HashSet<AnnouncementId>,
}

impl AnnouncementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a fresh history fetch.
    ///
    /// Returns the ids that were not known before this call, in list order.
    /// Duplicate ids inside `list` keep their first occurrence.
    pub fn replace_all(&mut self, list: Vec<Announcement>) -> Vec<AnnouncementId> {
        let previous = std::mem::take(&mut self.seen);
        let mut items = Vec::with_capacity(list.len());
        let mut newly_seen = Vec::new();

        for announcement in list {
            if !self.seen.insert(announcement.id.clone()) {
                tracing::debug!(id = %announcement.id, "Duplicate id in history response dropped");
                continue;
            }
            if !previous.contains(&announcement.id) {
                newly_seen.push(announcement.id.clone());
            }
            items.push(announcement);
        }

        self.items = items;
        newly_seen
    }

    /// Insert a live delivery at the front as unread.
    ///
    /// Returns `false` (and leaves the list untouched) if the id is already present.
    pub fn prepend(&mut self, mut announcement: Announcement) -> bool {
        if self.seen.contains(&announcement.id) {
            tracing::debug!(id = %announcement.id, "Announcement already present, skipping");
            return false;
        }
        announcement.mark_unread();
        self.seen.insert(announcement.id.clone());
        self.items.insert(0, announcement);
        true
    }

    /// Returns `true` only if the item existed and was unread.
    pub fn mark_read(&mut self, id: &AnnouncementId, at: DateTime<Utc>) -> bool {
        self.items
            .iter_mut()
            .find(|a| &a.id == id)
            .is_some_and(|a| a.mark_read(at))
    }

    pub fn get(&self, id: &AnnouncementId) -> Option<&Announcement> {
        self.items.iter().find(|a| &a.id == id)
    }

    pub fn contains(&self, id: &AnnouncementId) -> bool {
        self.seen.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Announcement> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Announcement] {
        &self.items
    }

    pub fn ids(&self) -> Vec<AnnouncementId> {
        self.items.iter().map(|a| a.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_unread(&self) -> bool {
        self.items.iter().any(Announcement::is_unread)
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|a| a.is_unread()).count()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.seen.clear();
    }
}
