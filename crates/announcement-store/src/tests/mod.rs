use chrono::{DateTime, TimeZone, Utc};

use crate::{Announcement, AnnouncementKind};

fn ts(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
}

fn communication(id: i64, day: u32) -> Announcement {
    Announcement::new(id, AnnouncementKind::Communication, format!("Note {id}"), "Hi")
        .with_created_at(ts(day))
}

fn class(id: i64, day: u32, link: &str) -> Announcement {
    Announcement::new(id, AnnouncementKind::ClassSchedule, format!("Class {id}"), "Live now")
        .with_class_link(link)
        .with_created_at(ts(day))
}
