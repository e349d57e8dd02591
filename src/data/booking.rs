//! Wire models shared between the client and the `#[server]` functions.
//!
//! Shapes follow the Plek REST backend: bookings carry RFC 3339 instants
//! with an explicit UTC offset, and all slot math happens in the institute's
//! fixed civil timezone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slots::{BookedInterval, SlotCalendar};

/// A booking as returned by `GET /rooms/{id}/?date=YYYY-MM-DD`, already
/// scoped to one room. Fetched fresh per date change and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingBooking {
    pub id: i64,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
}

/// Response of the per-date room lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomDay {
    #[serde(default)]
    pub bookings: Vec<ExistingBooking>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub building_name: Option<String>,
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// Create payload for `POST /bookings/create/`. New bookings always enter
/// the approval workflow as pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub room: i64,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    pub purpose: String,
    pub participants: String,
    pub attendees_count: u32,
    pub notes: String,
}

impl BookingDraft {
    pub fn pending(
        room: i64,
        interval: BookedInterval,
        purpose: String,
        participants: String,
        attendees_count: u32,
        notes: String,
    ) -> Self {
        Self {
            room,
            start_time: interval.start_time,
            end_time: interval.end_time,
            status: "PENDING".to_string(),
            purpose,
            participants,
            attendees_count,
            notes,
        }
    }
}

/// Update payload for `PUT /bookings/update/{id}/`. Room and status are not
/// client-changeable on modification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingChange {
    pub start_time: String,
    pub end_time: String,
    pub purpose: String,
    pub participants: String,
    pub notes: String,
}

/// One of the user's own bookings, with the room expanded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub id: i64,
    pub room: Room,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub participants: String,
    #[serde(default)]
    pub notes: String,
}

/// Splits bookings into upcoming and previous. Cancelled and rejected
/// bookings always land in previous regardless of date; unparseable start
/// times are treated as past. Upcoming is sorted soonest-first, previous
/// most-recent-first.
pub fn categorize(
    bookings: Vec<BookingSummary>,
    now: DateTime<FixedOffset>,
) -> (Vec<BookingSummary>, Vec<BookingSummary>) {
    let mut upcoming = Vec::new();
    let mut previous = Vec::new();
    for booking in bookings {
        let finished = matches!(
            booking.status.to_ascii_lowercase().as_str(),
            "cancelled" | "rejected"
        );
        if !finished && is_upcoming(&booking, now) {
            upcoming.push(booking);
        } else {
            previous.push(booking);
        }
    }
    upcoming.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    previous.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    (upcoming, previous)
}

fn is_upcoming(booking: &BookingSummary, now: DateTime<FixedOffset>) -> bool {
    match DateTime::parse_from_rfc3339(&booking.start_time) {
        Ok(start) => start > now,
        Err(_) => false,
    }
}

/// Slot-grid configuration served to the client: the institute's fixed UTC
/// offset and the working-hours policy the calendar is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    pub timezone_offset_minutes: i32,
    pub slot_minutes: u16,
    pub working_hours_start: String,
    pub working_hours_end: String,
}

impl Default for BookingConfig {
    /// Compatibility defaults: Asia/Kolkata and the 9:00-17:00 hourly grid.
    fn default() -> Self {
        Self {
            timezone_offset_minutes: 330,
            slot_minutes: 60,
            working_hours_start: "09:00".to_string(),
            working_hours_end: "17:00".to_string(),
        }
    }
}

impl BookingConfig {
    pub fn zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.timezone_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }

    pub fn calendar(&self) -> SlotCalendar {
        match (
            parse_working_hour(&self.working_hours_start),
            parse_working_hour(&self.working_hours_end),
        ) {
            (Some(start), Some(end)) => {
                SlotCalendar::from_working_hours(start, end, self.slot_minutes)
            }
            _ => SlotCalendar::institute_default(),
        }
    }

    /// Today in the institute's civil calendar.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.zone()).date_naive()
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.zone())
    }
}

/// Accepts both the "HH:MM" form used in settings and the backend policy's
/// "HH:MM:SS".
fn parse_working_hour(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .ok()
        .or_else(|| NaiveTime::parse_from_str(text, "%H:%M:%S").ok())
}
