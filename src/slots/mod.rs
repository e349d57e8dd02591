//! Slot availability and conflict detection for room bookings.
//!
//! The institute books rooms in fixed, contiguous slots derived from the
//! configured working hours. Everything in this module is pure: callers pass
//! the existing bookings, the target date and the institute's fixed UTC
//! offset, and get back slot statuses, contiguity-checked selections and
//! RFC 3339 intervals ready for the backend.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::booking::ExistingBooking;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Only approved bookings occupy a slot; pending, rejected and cancelled
/// bookings never block availability. The backend stores the status in
/// lowercase while clients submit it uppercased, so matching is
/// case-insensitive.
pub const APPROVED_STATUS: &str = "approved";

/// A fixed interval within a single day, in minutes since midnight of the
/// institute's civil time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeSlot {
    pub start_minute: u16,
    pub end_minute: u16,
}

impl TimeSlot {
    /// Canonical display form, e.g. `"9:00 AM - 10:00 AM"`.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            format_minute(self.start_minute),
            format_minute(self.end_minute)
        )
    }

    /// Inverse of [`TimeSlot::label`].
    pub fn parse_label(label: &str) -> Option<TimeSlot> {
        let (start, end) = label.split_once(" - ")?;
        let slot = TimeSlot {
            start_minute: parse_minute(start.trim())?,
            end_minute: parse_minute(end.trim())?,
        };
        (slot.start_minute < slot.end_minute).then_some(slot)
    }
}

fn format_minute(minute: u16) -> String {
    let hours = minute / 60;
    let minutes = minute % 60;
    let period = if hours >= 12 { "PM" } else { "AM" };
    let display_hours = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hours, minutes, period)
}

fn parse_minute(text: &str) -> Option<u16> {
    let (clock, period) = text.rsplit_once(' ')?;
    let (hour, minute) = clock.split_once(':')?;
    let hour: u16 = hour.parse().ok()?;
    let minute: u16 = minute.parse().ok()?;
    if !(1..=12).contains(&hour) || minute >= 60 {
        return None;
    }
    let hour24 = match (period, hour) {
        ("AM", 12) => 0,
        ("AM", h) => h,
        ("PM", 12) => 12,
        ("PM", h) => h + 12,
        _ => return None,
    };
    Some(hour24 * 60 + minute)
}

/// One slot of the day grid, tagged booked or free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotStatus {
    pub slot: TimeSlot,
    pub is_booked: bool,
}

/// The day's bookable slots, derived from the institute working-hours policy
/// rather than hardcoded. Slots are disjoint, contiguous and in calendar
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCalendar {
    slots: Vec<TimeSlot>,
}

impl SlotCalendar {
    /// Derives contiguous slots of `slot_minutes` between the working hours.
    /// A trailing fragment shorter than half a slot is not bookable; a longer
    /// one is kept, clamped to the working-hours end.
    pub fn from_working_hours(start: NaiveTime, end: NaiveTime, slot_minutes: u16) -> Self {
        let start_minutes = (start.hour() * 60 + start.minute()) as u16;
        let end_minutes = (end.hour() * 60 + end.minute()) as u16;
        let mut slots = Vec::new();
        if slot_minutes > 0 {
            let mut cursor = start_minutes;
            while cursor < end_minutes {
                let slot_end = (cursor + slot_minutes).min(end_minutes);
                if slot_end - cursor >= slot_minutes / 2 {
                    slots.push(TimeSlot {
                        start_minute: cursor,
                        end_minute: slot_end,
                    });
                }
                cursor += slot_minutes;
            }
        }
        Self { slots }
    }

    /// The institute's shipped calendar: hourly slots from 9:00 to 17:00.
    pub fn institute_default() -> Self {
        Self::from_working_hours(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            60,
        )
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Marks each slot booked or free against the room's existing bookings on
    /// `date`. A slot conflicts when the open intervals strictly overlap, so
    /// back-to-back bookings are allowed. Bookings with unparseable
    /// timestamps are logged and treated as no conflict: one bad record must
    /// not make the whole room unbookable.
    pub fn statuses(
        &self,
        bookings: &[ExistingBooking],
        date: NaiveDate,
        zone: FixedOffset,
    ) -> Vec<SlotStatus> {
        let occupied: Vec<(u16, u16)> = bookings
            .iter()
            .filter(|booking| booking.status.eq_ignore_ascii_case(APPROVED_STATUS))
            .filter_map(|booking| occupied_minutes(booking, date, zone))
            .collect();

        self.slots
            .iter()
            .map(|&slot| SlotStatus {
                slot,
                is_booked: occupied
                    .iter()
                    .any(|&(start, end)| slot.start_minute < end && start < slot.end_minute),
            })
            .collect()
    }
}

/// Projects a booking into minute-of-day bounds on the target civil date, or
/// `None` when it does not touch that date or cannot be parsed.
fn occupied_minutes(
    booking: &ExistingBooking,
    date: NaiveDate,
    zone: FixedOffset,
) -> Option<(u16, u16)> {
    let start = parse_instant(&booking.start_time, zone)?;
    let end = parse_instant(&booking.end_time, zone)?;

    let day_start = date.and_time(NaiveTime::MIN);
    let day_end = day_start + Duration::days(1);
    let start = start.naive_local().max(day_start);
    let end = end.naive_local().min(day_end);
    if start >= end {
        return None;
    }

    Some((minute_of(start, date), minute_of(end, date)))
}

fn minute_of(moment: NaiveDateTime, date: NaiveDate) -> u16 {
    if moment.date() == date {
        (moment.time().hour() * 60 + moment.time().minute()) as u16
    } else {
        MINUTES_PER_DAY
    }
}

fn parse_instant(text: &str, zone: FixedOffset) -> Option<DateTime<FixedOffset>> {
    match DateTime::parse_from_rfc3339(text) {
        Ok(instant) => Some(instant.with_timezone(&zone)),
        Err(err) => {
            log::warn!("ignoring booking with unparseable timestamp '{}': {}", text, err);
            None
        }
    }
}

/// The user's chosen slots for the current date. Set semantics: no
/// duplicates, ordered by slot start. Contiguity is only enforced at
/// reduction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    chosen: BTreeSet<TimeSlot>,
}

impl Selection {
    /// Flips membership of the slot. Booked slots are not selectable, so the
    /// call is a no-op for them.
    pub fn toggle(&mut self, status: &SlotStatus) {
        if status.is_booked {
            return;
        }
        if !self.chosen.remove(&status.slot) {
            self.chosen.insert(status.slot);
        }
    }

    pub fn contains(&self, slot: &TimeSlot) -> bool {
        self.chosen.contains(slot)
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    /// Validates that the chosen slots form one continuous block and reduces
    /// them to a single civil-time interval.
    pub fn reduce(&self) -> Result<CivilInterval, SelectionError> {
        let mut slots = self.chosen.iter();
        let first = slots.next().ok_or(SelectionError::Empty)?;
        let mut end = first.end_minute;
        for slot in slots {
            if slot.start_minute != end {
                return Err(SelectionError::NotContiguous);
            }
            end = slot.end_minute;
        }
        Ok(CivilInterval {
            start_minute: first.start_minute,
            end_minute: end,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Select at least one time slot")]
    Empty,
    #[error("Selected time slots must form one continuous block")]
    NotContiguous,
}

/// A reduced selection in the institute's civil time, not yet anchored to a
/// date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilInterval {
    pub start_minute: u16,
    pub end_minute: u16,
}

impl CivilInterval {
    /// Anchors the civil interval to a date in the given fixed offset,
    /// producing RFC 3339 instants for the wire.
    pub fn to_absolute(self, date: NaiveDate, zone: FixedOffset) -> BookedInterval {
        BookedInterval {
            start_time: to_instant(date, self.start_minute, zone).to_rfc3339(),
            end_time: to_instant(date, self.end_minute, zone).to_rfc3339(),
        }
    }
}

fn to_instant(date: NaiveDate, minute: u16, zone: FixedOffset) -> DateTime<FixedOffset> {
    let local = date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute));
    let utc = local - Duration::seconds(i64::from(zone.local_minus_utc()));
    DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc).with_timezone(&zone)
}

/// Start/end instants as sent to and read from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start_time: String,
    pub end_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 6).unwrap()
    }

    fn approved(start: &str, end: &str) -> ExistingBooking {
        ExistingBooking {
            id: 1,
            start_time: start.to_string(),
            end_time: end.to_string(),
            status: "approved".to_string(),
        }
    }

    fn slot(start_minute: u16, end_minute: u16) -> TimeSlot {
        TimeSlot {
            start_minute,
            end_minute,
        }
    }

    fn free(start_minute: u16, end_minute: u16) -> SlotStatus {
        SlotStatus {
            slot: slot(start_minute, end_minute),
            is_booked: false,
        }
    }

    #[test]
    fn default_calendar_is_disjoint_and_contiguous_nine_to_five() {
        let calendar = SlotCalendar::institute_default();
        let slots = calendar.slots();
        assert_eq!(slots.len(), 8);
        assert_eq!(slots[0].start_minute, 9 * 60);
        assert_eq!(slots[7].end_minute, 17 * 60);
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end_minute, pair[1].start_minute);
        }
    }

    #[test]
    fn default_calendar_labels_match_the_institute_grid() {
        let labels: Vec<String> = SlotCalendar::institute_default()
            .slots()
            .iter()
            .map(TimeSlot::label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "9:00 AM - 10:00 AM",
                "10:00 AM - 11:00 AM",
                "11:00 AM - 12:00 PM",
                "12:00 PM - 1:00 PM",
                "1:00 PM - 2:00 PM",
                "2:00 PM - 3:00 PM",
                "3:00 PM - 4:00 PM",
                "4:00 PM - 5:00 PM",
            ]
        );
    }

    #[test]
    fn labels_parse_back_to_the_same_slot() {
        for slot in SlotCalendar::institute_default().slots() {
            assert_eq!(TimeSlot::parse_label(&slot.label()), Some(*slot));
        }
        assert_eq!(TimeSlot::parse_label("noon-ish"), None);
        assert_eq!(TimeSlot::parse_label("13:00 AM - 2:00 PM"), None);
        assert_eq!(TimeSlot::parse_label("2:00 PM - 1:00 PM"), None);
    }

    #[test]
    fn working_hours_drive_the_grid() {
        let calendar = SlotCalendar::from_working_hours(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            60,
        );
        assert_eq!(calendar.len(), 11);
        assert_eq!(calendar.slots()[0].label(), "8:00 AM - 9:00 AM");
        assert_eq!(calendar.slots()[10].label(), "6:00 PM - 7:00 PM");
    }

    #[test]
    fn short_trailing_fragment_is_dropped_long_one_is_clamped() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        let clamped = SlotCalendar::from_working_hours(
            start,
            NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
            60,
        );
        assert_eq!(clamped.len(), 9);
        assert_eq!(clamped.slots()[8].label(), "5:00 PM - 5:30 PM");

        let dropped = SlotCalendar::from_working_hours(
            start,
            NaiveTime::from_hms_opt(17, 20, 0).unwrap(),
            60,
        );
        assert_eq!(dropped.len(), 8);
        assert_eq!(dropped.slots()[7].end_minute, 17 * 60);
    }

    #[test]
    fn overlapping_booking_marks_both_touched_slots() {
        let calendar = SlotCalendar::institute_default();
        let bookings = [approved(
            "2025-02-06T10:30:00+05:30",
            "2025-02-06T11:30:00+05:30",
        )];
        let statuses = calendar.statuses(&bookings, date(), ist());
        let booked: Vec<String> = statuses
            .iter()
            .filter(|status| status.is_booked)
            .map(|status| status.slot.label())
            .collect();
        assert_eq!(booked, vec!["10:00 AM - 11:00 AM", "11:00 AM - 12:00 PM"]);
    }

    #[test]
    fn utc_expressed_bookings_are_projected_into_institute_time() {
        // 05:00Z is 10:30 IST
        let calendar = SlotCalendar::institute_default();
        let bookings = [approved("2025-02-06T05:00:00Z", "2025-02-06T06:00:00Z")];
        let statuses = calendar.statuses(&bookings, date(), ist());
        let booked: Vec<String> = statuses
            .iter()
            .filter(|status| status.is_booked)
            .map(|status| status.slot.label())
            .collect();
        assert_eq!(booked, vec!["10:00 AM - 11:00 AM", "11:00 AM - 12:00 PM"]);
    }

    #[test]
    fn back_to_back_bookings_do_not_conflict() {
        let calendar = SlotCalendar::institute_default();
        let ends_at_eleven = [approved(
            "2025-02-06T10:00:00+05:30",
            "2025-02-06T11:00:00+05:30",
        )];
        let statuses = calendar.statuses(&ends_at_eleven, date(), ist());
        assert!(statuses[1].is_booked);
        assert!(!statuses[2].is_booked, "11-12 must stay free");

        let starts_at_eleven = [approved(
            "2025-02-06T11:00:00+05:30",
            "2025-02-06T12:00:00+05:30",
        )];
        let statuses = calendar.statuses(&starts_at_eleven, date(), ist());
        assert!(!statuses[1].is_booked, "10-11 must stay free");
        assert!(statuses[2].is_booked);
    }

    #[test]
    fn only_approved_bookings_occupy_slots() {
        let calendar = SlotCalendar::institute_default();
        for status in ["pending", "REJECTED", "Cancelled"] {
            let mut booking = approved(
                "2025-02-06T09:00:00+05:30",
                "2025-02-06T17:00:00+05:30",
            );
            booking.status = status.to_string();
            let statuses = calendar.statuses(&[booking], date(), ist());
            assert!(
                statuses.iter().all(|s| !s.is_booked),
                "{} bookings must not block",
                status
            );
        }

        let mut booking = approved("2025-02-06T09:00:00+05:30", "2025-02-06T10:00:00+05:30");
        booking.status = "APPROVED".to_string();
        let statuses = calendar.statuses(&[booking], date(), ist());
        assert!(statuses[0].is_booked, "status match is case-insensitive");
    }

    #[test]
    fn unparseable_timestamps_fail_open() {
        let calendar = SlotCalendar::institute_default();
        let bookings = [approved("not a timestamp", "2025-02-06T11:00:00+05:30")];
        let statuses = calendar.statuses(&bookings, date(), ist());
        assert!(statuses.iter().all(|status| !status.is_booked));
    }

    #[test]
    fn bookings_on_other_dates_do_not_occupy() {
        let calendar = SlotCalendar::institute_default();
        let bookings = [approved(
            "2025-02-07T10:00:00+05:30",
            "2025-02-07T11:00:00+05:30",
        )];
        let statuses = calendar.statuses(&bookings, date(), ist());
        assert!(statuses.iter().all(|status| !status.is_booked));
    }

    #[test]
    fn multi_day_booking_is_clamped_to_the_target_date() {
        let calendar = SlotCalendar::institute_default();
        let bookings = [approved(
            "2025-02-05T16:00:00+05:30",
            "2025-02-06T10:30:00+05:30",
        )];
        let statuses = calendar.statuses(&bookings, date(), ist());
        assert!(statuses[0].is_booked, "9-10 overlaps the tail");
        assert!(statuses[1].is_booked, "10-11 overlaps the tail");
        assert!(!statuses[2].is_booked);
    }

    #[test]
    fn contiguous_selection_reduces_to_one_interval() {
        let mut selection = Selection::default();
        selection.toggle(&free(9 * 60, 10 * 60));
        selection.toggle(&free(11 * 60, 12 * 60));
        selection.toggle(&free(10 * 60, 11 * 60));
        let interval = selection.reduce().unwrap();
        assert_eq!(interval.start_minute, 9 * 60);
        assert_eq!(interval.end_minute, 12 * 60);
    }

    #[test]
    fn gapped_selection_is_rejected() {
        let mut selection = Selection::default();
        selection.toggle(&free(9 * 60, 10 * 60));
        selection.toggle(&free(11 * 60, 12 * 60));
        assert_eq!(selection.reduce(), Err(SelectionError::NotContiguous));
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert_eq!(Selection::default().reduce(), Err(SelectionError::Empty));
    }

    #[test]
    fn single_slot_always_reduces() {
        let mut selection = Selection::default();
        let nine = free(9 * 60, 10 * 60);
        let ten = free(10 * 60, 11 * 60);
        // churn before settling on one slot
        selection.toggle(&nine);
        selection.toggle(&ten);
        selection.toggle(&nine);
        selection.toggle(&ten);
        selection.toggle(&nine);
        let interval = selection.reduce().unwrap();
        assert_eq!((interval.start_minute, interval.end_minute), (9 * 60, 10 * 60));
    }

    #[test]
    fn toggle_is_an_involution_on_free_slots() {
        let mut selection = Selection::default();
        let status = free(13 * 60, 14 * 60);
        let before = selection.clone();
        selection.toggle(&status);
        selection.toggle(&status);
        assert_eq!(selection, before);
    }

    #[test]
    fn booked_slots_are_not_selectable() {
        let mut selection = Selection::default();
        let status = SlotStatus {
            slot: slot(9 * 60, 10 * 60),
            is_booked: true,
        };
        selection.toggle(&status);
        assert!(selection.is_empty());
    }

    #[test]
    fn absolute_interval_carries_the_institute_offset() {
        let interval = CivilInterval {
            start_minute: 9 * 60,
            end_minute: 12 * 60,
        };
        let wire = interval.to_absolute(date(), ist());
        assert_eq!(wire.start_time, "2025-02-06T09:00:00+05:30");
        assert_eq!(wire.end_time, "2025-02-06T12:00:00+05:30");
    }

    #[test]
    fn absolute_interval_round_trips_to_slot_boundaries() {
        let mut selection = Selection::default();
        selection.toggle(&free(10 * 60, 11 * 60));
        selection.toggle(&free(11 * 60, 12 * 60));
        let wire = selection.reduce().unwrap().to_absolute(date(), ist());

        let zone = ist();
        let recover = |text: &str| {
            let local = DateTime::parse_from_rfc3339(text)
                .unwrap()
                .with_timezone(&zone);
            (
                local.date_naive(),
                (local.time().hour() * 60 + local.time().minute()) as u16,
            )
        };
        assert_eq!(recover(&wire.start_time), (date(), 10 * 60));
        assert_eq!(recover(&wire.end_time), (date(), 12 * 60));
    }
}
