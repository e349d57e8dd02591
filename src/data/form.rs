//! State machine behind the booking and modification modals.
//!
//! One `BookingForm` lives for the duration of one modal interaction. The
//! async parts (fetching the day's bookings, submitting) happen outside; the
//! form hands out a generation token per fetch and discards resolutions that
//! carry a superseded token, so a slow response for an old date can never
//! overwrite a newer date's grid.

use chrono::{FixedOffset, NaiveDate};

use crate::data::booking::ExistingBooking;
use crate::slots::{
    BookedInterval, Selection, SelectionError, SlotCalendar, SlotStatus,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    FetchingSlots,
    SlotsReady,
    Submitting,
    Success,
    SubmitError(String),
}

#[derive(Debug, Clone)]
pub struct BookingForm {
    calendar: SlotCalendar,
    zone: FixedOffset,
    date: NaiveDate,
    phase: FormPhase,
    generation: u64,
    statuses: Vec<SlotStatus>,
    selection: Selection,
    fetch_failed: bool,
    /// Set on the modify flow: this booking is excluded from the conflict
    /// set, since a booking does not conflict with itself.
    exclude: Option<i64>,
}

impl BookingForm {
    pub fn new(calendar: SlotCalendar, zone: FixedOffset, date: NaiveDate) -> Self {
        Self {
            calendar,
            zone,
            date,
            phase: FormPhase::Idle,
            generation: 0,
            statuses: Vec::new(),
            selection: Selection::default(),
            fetch_failed: false,
            exclude: None,
        }
    }

    pub fn for_modification(
        calendar: SlotCalendar,
        zone: FixedOffset,
        date: NaiveDate,
        booking_id: i64,
    ) -> Self {
        let mut form = Self::new(calendar, zone, date);
        form.exclude = Some(booking_id);
        form
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn statuses(&self) -> &[SlotStatus] {
        &self.statuses
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn fetch_failed(&self) -> bool {
        self.fetch_failed
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FormPhase::FetchingSlots
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    /// Replaces the injected calendar and timezone, e.g. once the policy
    /// configuration arrives. Clears the grid; the caller starts a new fetch.
    pub fn reconfigure(&mut self, calendar: SlotCalendar, zone: FixedOffset) {
        self.calendar = calendar;
        self.zone = zone;
        self.statuses.clear();
        self.selection.clear();
    }

    /// Enters `FetchingSlots` for the given date, superseding any fetch in
    /// flight and discarding the current selection. Returns the token the
    /// eventual resolution must present.
    pub fn begin_fetch(&mut self, date: NaiveDate) -> u64 {
        self.date = date;
        self.generation += 1;
        self.selection.clear();
        self.statuses.clear();
        self.fetch_failed = false;
        self.phase = FormPhase::FetchingSlots;
        self.generation
    }

    /// Applies a fetched booking list. Returns false (and changes nothing)
    /// when the token belongs to a superseded fetch.
    pub fn resolve_fetch(&mut self, token: u64, mut bookings: Vec<ExistingBooking>) -> bool {
        if token != self.generation {
            return false;
        }
        if let Some(own) = self.exclude {
            bookings.retain(|booking| booking.id != own);
        }
        self.statuses = self.calendar.statuses(&bookings, self.date, self.zone);
        self.fetch_failed = false;
        self.phase = FormPhase::SlotsReady;
        true
    }

    /// Fail-open fallback: the grid becomes all-free and `fetch_failed` is
    /// raised for the error banner. Stale tokens are discarded here too.
    pub fn resolve_fetch_error(&mut self, token: u64) -> bool {
        if token != self.generation {
            return false;
        }
        self.statuses = self.calendar.statuses(&[], self.date, self.zone);
        self.fetch_failed = true;
        self.phase = FormPhase::SlotsReady;
        true
    }

    /// Toggles the slot at `index` in the grid. Ignored while a fetch or a
    /// submit is in flight; adjusting the selection after a rejected submit
    /// returns the form to the selecting state.
    pub fn toggle_slot(&mut self, index: usize) {
        if !matches!(
            self.phase,
            FormPhase::SlotsReady | FormPhase::SubmitError(_)
        ) {
            return;
        }
        if let Some(status) = self.statuses.get(index).copied() {
            self.selection.toggle(&status);
            if matches!(self.phase, FormPhase::SubmitError(_)) {
                self.phase = FormPhase::SlotsReady;
            }
        }
    }

    /// Validates the selection and, on success, enters `Submitting` and
    /// returns the absolute interval for the payload. Contiguity and
    /// empty-selection errors stay client-side and leave the phase alone.
    pub fn begin_submit(&mut self) -> Result<BookedInterval, SelectionError> {
        let interval = self.selection.reduce()?;
        self.phase = FormPhase::Submitting;
        Ok(interval.to_absolute(self.date, self.zone))
    }

    pub fn resolve_submit(&mut self) {
        self.phase = FormPhase::Success;
    }

    /// Backend rejection: surface the message and keep the selection intact
    /// so the user can adjust and retry.
    pub fn resolve_submit_error(&mut self, message: String) {
        self.phase = FormPhase::SubmitError(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
    }

    fn form() -> BookingForm {
        BookingForm::new(SlotCalendar::institute_default(), ist(), day(6))
    }

    fn approved(id: i64, start: &str, end: &str) -> ExistingBooking {
        ExistingBooking {
            id,
            start_time: start.to_string(),
            end_time: end.to_string(),
            status: "approved".to_string(),
        }
    }

    #[test]
    fn stale_fetch_responses_are_discarded() {
        let mut form = form();
        let first = form.begin_fetch(day(6));
        let second = form.begin_fetch(day(7));

        let stale = vec![approved(
            1,
            "2025-02-06T09:00:00+05:30",
            "2025-02-06T17:00:00+05:30",
        )];
        assert!(!form.resolve_fetch(first, stale));
        assert!(form.is_loading(), "stale response must not end the fetch");

        assert!(form.resolve_fetch(second, Vec::new()));
        assert_eq!(form.date(), day(7));
        assert!(form.statuses().iter().all(|status| !status.is_booked));
    }

    #[test]
    fn failed_fetch_falls_back_to_all_free_with_a_flag() {
        let mut form = form();
        let token = form.begin_fetch(day(6));
        assert!(form.resolve_fetch_error(token));
        assert_eq!(form.statuses().len(), 8);
        assert!(form.statuses().iter().all(|status| !status.is_booked));
        assert!(form.fetch_failed());
        assert!(!form.is_loading());
    }

    #[test]
    fn stale_fetch_error_does_not_clobber_a_fresh_grid() {
        let mut form = form();
        let first = form.begin_fetch(day(6));
        let second = form.begin_fetch(day(7));
        assert!(form.resolve_fetch(
            second,
            vec![approved(
                1,
                "2025-02-07T09:00:00+05:30",
                "2025-02-07T10:00:00+05:30",
            )],
        ));
        assert!(!form.resolve_fetch_error(first));
        assert!(!form.fetch_failed());
        assert!(form.statuses()[0].is_booked);
    }

    #[test]
    fn date_change_discards_the_selection() {
        let mut form = form();
        let token = form.begin_fetch(day(6));
        form.resolve_fetch(token, Vec::new());
        form.toggle_slot(0);
        assert_eq!(form.selection().len(), 1);

        form.begin_fetch(day(7));
        assert!(form.selection().is_empty());
    }

    #[test]
    fn modify_flow_excludes_its_own_booking_from_conflicts() {
        let mut form =
            BookingForm::for_modification(SlotCalendar::institute_default(), ist(), day(6), 42);
        let token = form.begin_fetch(day(6));
        form.resolve_fetch(
            token,
            vec![
                approved(42, "2025-02-06T09:00:00+05:30", "2025-02-06T10:00:00+05:30"),
                approved(7, "2025-02-06T11:00:00+05:30", "2025-02-06T12:00:00+05:30"),
            ],
        );
        assert!(!form.statuses()[0].is_booked, "own booking must not block");
        assert!(form.statuses()[2].is_booked);
    }

    #[test]
    fn reconfigure_swaps_calendar_and_zone_and_clears_the_grid() {
        use chrono::NaiveTime;

        let mut form = form();
        let token = form.begin_fetch(day(6));
        form.resolve_fetch(token, Vec::new());
        form.toggle_slot(0);

        let wide = SlotCalendar::from_working_hours(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            60,
        );
        let utc = FixedOffset::east_opt(0).unwrap();
        form.reconfigure(wide, utc);
        assert!(form.statuses().is_empty());
        assert!(form.selection().is_empty());

        let token = form.begin_fetch(day(6));
        form.resolve_fetch(
            token,
            vec![approved(1, "2025-02-06T08:00:00Z", "2025-02-06T09:00:00Z")],
        );
        assert_eq!(form.statuses().len(), 11);
        assert!(form.statuses()[0].is_booked, "conflicts use the new zone");
        assert!(!form.statuses()[1].is_booked);
    }

    #[test]
    fn config_arrival_refetches_the_current_date_not_the_initial_one() {
        let mut form = form();
        // the user moves to the 7th while the configuration round trip is
        // still in flight
        form.begin_fetch(day(7));

        form.reconfigure(SlotCalendar::institute_default(), ist());
        let token = form.begin_fetch(form.date());
        assert_eq!(form.date(), day(7));

        form.resolve_fetch(token, Vec::new());
        form.toggle_slot(0);
        let interval = form.begin_submit().unwrap();
        assert_eq!(interval.start_time, "2025-02-07T09:00:00+05:30");
        assert_eq!(interval.end_time, "2025-02-07T10:00:00+05:30");
    }

    #[test]
    fn toggling_is_ignored_while_fetching() {
        let mut form = form();
        form.begin_fetch(day(6));
        form.toggle_slot(0);
        assert!(form.selection().is_empty());
    }

    #[test]
    fn submit_of_contiguous_selection_yields_the_wire_interval() {
        let mut form = form();
        let token = form.begin_fetch(day(6));
        form.resolve_fetch(token, Vec::new());
        form.toggle_slot(0);
        form.toggle_slot(1);
        form.toggle_slot(2);
        let interval = form.begin_submit().unwrap();
        assert_eq!(interval.start_time, "2025-02-06T09:00:00+05:30");
        assert_eq!(interval.end_time, "2025-02-06T12:00:00+05:30");
        assert!(form.is_submitting());
    }

    #[test]
    fn submit_with_gap_fails_without_leaving_the_selecting_state() {
        let mut form = form();
        let token = form.begin_fetch(day(6));
        form.resolve_fetch(token, Vec::new());
        form.toggle_slot(0);
        form.toggle_slot(2);
        assert_eq!(form.begin_submit(), Err(SelectionError::NotContiguous));
        assert_eq!(*form.phase(), FormPhase::SlotsReady);
        assert_eq!(form.selection().len(), 2);
    }

    #[test]
    fn empty_submit_is_rejected_client_side() {
        let mut form = form();
        let token = form.begin_fetch(day(6));
        form.resolve_fetch(token, Vec::new());
        assert_eq!(form.begin_submit(), Err(SelectionError::Empty));
    }

    #[test]
    fn rejected_submit_keeps_the_selection_for_retry() {
        let mut form = form();
        let token = form.begin_fetch(day(6));
        form.resolve_fetch(token, Vec::new());
        form.toggle_slot(3);
        form.begin_submit().unwrap();
        form.resolve_submit_error("Room capacity exceeded".to_string());
        assert_eq!(
            *form.phase(),
            FormPhase::SubmitError("Room capacity exceeded".to_string())
        );
        assert_eq!(form.selection().len(), 1);

        // adjusting clears the error and allows another attempt
        form.toggle_slot(4);
        assert_eq!(*form.phase(), FormPhase::SlotsReady);
        assert!(form.begin_submit().is_ok());
    }
}
