use crate::db::Store;
use crate::error::BookingResult;
use crate::models::{Appointment, BookingDetail};

/// Which slice of the appointment book the table is showing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum AppointmentFilter {
    #[default]
    All,
    OnDate(String),
    Matching(String),
}

impl AppointmentFilter {
    pub(crate) fn title(&self) -> String {
        match self {
            AppointmentFilter::All => "All Appointments".to_string(),
            AppointmentFilter::OnDate(date) => format!("Appointments on {date}"),
            AppointmentFilter::Matching(query) => format!("Appointments matching '{query}'"),
        }
    }

    pub(crate) fn empty_message(&self) -> &'static str {
        match self {
            AppointmentFilter::All => "No appointments yet. Press '+' to add one.",
            AppointmentFilter::OnDate(_) => "No appointments on this day.",
            AppointmentFilter::Matching(_) => "No appointments match the search.",
        }
    }

    fn load(&self, store: &Store) -> BookingResult<Vec<Appointment>> {
        match self {
            AppointmentFilter::All => store.list_appointments(),
            AppointmentFilter::OnDate(date) => store.list_appointments_on(date),
            AppointmentFilter::Matching(query) => store.lookup_appointments(query),
        }
    }
}

/// Rows behind the appointment table plus the highlighted row.
#[derive(Default)]
pub(crate) struct AppointmentScreen {
    pub(crate) appointments: Vec<Appointment>,
    pub(crate) filter: AppointmentFilter,
    pub(crate) selected: usize,
}

impl AppointmentScreen {
    /// Re-query the store for the current filter, keeping `focus_id`
    /// highlighted when it is still present.
    pub(crate) fn reload(&mut self, store: &Store, focus_id: Option<i64>) -> BookingResult<()> {
        let rows = self.filter.load(store)?;
        self.set_rows(rows, focus_id);
        Ok(())
    }

    /// Switch to `filter` only if its rows load; a failing filter (a bad date)
    /// leaves the screen as it was.
    pub(crate) fn apply_filter(
        &mut self,
        store: &Store,
        filter: AppointmentFilter,
    ) -> BookingResult<usize> {
        let rows = filter.load(store)?;
        let count = rows.len();
        self.filter = filter;
        self.selected = 0;
        self.set_rows(rows, None);
        Ok(count)
    }

    pub(crate) fn set_rows(&mut self, rows: Vec<Appointment>, focus_id: Option<i64>) {
        self.appointments = rows;
        if let Some(id) = focus_id {
            if let Some(idx) = self.appointments.iter().position(|a| a.id == id) {
                self.selected = idx;
                return;
            }
        }
        self.ensure_in_bounds();
    }

    pub(crate) fn current(&self) -> Option<&Appointment> {
        self.appointments.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = shift(self.selected, offset, self.appointments.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.appointments.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.appointments.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.appointments.len() {
            self.selected = self.appointments.len() - 1;
        }
    }
}

/// Read-only list of shop bookings.
pub(crate) struct BookingScreen {
    pub(crate) bookings: Vec<BookingDetail>,
    pub(crate) selected: usize,
}

impl BookingScreen {
    pub(crate) fn load(store: &Store) -> BookingResult<Self> {
        Ok(Self {
            bookings: store.list_bookings()?,
            selected: 0,
        })
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = shift(self.selected, offset, self.bookings.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.bookings.len().saturating_sub(1);
    }
}

/// Move `current` by `offset`, clamped to `0..len`.
fn shift(current: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let target = current as isize + offset;
    target.clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(id: i64) -> Appointment {
        Appointment {
            id,
            customer_name: format!("Customer {id}"),
            date: "15-06-2024".into(),
            time: "10:00".into(),
            barber_name: None,
        }
    }

    #[test]
    fn selection_is_clamped() {
        assert_eq!(shift(0, -1, 3), 0);
        assert_eq!(shift(1, 5, 3), 2);
        assert_eq!(shift(2, -1, 3), 1);
        assert_eq!(shift(4, 1, 0), 0);
    }

    #[test]
    fn focus_follows_the_requested_row() {
        let mut screen = AppointmentScreen::default();
        screen.set_rows(vec![appointment(1), appointment(2), appointment(3)], Some(3));
        assert_eq!(screen.current().map(|a| a.id), Some(3));
    }

    #[test]
    fn shrinking_rows_pulls_selection_back() {
        let mut screen = AppointmentScreen::default();
        screen.set_rows(vec![appointment(1), appointment(2), appointment(3)], None);
        screen.select_last();
        screen.set_rows(vec![appointment(1)], Some(99));
        assert_eq!(screen.selected, 0);
    }
}
