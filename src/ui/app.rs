use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap};
use ratatui::Frame;

use crate::db::Store;
use crate::error::BookingResult;
use crate::models::{Appointment, DeleteOutcome, UpdateOutcome};

use super::forms::{
    AppointmentField, AppointmentForm, ConfirmAppointmentDelete, PromptKind, TextPrompt,
};
use super::helpers::{centered_rect, key_hints, surface_error};
use super::screens::{AppointmentFilter, AppointmentScreen, BookingScreen};

/// Rows reserved for the tab bar at the top.
const TAB_BAR_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;
const TAB_TITLES: [&str; 2] = ["Appointments", "Bookings"];

/// Top-level tabs.
enum Screen {
    Appointments,
    Bookings(BookingScreen),
}

/// Popups and inputs layered over the current screen.
enum Mode {
    Normal,
    Adding(AppointmentForm),
    Editing {
        original: Appointment,
        form: AppointmentForm,
    },
    ConfirmDelete(ConfirmAppointmentDelete),
    Prompting(TextPrompt),
}

struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central state of the terminal front-end. It owns the store handle and
/// nothing else durable: every list is re-read from the database after a
/// change.
pub struct App {
    store: Store,
    appointments: AppointmentScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: Store) -> Result<Self> {
        let mut appointments = AppointmentScreen::default();
        appointments
            .reload(&store, None)
            .context("failed to load appointments")?;

        Ok(Self {
            store,
            appointments,
            screen: Screen::Appointments,
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Feed one key press through the current mode. Returns `true` when the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Adding(form) => self.handle_add(code, form)?,
            Mode::Editing { original, form } => self.handle_edit(code, original, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Prompting(prompt) => self.handle_prompt(code, prompt)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if let Screen::Bookings(bookings) = &mut self.screen {
            let mut leave = false;
            let mut refresh = false;
            match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('b') => {
                    leave = true
                }
                KeyCode::Up => bookings.move_selection(-1),
                KeyCode::Down => bookings.move_selection(1),
                KeyCode::PageUp => bookings.move_selection(-PAGE_STEP),
                KeyCode::PageDown => bookings.move_selection(PAGE_STEP),
                KeyCode::Home => bookings.select_first(),
                KeyCode::End => bookings.select_last(),
                KeyCode::Char('r') => refresh = true,
                _ => {}
            }

            if leave {
                self.clear_status();
                self.screen = Screen::Appointments;
                self.reload_appointments(None);
            } else if refresh {
                self.open_bookings();
            }
            return Ok(Mode::Normal);
        }

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.appointments.filter == AppointmentFilter::All {
                    *exit = true;
                } else {
                    self.apply_filter(AppointmentFilter::All);
                }
            }
            KeyCode::Up => self.appointments.move_selection(-1),
            KeyCode::Down => self.appointments.move_selection(1),
            KeyCode::PageUp => self.appointments.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.appointments.move_selection(PAGE_STEP),
            KeyCode::Home => self.appointments.select_first(),
            KeyCode::End => self.appointments.select_last(),
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::Adding(AppointmentForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
                if let Some(appointment) = self.appointments.current().cloned() {
                    self.clear_status();
                    return Ok(Mode::Editing {
                        form: AppointmentForm::from_appointment(&appointment),
                        original: appointment,
                    });
                }
                self.set_status("No appointment selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(appointment) = self.appointments.current() {
                    let confirm = ConfirmAppointmentDelete::from(appointment);
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(confirm));
                }
                self.set_status("No appointment selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                return Ok(Mode::Prompting(TextPrompt::new(PromptKind::Search)));
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                return Ok(Mode::Prompting(TextPrompt::new(PromptKind::Date)));
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.apply_filter(AppointmentFilter::All);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let focus = self.appointments.current().map(|a| a.id);
                self.reload_appointments(focus);
            }
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Tab | KeyCode::BackTab => {
                self.clear_status();
                self.open_bookings();
            }
            _ => {}
        }

        Ok(Mode::Normal)
    }

    fn handle_add(&mut self, code: KeyCode, mut form: AppointmentForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_appointment(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Adding(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit(
        &mut self,
        code: KeyCode,
        original: Appointment,
        mut form: AppointmentForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_appointment(&original, &form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Editing { original, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmAppointmentDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.perform_delete(&confirm);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_prompt(&mut self, code: KeyCode, mut prompt: TextPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => {
                prompt.query.pop();
            }
            KeyCode::Enter => {
                let query = prompt.query.trim().to_string();
                if query.is_empty() {
                    let message = match prompt.kind {
                        PromptKind::Search => "Enter a name or an id to search for.",
                        PromptKind::Date => "Enter a date as DD-MM-YYYY.",
                    };
                    self.set_status(message, StatusKind::Error);
                    return Ok(Mode::Prompting(prompt));
                }

                let filter = match prompt.kind {
                    PromptKind::Search => AppointmentFilter::Matching(query),
                    PromptKind::Date => AppointmentFilter::OnDate(query),
                };
                if self.apply_filter(filter) {
                    return Ok(Mode::Normal);
                }
            }
            KeyCode::Char(ch) if !ch.is_control() => prompt.query.push(ch),
            _ => {}
        }

        Ok(Mode::Prompting(prompt))
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        if area.height <= TAB_BAR_HEIGHT + FOOTER_HEIGHT {
            self.draw_content(frame, area);
        } else {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(TAB_BAR_HEIGHT),
                    Constraint::Min(0),
                    Constraint::Length(FOOTER_HEIGHT),
                ])
                .split(area);
            self.draw_tabs(frame, chunks[0]);
            self.draw_content(frame, chunks[1]);
            self.draw_footer(frame, chunks[2]);
        }

        match &self.mode {
            Mode::Adding(form) => self.draw_form(frame, area, "Add Appointment", form),
            Mode::Editing { original, form } => {
                let title = format!("Edit Appointment #{}", original.id);
                self.draw_form(frame, area, &title, form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Prompting(prompt) => self.draw_prompt(frame, area, prompt),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let selected = match self.screen {
            Screen::Appointments => 0,
            Screen::Bookings(_) => 1,
        };
        let tabs = Tabs::new(TAB_TITLES)
            .select(selected)
            .block(Block::default().borders(Borders::ALL).title("Barber Booking"))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_content(&self, frame: &mut Frame, area: Rect) {
        match &self.screen {
            Screen::Appointments => self.draw_appointments(frame, area),
            Screen::Bookings(bookings) => self.draw_bookings(frame, area, bookings),
        }
    }

    fn draw_appointments(&self, frame: &mut Frame, area: Rect) {
        let screen = &self.appointments;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(screen.filter.title());

        if screen.appointments.is_empty() {
            let message = Paragraph::new(screen.filter.empty_message())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new(["ID", "Customer", "Date", "Time", "Barber"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = screen.appointments.iter().map(|appointment| {
            Row::new([
                appointment.id.to_string(),
                appointment.customer_name.clone(),
                appointment.date.clone(),
                appointment.time.clone(),
                appointment.barber_label().to_string(),
            ])
        });
        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(35),
            Constraint::Length(12),
            Constraint::Length(7),
            Constraint::Min(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
            .highlight_symbol("> ");
        let mut state = TableState::default().with_selected(Some(screen.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_bookings(&self, frame: &mut Frame, area: Rect, bookings: &BookingScreen) {
        let block = Block::default().borders(Borders::ALL).title("Shop Bookings");

        if bookings.bookings.is_empty() {
            let message = Paragraph::new("No bookings yet. Use the command menu to create one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new([
            "ID", "Customer", "Barber", "Service", "Price", "Min", "Date", "Time", "Status",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = bookings.bookings.iter().map(|booking| {
            Row::new([
                booking.id.to_string(),
                booking.customer.clone(),
                booking.barber.clone(),
                booking.service.clone(),
                format!("{:.2}", booking.price),
                booking.duration_minutes.to_string(),
                booking.date.clone(),
                booking.time.clone(),
                booking.status.clone(),
            ])
        });
        let widths = [
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Min(10),
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(4),
            Constraint::Length(11),
            Constraint::Length(6),
            Constraint::Length(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
            .highlight_symbol("> ");
        let mut state = TableState::default().with_selected(Some(bookings.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.screen, &self.mode) {
            (_, Mode::Adding(_)) | (_, Mode::Editing { .. }) => key_hints(&[
                ("[Enter]", "Save"),
                ("[Tab]", "Next field"),
                ("[Esc]", "Cancel"),
            ]),
            (_, Mode::ConfirmDelete(_)) => key_hints(&[("[y]", "Delete"), ("[n]", "Keep")]),
            (_, Mode::Prompting(_)) => key_hints(&[("[Enter]", "Apply"), ("[Esc]", "Cancel")]),
            (Screen::Bookings(_), _) => key_hints(&[
                ("[↑↓]", "Navigate"),
                ("[r]", "Refresh"),
                ("[b]", "Appointments"),
                ("[q]", "Quit"),
            ]),
            (Screen::Appointments, _) => key_hints(&[
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[f]", "Search"),
                ("[d]", "By date"),
                ("[c]", "Show all"),
                ("[b]", "Bookings"),
                ("[q]", "Quit"),
            ]),
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &AppointmentForm) {
        let popup_area = centered_rect(60, 45, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = AppointmentField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = AppointmentField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = form.active.label().chars().count() as u16 + 2;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_confirm_delete(
        &self,
        frame: &mut Frame,
        area: Rect,
        confirm: &ConfirmAppointmentDelete,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete appointment #{} for {}?",
                confirm.id, confirm.customer_name
            )),
            Line::from(format!("{} at {}", confirm.date, confirm.time)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_prompt(&self, frame: &mut Frame, area: Rect, prompt: &TextPrompt) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(prompt.kind.title());
        let label = prompt.kind.label();
        let paragraph = Paragraph::new(Span::raw(format!("{label}{}", prompt.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x =
            inner.x + label.chars().count() as u16 + prompt.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Show a store failure in the status line and hand back the value on
    /// success.
    fn report<T>(&mut self, result: BookingResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.set_status(err.to_string(), StatusKind::Error);
                None
            }
        }
    }

    fn save_new_appointment(&mut self, form: &AppointmentForm) -> Result<()> {
        let (customer_name, date, time, barber) = form.parse_new()?;
        let appointment = self
            .store
            .add_appointment(&customer_name, &date, &time, barber.as_deref())
            .context("failed to save appointment")?;

        self.reload_appointments(Some(appointment.id));
        self.set_status(
            format!(
                "Booked #{} for {} on {} at {}.",
                appointment.id, appointment.customer_name, appointment.date, appointment.time
            ),
            StatusKind::Info,
        );
        Ok(())
    }

    fn save_existing_appointment(
        &mut self,
        original: &Appointment,
        form: &AppointmentForm,
    ) -> Result<()> {
        let patch = form.patch_against(original);
        let outcome = self
            .store
            .update_appointment(original.id, patch)
            .context("failed to update appointment")?;

        match outcome {
            UpdateOutcome::Updated => {
                self.reload_appointments(Some(original.id));
                self.set_status(
                    format!("Updated appointment #{}.", original.id),
                    StatusKind::Info,
                );
            }
            UpdateOutcome::NotFound => {
                self.reload_appointments(None);
                self.set_status(
                    format!("Appointment #{} no longer exists.", original.id),
                    StatusKind::Error,
                );
            }
            UpdateOutcome::NoFields => {
                self.set_status("Nothing changed.", StatusKind::Info);
            }
        }
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmAppointmentDelete) {
        let result = self.store.delete_appointment(confirm.id);
        match self.report(result) {
            Some(DeleteOutcome::Deleted) => self.set_status(
                format!(
                    "Deleted appointment #{} ({}).",
                    confirm.id, confirm.customer_name
                ),
                StatusKind::Info,
            ),
            Some(DeleteOutcome::NotFound) => self.set_status(
                format!("Appointment #{} was already gone.", confirm.id),
                StatusKind::Error,
            ),
            None => return,
        }
        self.reload_appointments(None);
    }

    /// Re-read the table for the current filter, keeping any status already
    /// set unless the reload itself fails.
    fn reload_appointments(&mut self, focus_id: Option<i64>) {
        let result = self.appointments.reload(&self.store, focus_id);
        self.report(result);
    }

    /// Switch the table to `filter`. Returns `false` (and leaves the table
    /// alone) when the filter could not be applied.
    fn apply_filter(&mut self, filter: AppointmentFilter) -> bool {
        let showing_all = filter == AppointmentFilter::All;
        let result = self.appointments.apply_filter(&self.store, filter);
        match self.report(result) {
            Some(_) if showing_all => {
                self.clear_status();
                true
            }
            Some(count) => {
                let noun = if count == 1 { "appointment" } else { "appointments" };
                self.set_status(format!("{count} {noun} found."), StatusKind::Info);
                true
            }
            None => false,
        }
    }

    fn open_bookings(&mut self) {
        let result = BookingScreen::load(&self.store);
        if let Some(bookings) = self.report(result) {
            self.screen = Screen::Bookings(bookings);
        }
    }
}
