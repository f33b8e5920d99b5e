use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::dates;
use crate::models::{non_blank, Appointment, AppointmentPatch};

/// Fields of the appointment form, in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum AppointmentField {
    #[default]
    CustomerName,
    Date,
    Time,
    Barber,
}

impl AppointmentField {
    pub(crate) const ALL: [AppointmentField; 4] = [
        AppointmentField::CustomerName,
        AppointmentField::Date,
        AppointmentField::Time,
        AppointmentField::Barber,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            AppointmentField::CustomerName => "Customer",
            AppointmentField::Date => "Date",
            AppointmentField::Time => "Time",
            AppointmentField::Barber => "Barber",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            AppointmentField::CustomerName => "<required>",
            AppointmentField::Date => "<DD-MM-YYYY>",
            AppointmentField::Time => "<HH:MM>",
            AppointmentField::Barber => "<optional>",
        }
    }

    fn next(self) -> Self {
        match self {
            AppointmentField::CustomerName => AppointmentField::Date,
            AppointmentField::Date => AppointmentField::Time,
            AppointmentField::Time => AppointmentField::Barber,
            AppointmentField::Barber => AppointmentField::CustomerName,
        }
    }

    fn previous(self) -> Self {
        match self {
            AppointmentField::CustomerName => AppointmentField::Barber,
            AppointmentField::Date => AppointmentField::CustomerName,
            AppointmentField::Time => AppointmentField::Date,
            AppointmentField::Barber => AppointmentField::Time,
        }
    }
}

/// State behind the add and edit popups.
#[derive(Default, Clone, Debug)]
pub(crate) struct AppointmentForm {
    pub(crate) customer_name: String,
    pub(crate) date: String,
    pub(crate) time: String,
    pub(crate) barber: String,
    pub(crate) active: AppointmentField,
    pub(crate) error: Option<String>,
}

impl AppointmentForm {
    /// Pre-fill the form from an existing appointment when editing.
    pub(crate) fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            customer_name: appointment.customer_name.clone(),
            date: appointment.date.clone(),
            time: appointment.time.clone(),
            barber: appointment.barber_name.clone().unwrap_or_default(),
            active: AppointmentField::CustomerName,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    fn value(&self, field: AppointmentField) -> &String {
        match field {
            AppointmentField::CustomerName => &self.customer_name,
            AppointmentField::Date => &self.date,
            AppointmentField::Time => &self.time,
            AppointmentField::Barber => &self.barber,
        }
    }

    fn value_mut(&mut self, field: AppointmentField) -> &mut String {
        match field {
            AppointmentField::CustomerName => &mut self.customer_name,
            AppointmentField::Date => &mut self.date,
            AppointmentField::Time => &mut self.time,
            AppointmentField::Barber => &mut self.barber,
        }
    }

    /// Append a character to the active field. Dates and times only take
    /// the characters their layouts use.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let allowed = match self.active {
            AppointmentField::Date => ch.is_ascii_digit() || ch == '-',
            AppointmentField::Time => ch.is_ascii_digit() || ch == ':',
            AppointmentField::CustomerName | AppointmentField::Barber => !ch.is_control(),
        };
        if allowed {
            let field = self.active;
            self.value_mut(field).push(ch);
        }
        allowed
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Check the inputs for a new appointment. The date is validated here so
    /// the popup can point at the problem before the store is asked.
    pub(crate) fn parse_new(&self) -> Result<(String, String, String, Option<String>)> {
        let customer_name =
            non_blank(&self.customer_name).ok_or_else(|| anyhow!("Customer name is required."))?;
        let date = non_blank(&self.date).ok_or_else(|| anyhow!("Date is required."))?;
        dates::to_storage(&date)?;
        let time = non_blank(&self.time).ok_or_else(|| anyhow!("Time is required."))?;
        Ok((customer_name, date, time, non_blank(&self.barber)))
    }

    /// Patch holding only the fields that differ from `original`. A barber
    /// field emptied by the user stays unchanged, matching blank-keeps-value
    /// semantics everywhere else.
    pub(crate) fn patch_against(&self, original: &Appointment) -> AppointmentPatch {
        let changed = |edited: &str, current: &str| {
            non_blank(edited).filter(|value| value != current.trim())
        };
        AppointmentPatch {
            customer_name: changed(&self.customer_name, &original.customer_name),
            date: changed(&self.date, &original.date),
            time: changed(&self.time, &original.time),
            barber_name: changed(&self.barber, original.barber_name.as_deref().unwrap_or("")),
        }
    }

    pub(crate) fn build_line(&self, field: AppointmentField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            field.placeholder().to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: AppointmentField) -> usize {
        self.value(field).chars().count()
    }
}

/// Snapshot of the appointment shown in the delete confirmation.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmAppointmentDelete {
    pub(crate) id: i64,
    pub(crate) customer_name: String,
    pub(crate) date: String,
    pub(crate) time: String,
}

impl ConfirmAppointmentDelete {
    pub(crate) fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            customer_name: appointment.customer_name.clone(),
            date: appointment.date.clone(),
            time: appointment.time.clone(),
        }
    }
}

/// One-line input popups.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PromptKind {
    Search,
    Date,
}

impl PromptKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            PromptKind::Search => "Search: ",
            PromptKind::Date => "Date (DD-MM-YYYY): ",
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            PromptKind::Search => "Search by name or id",
            PromptKind::Date => "Show one day",
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct TextPrompt {
    pub(crate) kind: PromptKind,
    pub(crate) query: String,
}

impl TextPrompt {
    pub(crate) fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            query: String::new(),
        }
    }
}
