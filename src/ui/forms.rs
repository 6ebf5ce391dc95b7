use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{Entry, GRADES, PAYMENT_TYPES, SCHOOLS, SPORTS, TEAMS};

/// Every editable field of a registration, in form order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum EntryField {
    ControlNumber,
    FirstName,
    LastName,
    JerseyNumber,
    Grade,
    School,
    Sport,
    Team,
    ParentFirstName,
    ParentLastName,
    ParentPhone,
    ParentEmail,
    EightByTen,
    TeamPhoto,
    SilverPackage,
    DigitalCopy,
    Banner,
    Flex,
    Frame,
    PaymentType,
    PaymentAmount,
    Notes,
}

impl EntryField {
    pub(crate) const ALL: [EntryField; 22] = [
        EntryField::ControlNumber,
        EntryField::FirstName,
        EntryField::LastName,
        EntryField::JerseyNumber,
        EntryField::Grade,
        EntryField::School,
        EntryField::Sport,
        EntryField::Team,
        EntryField::ParentFirstName,
        EntryField::ParentLastName,
        EntryField::ParentPhone,
        EntryField::ParentEmail,
        EntryField::EightByTen,
        EntryField::TeamPhoto,
        EntryField::SilverPackage,
        EntryField::DigitalCopy,
        EntryField::Banner,
        EntryField::Flex,
        EntryField::Frame,
        EntryField::PaymentType,
        EntryField::PaymentAmount,
        EntryField::Notes,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            EntryField::ControlNumber => "Control #",
            EntryField::FirstName => "First Name",
            EntryField::LastName => "Last Name",
            EntryField::JerseyNumber => "Jersey #",
            EntryField::Grade => "Grade",
            EntryField::School => "School",
            EntryField::Sport => "Sport",
            EntryField::Team => "Team",
            EntryField::ParentFirstName => "Parent First",
            EntryField::ParentLastName => "Parent Last",
            EntryField::ParentPhone => "Parent Phone",
            EntryField::ParentEmail => "Parent Email",
            EntryField::EightByTen => "8x10",
            EntryField::TeamPhoto => "Team Photo",
            EntryField::SilverPackage => "Silver",
            EntryField::DigitalCopy => "Digital",
            EntryField::Banner => "Banner",
            EntryField::Flex => "Flex",
            EntryField::Frame => "Frame",
            EntryField::PaymentType => "Payment Type",
            EntryField::PaymentAmount => "Payment Amount",
            EntryField::Notes => "Notes",
        }
    }

    /// Fixed choices for picker fields; `None` means free text.
    pub(crate) fn options(self) -> Option<&'static [&'static str]> {
        match self {
            EntryField::Grade => Some(GRADES),
            EntryField::School => Some(SCHOOLS),
            EntryField::Sport => Some(SPORTS),
            EntryField::Team => Some(TEAMS),
            EntryField::PaymentType => Some(PAYMENT_TYPES),
            _ => None,
        }
    }

    /// Heading drawn above the first field of each form section.
    pub(crate) fn section(self) -> Option<&'static str> {
        match self {
            EntryField::FirstName => Some("Athlete Info"),
            EntryField::ParentFirstName => Some("Parent / Guardian"),
            EntryField::EightByTen => Some("Packages"),
            EntryField::PaymentType => Some("Payment"),
            EntryField::Notes => Some("Notes"),
            _ => None,
        }
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or_default()
    }
}

impl Default for EntryField {
    fn default() -> Self {
        EntryField::FirstName
    }
}

/// Form state for registering or editing an entry. The entry being edited is
/// carried whole so its id survives the round trip through the form.
#[derive(Clone)]
pub(crate) struct EntryForm {
    pub(crate) entry: Entry,
    pub(crate) control_number: String,
    pub(crate) active: EntryField,
    pub(crate) error: Option<String>,
}

impl EntryForm {
    /// Seed the form from a draft or an existing entry.
    pub(crate) fn from_entry(entry: &Entry) -> Self {
        Self {
            entry: entry.clone(),
            control_number: entry.control_number.to_string(),
            active: EntryField::default(),
            error: None,
        }
    }

    pub(crate) fn value(&self, field: EntryField) -> &str {
        let entry = &self.entry;
        match field {
            EntryField::ControlNumber => &self.control_number,
            EntryField::FirstName => &entry.first_name,
            EntryField::LastName => &entry.last_name,
            EntryField::JerseyNumber => &entry.jersey_number,
            EntryField::Grade => &entry.grade,
            EntryField::School => &entry.school,
            EntryField::Sport => &entry.sport,
            EntryField::Team => &entry.team,
            EntryField::ParentFirstName => &entry.parent_first_name,
            EntryField::ParentLastName => &entry.parent_last_name,
            EntryField::ParentPhone => &entry.parent_phone,
            EntryField::ParentEmail => &entry.parent_email,
            EntryField::EightByTen => &entry.eight_by_ten,
            EntryField::TeamPhoto => &entry.team_photo,
            EntryField::SilverPackage => &entry.silver_package,
            EntryField::DigitalCopy => &entry.digital_copy,
            EntryField::Banner => &entry.banner,
            EntryField::Flex => &entry.flex,
            EntryField::Frame => &entry.frame,
            EntryField::PaymentType => &entry.payment_type,
            EntryField::PaymentAmount => &entry.payment_amount,
            EntryField::Notes => &entry.notes,
        }
    }

    fn value_mut(&mut self, field: EntryField) -> &mut String {
        let entry = &mut self.entry;
        match field {
            EntryField::ControlNumber => &mut self.control_number,
            EntryField::FirstName => &mut entry.first_name,
            EntryField::LastName => &mut entry.last_name,
            EntryField::JerseyNumber => &mut entry.jersey_number,
            EntryField::Grade => &mut entry.grade,
            EntryField::School => &mut entry.school,
            EntryField::Sport => &mut entry.sport,
            EntryField::Team => &mut entry.team,
            EntryField::ParentFirstName => &mut entry.parent_first_name,
            EntryField::ParentLastName => &mut entry.parent_last_name,
            EntryField::ParentPhone => &mut entry.parent_phone,
            EntryField::ParentEmail => &mut entry.parent_email,
            EntryField::EightByTen => &mut entry.eight_by_ten,
            EntryField::TeamPhoto => &mut entry.team_photo,
            EntryField::SilverPackage => &mut entry.silver_package,
            EntryField::DigitalCopy => &mut entry.digital_copy,
            EntryField::Banner => &mut entry.banner,
            EntryField::Flex => &mut entry.flex,
            EntryField::Frame => &mut entry.frame,
            EntryField::PaymentType => &mut entry.payment_type,
            EntryField::PaymentAmount => &mut entry.payment_amount,
            EntryField::Notes => &mut entry.notes,
        }
    }

    /// Move focus to the next field, wrapping at the end.
    pub(crate) fn next_field(&mut self) {
        let next = (self.active.index() + 1) % EntryField::ALL.len();
        self.active = EntryField::ALL[next];
    }

    /// Move focus to the previous field, wrapping at the start.
    pub(crate) fn previous_field(&mut self) {
        let len = EntryField::ALL.len();
        let previous = (self.active.index() + len - 1) % len;
        self.active = EntryField::ALL[previous];
    }

    /// Type a character into the active field. Picker fields ignore typing
    /// and the control number only takes digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() || self.active.options().is_some() {
            return false;
        }
        if self.active == EntryField::ControlNumber && !ch.is_ascii_digit() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    /// Break the notes onto a new line. Only the notes field is multi-line.
    pub(crate) fn push_newline(&mut self) -> bool {
        if self.active != EntryField::Notes {
            return false;
        }
        self.entry.notes.push('\n');
        true
    }

    pub(crate) fn backspace(&mut self) {
        if self.active.options().is_some() {
            return;
        }
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Step a picker field through its choices. A value captured outside the
    /// option set restarts from the first (or last) choice.
    pub(crate) fn cycle_option(&mut self, forward: bool) -> bool {
        let field = self.active;
        let Some(options) = field.options() else {
            return false;
        };
        let len = options.len();
        let current = options.iter().position(|option| *option == self.value(field));
        let next = match (current, forward) {
            (Some(idx), true) => (idx + 1) % len,
            (Some(idx), false) => (idx + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        *self.value_mut(field) = options[next].to_string();
        true
    }

    /// Validate the inputs and return the entry ready for the store.
    pub(crate) fn parse_inputs(&self) -> Result<Entry> {
        let raw = self.control_number.trim();
        if raw.is_empty() {
            return Err(anyhow!("Control number is required."));
        }
        let control_number = raw
            .parse::<i64>()
            .context("Control number must be an integer.")?;

        let mut entry = self.entry.clone();
        entry.control_number = control_number;
        Ok(entry)
    }

    /// Render one field as a styled line; the active field is highlighted and
    /// picker fields show their arrows.
    pub(crate) fn build_line(&self, field: EntryField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if field == EntryField::Notes {
            value.replace('\n', " / ")
        } else {
            value.to_string()
        };
        let display = match (field.options(), display.is_empty()) {
            (Some(_), _) => format!("< {display} >"),
            (None, true) => "<empty>".to_string(),
            (None, false) => display,
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("  {}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Lines for the whole form plus the row index of the active field.
    pub(crate) fn build_lines(&self) -> (Vec<Line<'static>>, usize) {
        let heading = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = Vec::with_capacity(EntryField::ALL.len() + 8);
        let mut active_row = 0;

        for field in EntryField::ALL {
            if let Some(section) = field.section() {
                lines.push(Line::from(Span::styled(section, heading)));
            }
            if field == self.active {
                active_row = lines.len();
            }
            lines.push(self.build_line(field));
        }

        (lines, active_row)
    }

    /// Column offset of the cursor within the active line, for text fields
    /// that render their raw value.
    pub(crate) fn cursor_column(&self) -> Option<usize> {
        let field = self.active;
        if field.options().is_some() || field == EntryField::Notes {
            return None;
        }
        let prefix = format!("  {}: ", field.label()).chars().count();
        Some(prefix + self.value(field).chars().count())
    }
}
