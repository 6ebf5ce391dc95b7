use std::cell::RefCell;
use std::mem;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::warn;

use crate::models::EntryId;
use crate::qr;
use crate::store::{SessionStore, StoreEvent};

use super::forms::EntryForm;
use super::helpers::{centered_rect, entry_list_line, scroll_offset, surface_error};
use super::screens::{ExportKind, ExportScreen, QrPreview};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// High-level navigation states.
enum Screen {
    Entries,
    Export(ExportScreen),
}

/// Modal overlays scoped to the current screen.
enum Mode {
    Normal,
    Registering(EntryForm),
    Editing(EntryForm),
    ViewingQr(QrPreview),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
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

/// Central application state. The store is owned here and every view reaches
/// it through this struct; store events are queued by a subscription and
/// folded into the footer after each key press.
pub struct App {
    store: SessionStore,
    events: Rc<RefCell<Vec<StoreEvent>>>,
    selected: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(mut store: SessionStore) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let queue = Rc::clone(&events);
        store.subscribe(move |event| queue.borrow_mut().push(event.clone()));

        Self {
            store,
            events,
            selected: 0,
            screen: Screen::Entries,
            mode: Mode::Normal,
            status: Some(StatusMessage {
                text: "Press 'r' to resume the saved session or 'n' to register.".to_string(),
                kind: StatusKind::Info,
            }),
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Registering(form) => self.handle_entry_form(code, form, false)?,
            Mode::Editing(form) => self.handle_entry_form(code, form, true)?,
            Mode::ViewingQr(preview) => match code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Mode::Normal,
                _ => Mode::ViewingQr(preview),
            },
        };

        self.drain_store_events();
        Ok(exit)
    }

    /// Ctrl+N breaks the notes field onto a new line.
    pub(crate) fn handle_ctrl_n(&mut self) -> Result<()> {
        if let Mode::Registering(form) | Mode::Editing(form) = &mut self.mode {
            if form.push_newline() {
                form.error = None;
            }
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if let Screen::Export(export) = &mut self.screen {
            match code {
                KeyCode::Esc | KeyCode::Char('q') => {
                    self.screen = Screen::Entries;
                    self.clear_status();
                }
                KeyCode::Up => export.move_selection(-1),
                KeyCode::Down => export.move_selection(1),
                KeyCode::Enter => {
                    let kind = export.current();
                    self.run_export(kind);
                }
                KeyCode::Char('o') => self.open_last_artifact(),
                _ => {}
            }
            return Ok(Mode::Normal);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('n') => {
                self.clear_status();
                return Ok(Mode::Registering(EntryForm::from_entry(
                    &self.store.draft(),
                )));
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(entry) = self.store.entries().get(self.selected) {
                    let form = EntryForm::from_entry(entry);
                    self.clear_status();
                    return Ok(Mode::Editing(form));
                }
                self.set_status("No entry selected.", StatusKind::Error);
            }
            KeyCode::Char('v') => {
                if let Some(entry) = self.store.entries().get(self.selected) {
                    match QrPreview::for_entry(entry) {
                        Ok(preview) => return Ok(Mode::ViewingQr(preview)),
                        Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                    }
                } else {
                    self.set_status("No entry selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('r') => self.resume_session(),
            KeyCode::Char('x') => {
                self.screen = Screen::Export(ExportScreen::default());
                self.clear_status();
            }
            _ => {}
        }

        Ok(Mode::Normal)
    }

    fn handle_entry_form(
        &mut self,
        code: KeyCode,
        mut form: EntryForm,
        editing: bool,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                let message = if editing {
                    "Edit cancelled."
                } else {
                    "Registration cancelled."
                };
                self.set_status(message, StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => {
                form.cycle_option(false);
            }
            KeyCode::Right => {
                form.cycle_option(true);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let saved = if editing {
                    self.save_existing_entry(&form)
                } else {
                    self.save_new_entry(&form)
                };
                match saved {
                    Ok(mode) => return Ok(mode),
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if editing {
            Ok(Mode::Editing(form))
        } else {
            Ok(Mode::Registering(form))
        }
    }

    /// Regenerate the QR image, append the entry and show its code.
    fn save_new_entry(&mut self, form: &EntryForm) -> Result<Mode> {
        let mut entry = form.parse_inputs()?;
        qr::attach(&mut entry)?;

        let preview = QrPreview::for_entry(&entry);
        let control_number = entry.control_number;
        let name = entry.display_name();
        self.store.add(entry);
        self.selected = self.store.len().saturating_sub(1);
        self.set_status(
            format!("Registered #{control_number} {name}."),
            StatusKind::Info,
        );

        match preview {
            Ok(preview) => Ok(Mode::ViewingQr(preview)),
            Err(err) => {
                warn!(error = %err, "QR preview unavailable");
                Ok(Mode::Normal)
            }
        }
    }

    /// Regenerate the QR image and replace the stored entry in place.
    fn save_existing_entry(&mut self, form: &EntryForm) -> Result<Mode> {
        let mut entry = form.parse_inputs()?;
        qr::attach(&mut entry)?;

        let id = entry.id();
        let control_number = entry.control_number;
        self.store.update(entry);
        self.focus_entry(id);
        self.set_status(
            format!("Saved changes to #{control_number}."),
            StatusKind::Info,
        );
        Ok(Mode::Normal)
    }

    fn resume_session(&mut self) {
        self.set_status("No saved session could be read.", StatusKind::Error);
        self.store.load();
        if self.selected >= self.store.len() {
            self.selected = self.store.len().saturating_sub(1);
        }
    }

    fn run_export(&mut self, kind: ExportKind) {
        let artifact = match kind {
            ExportKind::Csv => self.store.export_csv(),
            ExportKind::RosterByNumber => self.store.roster_by_number(),
            ExportKind::RosterByGrade => self.store.roster_by_grade(),
        };

        match artifact {
            Some(path) => {
                self.set_status(format!("Wrote {}.", path.display()), StatusKind::Info);
                if let Screen::Export(export) = &mut self.screen {
                    export.last_artifact = Some(path);
                }
            }
            None => self.set_status(
                format!("{} failed; see the log for details.", kind.label()),
                StatusKind::Error,
            ),
        }
    }

    fn open_last_artifact(&mut self) {
        let Some(path) = self.last_artifact() else {
            self.set_status("Nothing exported yet.", StatusKind::Error);
            return;
        };
        match open_link(&path) {
            Ok(()) => self.set_status(format!("Opened {}.", path.display()), StatusKind::Info),
            Err(err) => self.set_status(
                format!("Could not open {}: {err}", path.display()),
                StatusKind::Error,
            ),
        }
    }

    fn last_artifact(&self) -> Option<PathBuf> {
        match &self.screen {
            Screen::Export(export) => export.last_artifact.clone(),
            Screen::Entries => None,
        }
    }

    /// Fold queued store events into the footer. Only outcomes the user did
    /// not trigger directly need a message of their own.
    fn drain_store_events(&mut self) {
        let events: Vec<StoreEvent> = self.events.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                StoreEvent::Loaded { count } => {
                    self.set_status(
                        format!("Resumed session with {count} entries."),
                        StatusKind::Info,
                    );
                }
                StoreEvent::SaveFailed(message) => {
                    self.set_status(
                        format!("Session not saved: {message}"),
                        StatusKind::Error,
                    );
                }
                StoreEvent::Added(_) | StoreEvent::Updated(_) | StoreEvent::Saved => {}
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Entries => self.draw_entry_list(frame, content_area),
            Screen::Export(export) => self.draw_export(frame, content_area, export),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Registering(form) => self.draw_entry_form(frame, area, "New Registration", form),
            Mode::Editing(form) => {
                let title = format!("Edit Registration #{}", form.entry.control_number);
                self.draw_entry_form(frame, area, &title, form)
            }
            Mode::ViewingQr(preview) => self.draw_qr_preview(frame, area, preview),
            Mode::Normal => {}
        }
    }

    fn draw_entry_list(&self, frame: &mut Frame, area: Rect) {
        let title = format!(
            "Session Data ({} entries, next #{})",
            self.store.len(),
            self.store.next_control_number()
        );
        let block = Block::default().title(title).borders(Borders::ALL);

        if self.store.is_empty() {
            let message = Paragraph::new("No entries yet.")
                .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .store
            .entries()
            .iter()
            .map(|entry| ListItem::new(entry_list_line(entry)))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_export(&self, frame: &mut Frame, area: Rect, export: &ExportScreen) {
        let block = Block::default().title("Export / Print").borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(ExportKind::ALL.len() as u16 + 1),
                Constraint::Min(0),
            ])
            .split(inner);

        let items: Vec<ListItem> = ExportKind::ALL
            .iter()
            .map(|kind| ListItem::new(kind.label()))
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(export.selected));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let mut lines = vec![Line::from(format!(
            "Exports are written to {}",
            self.store.export_dir().display()
        ))];
        if let Some(path) = &export.last_artifact {
            lines.push(Line::from(vec![
                Span::raw("Last export: "),
                Span::styled(path.display().to_string(), Style::default().fg(Color::Cyan)),
            ]));
        }
        let details = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(details, chunks[1]);
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

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Registering(_)) | (_, Mode::Editing(_)) => &[
                ("[Tab/↑↓]", " Field   "),
                ("[←→]", " Choose   "),
                ("[Ctrl+N]", " Newline in notes   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::ViewingQr(_)) => &[("[Esc]", " Close")],
            (Screen::Export(_), _) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Export   "),
                ("[o]", " Open last   "),
                ("[Esc]", " Back"),
            ],
            (Screen::Entries, _) => &[
                ("[n]", " New   "),
                ("[Enter]", " Edit   "),
                ("[v]", " QR   "),
                ("[r]", " Resume session   "),
                ("[x]", " Export   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, action)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(action.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_entry_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &EntryForm) {
        let popup_area = centered_rect(80, 90, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let (mut lines, active_row) = form.build_lines();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let offset = scroll_offset(active_row, inner.height as usize);
        let paragraph = Paragraph::new(lines).scroll((offset as u16, 0));
        frame.render_widget(paragraph, inner);

        if let Some(column) = form.cursor_column() {
            let row = active_row.saturating_sub(offset) as u16;
            if row < inner.height {
                let cursor_x = (inner.x + column as u16).min(inner.right().saturating_sub(1));
                frame.set_cursor_position((cursor_x, inner.y + row));
            }
        }
    }

    fn draw_qr_preview(&self, frame: &mut Frame, area: Rect, preview: &QrPreview) {
        let popup_area = centered_rect(60, 80, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(preview.title.clone())
            .borders(Borders::ALL);

        let mut lines: Vec<Line> = preview
            .lines
            .iter()
            .map(|row| Line::from(row.clone()))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            preview.payload.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup_area);
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

    fn focus_entry(&mut self, id: EntryId) {
        if let Some(idx) = self.store.entries().iter().position(|entry| entry.id() == id) {
            self.selected = idx;
        }
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.store.len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }
}
