use std::path::PathBuf;

use anyhow::Result;

use crate::models::Entry;
use crate::qr;

/// The three artifacts offered on the export screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ExportKind {
    Csv,
    RosterByNumber,
    RosterByGrade,
}

impl ExportKind {
    pub(crate) const ALL: [ExportKind; 3] = [
        ExportKind::Csv,
        ExportKind::RosterByNumber,
        ExportKind::RosterByGrade,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            ExportKind::Csv => "Export to CSV",
            ExportKind::RosterByNumber => "Roster by Number",
            ExportKind::RosterByGrade => "Roster by Grade",
        }
    }
}

/// State for the export screen: which action is highlighted and the artifact
/// produced most recently.
#[derive(Default)]
pub(crate) struct ExportScreen {
    pub(crate) selected: usize,
    pub(crate) last_artifact: Option<PathBuf>,
}

impl ExportScreen {
    pub(crate) fn current(&self) -> ExportKind {
        ExportKind::ALL[self.selected.min(ExportKind::ALL.len() - 1)]
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = ExportKind::ALL.len() as isize;
        let next = (self.selected as isize + offset).rem_euclid(len);
        self.selected = next as usize;
    }
}

/// Terminal rendering of an entry's QR code.
pub(crate) struct QrPreview {
    pub(crate) title: String,
    pub(crate) payload: String,
    pub(crate) lines: Vec<String>,
}

impl QrPreview {
    pub(crate) fn for_entry(entry: &Entry) -> Result<Self> {
        let payload = qr::payload(entry);
        let lines = qr::preview_lines(&payload)?;
        Ok(Self {
            title: format!("QR Code #{}", entry.control_number),
            payload,
            lines,
        })
    }
}
