//! CSV rendering for the full registration export and the printable rosters.
//! Both functions are pure so the store can write the result wherever it
//! likes and tests can inspect the text directly.

use std::borrow::Cow;

use crate::models::Entry;

/// Header of the full export, one column per entry field.
pub const FULL_HEADER: &str = "Control #,First Name,Last Name,Jersey #,Grade,School,Sport,Team,\
Parent First,Parent Last,Parent Phone,Parent Email,8x10,Team Photo,Silver,Digital,Banner,Flex,\
Frame,Payment Type,Payment Amount,Notes";

/// Header of the reduced roster export.
pub const ROSTER_HEADER: &str = "Control #,First Name,Last Name,Jersey #,Grade,School,Sport,Team";

/// Which column a roster is sorted by. Both compare the raw strings, so jersey
/// "10" sorts ahead of "2".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterOrder {
    JerseyNumber,
    Grade,
}

impl RosterOrder {
    fn key(self, entry: &Entry) -> &str {
        match self {
            RosterOrder::JerseyNumber => &entry.jersey_number,
            RosterOrder::Grade => &entry.grade,
        }
    }
}

/// Render every entry, in collection order, beneath [`FULL_HEADER`].
pub fn full_csv(entries: &[Entry]) -> String {
    let mut out = String::new();
    push_line(&mut out, FULL_HEADER);

    for entry in entries {
        let control = entry.control_number.to_string();
        let row: [&str; 22] = [
            &control,
            &entry.first_name,
            &entry.last_name,
            &entry.jersey_number,
            &entry.grade,
            &entry.school,
            &entry.sport,
            &entry.team,
            &entry.parent_first_name,
            &entry.parent_last_name,
            &entry.parent_phone,
            &entry.parent_email,
            &entry.eight_by_ten,
            &entry.team_photo,
            &entry.silver_package,
            &entry.digital_copy,
            &entry.banner,
            &entry.flex,
            &entry.frame,
            &entry.payment_type,
            &entry.payment_amount,
            &entry.notes,
        ];
        push_line(&mut out, &join_row(&row));
    }

    out
}

/// Render the reduced roster columns sorted by `order`. The sort is stable,
/// so entries with equal keys keep their collection order.
pub fn roster_csv(entries: &[Entry], order: RosterOrder) -> String {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| order.key(a).cmp(order.key(b)));

    let mut out = String::new();
    push_line(&mut out, ROSTER_HEADER);

    for entry in sorted {
        let control = entry.control_number.to_string();
        let row: [&str; 8] = [
            &control,
            &entry.first_name,
            &entry.last_name,
            &entry.jersey_number,
            &entry.grade,
            &entry.school,
            &entry.sport,
            &entry.team,
        ];
        push_line(&mut out, &join_row(&row));
    }

    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn join_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| escape_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

/// Flatten line breaks to spaces so each record stays on one line, then quote
/// the field only if it contains a comma or a double quote.
fn escape_field(raw: &str) -> Cow<'_, str> {
    let flattened: Cow<'_, str> = if raw.contains(['\r', '\n']) {
        Cow::Owned(raw.replace("\r\n", " ").replace(['\r', '\n'], " "))
    } else {
        Cow::Borrowed(raw)
    };

    if flattened.contains([',', '"']) {
        Cow::Owned(format!("\"{}\"", flattened.replace('"', "\"\"")))
    } else {
        flattened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athlete(control: i64, first: &str, jersey: &str, grade: &str) -> Entry {
        let mut entry = Entry::new(control);
        entry.first_name = first.to_string();
        entry.last_name = "Smith".to_string();
        entry.jersey_number = jersey.to_string();
        entry.grade = grade.to_string();
        entry
    }

    #[test]
    fn empty_exports_are_header_only() {
        assert_eq!(full_csv(&[]), format!("{FULL_HEADER}\n"));
        assert_eq!(
            roster_csv(&[], RosterOrder::JerseyNumber),
            format!("{ROSTER_HEADER}\n")
        );
        assert_eq!(roster_csv(&[], RosterOrder::Grade).lines().count(), 1);
    }

    #[test]
    fn full_row_follows_header_order() {
        let mut entry = athlete(4, "Jo", "12", "10");
        entry.parent_first_name = "Pat".into();
        entry.parent_phone = "555-0100".into();
        entry.banner = "2".into();
        entry.payment_type = "Cash".into();
        entry.payment_amount = "45".into();
        entry.notes = "pick up\nafter practice".into();

        let csv = full_csv(&[entry]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], FULL_HEADER);
        assert_eq!(
            lines[1],
            "4,Jo,Smith,12,10,Ridgeline,Football,Varsity,Pat,,555-0100,,0,0,0,0,2,0,0,Cash,45,pick up after practice"
        );
        assert_eq!(lines[1].split(',').count(), FULL_HEADER.split(',').count());
    }

    #[test]
    fn line_breaks_in_any_field_become_spaces() {
        let mut entry = athlete(1, "A\r\nB", "7", "9");
        entry.notes = "one\rtwo\nthree".into();

        let csv = full_csv(&[entry]);
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains(",A B,"));
        assert!(csv.ends_with(",one two three\n"));
    }

    #[test]
    fn commas_and_quotes_are_quoted() {
        let mut entry = athlete(1, "Jo", "7", "9");
        entry.notes = "paid \"late\", cash".into();

        let csv = full_csv(&[entry]);
        assert!(csv.ends_with(",\"paid \"\"late\"\", cash\"\n"));
    }

    #[test]
    fn roster_by_number_sorts_lexicographically() {
        let entries = vec![
            athlete(1, "Two", "2", "9"),
            athlete(2, "Ten", "10", "9"),
            athlete(3, "Three", "3", "9"),
        ];

        let csv = roster_csv(&entries, RosterOrder::JerseyNumber);
        let jerseys: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|line| line.split(',').nth(3).unwrap_or_default())
            .collect();

        assert_eq!(jerseys, vec!["10", "2", "3"]);
        assert!(csv.starts_with(ROSTER_HEADER));
    }

    #[test]
    fn roster_by_grade_is_stable_for_ties() {
        let entries = vec![
            athlete(1, "First", "1", "9"),
            athlete(2, "Coach", "0", "Coach"),
            athlete(3, "Second", "2", "9"),
            athlete(4, "Senior", "3", "12"),
        ];

        let csv = roster_csv(&entries, RosterOrder::Grade);
        let names: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|line| line.split(',').nth(1).unwrap_or_default())
            .collect();

        assert_eq!(names, vec!["Senior", "First", "Second", "Coach"]);
    }

    #[test]
    fn roster_leaves_collection_untouched() {
        let entries = vec![athlete(1, "B", "2", "9"), athlete(2, "A", "10", "9")];
        let _ = roster_csv(&entries, RosterOrder::JerseyNumber);
        assert_eq!(entries[0].first_name, "B");
    }
}
