use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use tempfile::TempDir;
use team_roster_manager::export::{FULL_HEADER, ROSTER_HEADER};
use team_roster_manager::{qr, Entry, SessionStore, StoreError, StoreEvent};

fn temp_store() -> (TempDir, SessionStore) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = SessionStore::new(dir.path().join("session.sqlite"), dir.path().join("exports"));
    (dir, store)
}

fn reopen(dir: &TempDir) -> SessionStore {
    SessionStore::new(dir.path().join("session.sqlite"), dir.path().join("exports"))
}

fn athlete(control_number: i64, first: &str, jersey: &str, grade: &str) -> Entry {
    let mut entry = Entry::new(control_number);
    entry.first_name = first.to_string();
    entry.last_name = "Rivera".to_string();
    entry.jersey_number = jersey.to_string();
    entry.grade = grade.to_string();
    entry
}

fn record_events(store: &mut SessionStore) -> Rc<RefCell<Vec<StoreEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("export should be readable")
}

#[test]
fn new_store_is_empty_and_numbers_from_one() {
    let (_dir, store) = temp_store();
    assert!(store.is_empty());
    assert_eq!(store.next_control_number(), 1);
    assert_eq!(store.draft().control_number, 1);
}

#[test]
fn next_control_number_tracks_max_after_each_add() {
    let (_dir, mut store) = temp_store();

    for control_number in [1, 5, 3] {
        store.add(athlete(control_number, "A", "1", "9"));
        let max = store
            .entries()
            .iter()
            .map(|entry| entry.control_number)
            .max()
            .expect("store is not empty");
        assert_eq!(store.next_control_number(), max + 1);
    }

    assert_eq!(store.next_control_number(), 6);
}

#[test]
fn add_preserves_insertion_order_and_skips_duplicate_checks() {
    let (_dir, mut store) = temp_store();
    let first = athlete(2, "First", "1", "9");
    let second = athlete(2, "Second", "1", "9");

    store.add(first.clone());
    store.add(second.clone());

    let names: Vec<&str> = store.entries().iter().map(|e| e.first_name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
    assert_eq!(store.next_control_number(), 3);
}

#[test]
fn update_replaces_in_place_and_leaves_others_untouched() {
    let (_dir, mut store) = temp_store();
    let a = athlete(1, "A", "1", "9");
    let b = athlete(2, "B", "2", "10");
    let c = athlete(3, "C", "3", "11");
    store.add(a.clone());
    store.add(b.clone());
    store.add(c.clone());

    let mut edited = b.clone();
    edited.first_name = "Bea".to_string();
    edited.payment_type = "Cash".to_string();
    edited.notes = "paid at the door".to_string();
    store.update(edited.clone());

    assert_eq!(store.len(), 3);
    assert_eq!(store.entries()[0], a);
    assert_eq!(store.entries()[1], edited);
    assert_eq!(store.entries()[2], c);
    assert_eq!(store.get(b.id()), Some(&edited));
}

#[test]
fn update_with_unknown_id_is_a_silent_no_op() {
    let (dir, mut store) = temp_store();
    store.add(athlete(1, "A", "1", "9"));
    let before = store.entries().to_vec();
    let events = record_events(&mut store);

    store.update(athlete(9, "Stranger", "9", "12"));

    assert_eq!(store.entries(), before.as_slice());
    assert_eq!(store.next_control_number(), 2);
    assert!(events.borrow().is_empty());

    let mut reloaded = reopen(&dir);
    reloaded.load();
    assert_eq!(reloaded.entries(), before.as_slice());
}

#[test]
fn update_recomputes_next_control_number() {
    let (_dir, mut store) = temp_store();
    let entry = athlete(1, "A", "1", "9");
    store.add(entry.clone());

    let mut renumbered = entry;
    renumbered.control_number = 40;
    store.update(renumbered);

    assert_eq!(store.next_control_number(), 41);
}

#[test]
fn save_then_load_reproduces_the_collection() {
    let (dir, mut store) = temp_store();

    let mut first = athlete(3, "Mia", "10", "12");
    first.parent_first_name = "Ana".into();
    first.parent_email = "ana@example.com".into();
    first.silver_package = "2".into();
    first.notes = "line one\nline two, with comma".into();
    qr::attach(&mut first).expect("qr should render");

    let mut second = athlete(1, "Leo", "2", "Coach");
    second.qr_image = Some(vec![0, 159, 146, 150, 255]);

    store.add(first.clone());
    store.add(second.clone());
    store.add(athlete(7, "Ivy", "33", "9"));
    let saved = store.entries().to_vec();

    let mut reloaded = reopen(&dir);
    let count = reloaded.try_load().expect("session should load");

    assert_eq!(count, 3);
    assert_eq!(reloaded.entries(), saved.as_slice());
    assert_eq!(reloaded.entries()[0].qr_image, first.qr_image);
    assert_eq!(reloaded.entries()[1].qr_image, second.qr_image);
    assert_eq!(reloaded.entries()[2].qr_image, None);
    assert_eq!(reloaded.next_control_number(), 8);
}

#[test]
fn load_replaces_rather_than_merges() {
    let (dir, mut saved) = temp_store();
    saved.add(athlete(1, "Saved", "1", "9"));

    let other_file = dir.path().join("other.sqlite");
    let mut other = SessionStore::new(&other_file, dir.path().join("exports"));
    other.add(athlete(10, "Other", "4", "9"));
    other.add(athlete(11, "Another", "5", "9"));

    fs::copy(saved.session_file(), &other_file).expect("session should be copied");
    other.load();

    assert_eq!(other.entries(), saved.entries());
    assert_eq!(other.next_control_number(), 2);
}

#[test]
fn load_without_session_file_leaves_store_untouched() {
    let (_dir, mut store) = temp_store();
    let events = record_events(&mut store);

    let err = store.try_load().expect_err("missing file must fail");
    assert!(matches!(err, StoreError::Missing(_)));

    store.load();
    assert!(store.is_empty());
    assert_eq!(store.next_control_number(), 1);
    assert!(events.borrow().is_empty());
}

#[test]
fn load_of_corrupt_session_keeps_current_entries() {
    let (dir, mut store) = temp_store();
    store.add(athlete(4, "Kept", "1", "9"));
    let before = store.entries().to_vec();

    fs::write(dir.path().join("session.sqlite"), b"definitely not a database")
        .expect("corrupt file should be written");

    let err = store.try_load().expect_err("corrupt file must fail");
    assert!(matches!(err, StoreError::Sqlite(_)));

    store.load();
    assert_eq!(store.entries(), before.as_slice());
    assert_eq!(store.next_control_number(), 5);
}

#[test]
fn save_overwrites_a_corrupt_session_file() {
    let (dir, mut store) = temp_store();
    fs::write(dir.path().join("session.sqlite"), b"garbage").expect("file should be written");

    store.add(athlete(1, "Fresh", "1", "9"));

    let mut reloaded = reopen(&dir);
    reloaded.try_load().expect("session should load");
    assert_eq!(reloaded.entries()[0].first_name, "Fresh");
}

#[test]
fn save_failure_is_swallowed_but_observable() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let blocked = dir.path().join("blocked");
    fs::create_dir_all(blocked.join("not-empty")).expect("dir should be created");

    let mut store = SessionStore::new(&blocked, dir.path().join("exports"));
    let events = record_events(&mut store);

    let entry = athlete(1, "A", "1", "9");
    store.add(entry.clone());

    assert_eq!(store.entries(), &[entry.clone()][..]);
    assert!(store.try_save().is_err());

    let events = events.borrow();
    assert_eq!(events[0], StoreEvent::Added(entry.id()));
    assert!(matches!(events[1], StoreEvent::SaveFailed(_)));
}

#[test]
fn observers_hear_mutations_until_unsubscribed() {
    let (_dir, mut store) = temp_store();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let subscription = store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let entry = athlete(1, "A", "1", "9");
    store.add(entry.clone());
    store.update(entry.clone());
    store.load();

    assert_eq!(
        *events.borrow(),
        vec![
            StoreEvent::Added(entry.id()),
            StoreEvent::Saved,
            StoreEvent::Updated(entry.id()),
            StoreEvent::Saved,
            StoreEvent::Loaded { count: 1 },
        ]
    );

    store.unsubscribe(subscription);
    store.add(athlete(2, "B", "2", "9"));
    assert_eq!(events.borrow().len(), 5);
}

#[test]
fn export_csv_has_header_plus_one_line_per_entry() {
    let (_dir, mut store) = temp_store();
    let mut noted = athlete(1, "Noa", "5", "9");
    noted.notes = "allergic\nto peanuts".into();
    store.add(noted);
    store.add(athlete(2, "Eli", "6", "10"));

    let path = store.export_csv().expect("export should be written");
    assert!(path.ends_with("registrations.csv"));

    let csv = read(&path);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], FULL_HEADER);
    assert!(lines[1].starts_with("1,Noa,Rivera,5,9,"));
    assert!(lines[1].ends_with(",allergic to peanuts"));
    assert!(lines[2].starts_with("2,Eli,"));
}

#[test]
fn empty_store_exports_header_only() {
    let (_dir, store) = temp_store();

    let full = read(&store.export_csv().expect("csv export"));
    let by_number = read(&store.roster_by_number().expect("number roster"));
    let by_grade = read(&store.roster_by_grade().expect("grade roster"));

    assert_eq!(full.lines().collect::<Vec<_>>(), vec![FULL_HEADER]);
    assert_eq!(by_number.lines().collect::<Vec<_>>(), vec![ROSTER_HEADER]);
    assert_eq!(by_grade.lines().collect::<Vec<_>>(), vec![ROSTER_HEADER]);
}

#[test]
fn roster_by_number_uses_string_order() {
    let (_dir, mut store) = temp_store();
    store.add(athlete(1, "Two", "2", "9"));
    store.add(athlete(2, "Ten", "10", "9"));
    store.add(athlete(3, "Three", "3", "9"));

    let path = store.roster_by_number().expect("roster should be written");
    assert!(path.ends_with("roster_by_number.csv"));

    let roster = read(&path);
    let jerseys: Vec<&str> = roster
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').nth(3))
        .collect();
    assert_eq!(jerseys, vec!["10", "2", "3"]);

    let order: Vec<&str> = store.entries().iter().map(|e| e.jersey_number.as_str()).collect();
    assert_eq!(order, vec!["2", "10", "3"]);
}

#[test]
fn roster_by_grade_uses_string_order() {
    let (_dir, mut store) = temp_store();
    store.add(athlete(1, "Frosh", "1", "9"));
    store.add(athlete(2, "Coach", "0", "Coach"));
    store.add(athlete(3, "Junior", "2", "11"));

    let path = store.roster_by_grade().expect("roster should be written");
    assert!(path.ends_with("roster_by_grade.csv"));

    let roster = read(&path);
    let grades: Vec<&str> = roster
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').nth(4))
        .collect();
    assert_eq!(grades, vec!["11", "9", "Coach"]);
}

#[test]
fn export_failure_yields_no_artifact() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let export_path = dir.path().join("exports");
    fs::write(&export_path, b"a file where the export folder should be")
        .expect("blocking file should be written");

    let store = SessionStore::new(dir.path().join("session.sqlite"), &export_path);

    assert!(store.export_csv().is_none());
    assert!(store.roster_by_number().is_none());
    assert!(store.roster_by_grade().is_none());
    assert!(matches!(store.try_export_csv(), Err(StoreError::Io { .. })));
}
