use workforge_core::{
    db::open_db_in_memory, ChecklistPriority, ChecklistTracker, FixedClock, Job, JobRepository,
    MemoryWorkStore, NoteBoard, ServiceError, SqliteWorkStore, ValidationError,
    NOTE_PALETTE_SIZE,
};

const START: i64 = 1_750_000_000_000;

fn seeded_job<R: JobRepository>(repo: R) -> Job {
    let job = Job::new("Campus tutor", START);
    repo.insert_job(&job).unwrap();
    job
}

#[test]
fn checklist_completion_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteWorkStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(START);
    let checklist = ChecklistTracker::new(store, &clock);
    let job = seeded_job(store);

    let mut first = checklist.add(&job, " Print handouts ").unwrap();
    let mut second = checklist.add(&job, "Book room").unwrap();
    assert_eq!(first.title, "Print handouts");
    assert_eq!(first.display_priority(), ChecklistPriority::Green);

    clock.advance(10);
    checklist.complete(&mut first).unwrap();
    clock.advance(10);
    checklist.complete(&mut second).unwrap();
    // Completing twice keeps the original stamp.
    clock.advance(10);
    checklist.complete(&mut first).unwrap();
    assert_eq!(first.completion_date, Some(START + 10));

    let completed: Vec<String> = checklist
        .list_completed(&job)
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(completed, vec!["Book room", "Print handouts"]);
    assert!(checklist.list_active(&job).unwrap().is_empty());

    checklist.uncomplete(&mut first).unwrap();
    let stored = checklist.get(first.id).unwrap();
    assert_eq!(stored.completion_date, None);
    assert_eq!(checklist.list_active(&job).unwrap(), vec![stored]);
}

#[test]
fn checklist_priority_rename_and_remove() {
    let store = MemoryWorkStore::new();
    let clock = FixedClock::new(START);
    let checklist = ChecklistTracker::new(&store, &clock);
    let job = seeded_job(&store);

    let mut item = checklist.add(&job, "Grade quizzes").unwrap();
    checklist.set_priority(&mut item, ChecklistPriority::Red).unwrap();
    checklist.rename(&mut item, "Grade midterms").unwrap();

    let stored = checklist.get(item.id).unwrap();
    assert_eq!(stored.priority, "Red");
    assert_eq!(stored.display_priority().description(), "Red: Urgent");
    assert_eq!(stored.title, "Grade midterms");

    let id = item.id;
    checklist.remove(item).unwrap();
    assert!(matches!(
        checklist.get(id),
        Err(ServiceError::NotFound { .. })
    ));
}

#[test]
fn unknown_stored_priority_displays_as_green_without_rewrite() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteWorkStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(START);
    let checklist = ChecklistTracker::new(store, &clock);
    let job = seeded_job(store);
    let item = checklist.add(&job, "Legacy item").unwrap();

    conn.execute(
        "UPDATE checklist_items SET priority = 'Purple' WHERE uuid = ?1;",
        [item.id.to_string()],
    )
    .unwrap();

    let stored = checklist.get(item.id).unwrap();
    assert_eq!(stored.priority, "Purple");
    assert_eq!(stored.display_priority(), ChecklistPriority::Green);
}

#[test]
fn notes_take_lowest_free_color() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteWorkStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(START);
    let notes = NoteBoard::new(store, &clock);
    let job = seeded_job(store);

    let mut created = Vec::new();
    for n in 0..3 {
        clock.advance(1);
        created.push(notes.create(&job, format!("body {n}"), format!("note {n}")).unwrap());
    }
    assert_eq!(
        created.iter().map(|note| note.color_index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(notes.next_color_index(&job).unwrap(), 3);

    let middle = created.remove(1);
    notes.remove(middle).unwrap();
    assert_eq!(notes.next_color_index(&job).unwrap(), 1);
    clock.advance(1);
    let refill = notes.create(&job, "refill", "refill").unwrap();
    assert_eq!(refill.color_index, 1);

    let listed: Vec<String> = notes
        .list(&job)
        .unwrap()
        .into_iter()
        .map(|note| note.summary)
        .collect();
    assert_eq!(listed, vec!["note 0", "note 2", "refill"]);
}

#[test]
fn colors_repeat_once_palette_is_full() {
    let store = MemoryWorkStore::new();
    let clock = FixedClock::new(START);
    let notes = NoteBoard::new(&store, &clock);
    let job = seeded_job(&store);

    for n in 0..NOTE_PALETTE_SIZE {
        let note = notes.create(&job, "body", format!("n{n}")).unwrap();
        assert_eq!(note.color_index, n);
    }
    let ninth = notes.create(&job, "body", "n8").unwrap();
    assert_eq!(ninth.color_index, 0);
    let tenth = notes.create(&job, "body", "n9").unwrap();
    assert_eq!(tenth.color_index, 1);
}

#[test]
fn note_edit_keeps_color_and_creation_date() {
    let store = MemoryWorkStore::new();
    let clock = FixedClock::new(START);
    let notes = NoteBoard::new(&store, &clock);
    let job = seeded_job(&store);

    let mut note = notes.create(&job, "line one\n", "Todo").unwrap();
    clock.advance(5_000);
    notes.update(&mut note, "line one\nline two\n", " Todo list ").unwrap();
    notes.set_color(&mut note, 6).unwrap();

    let stored = notes.get(note.id).unwrap();
    assert_eq!(stored.content, "line one\nline two\n");
    assert_eq!(stored.summary, "Todo list");
    assert_eq!(stored.color_index, 6);
    assert_eq!(stored.color_name(), "pink");
    assert_eq!(stored.creation_date, START);
}

#[test]
fn out_of_range_color_is_rejected_before_mutation() {
    let store = MemoryWorkStore::new();
    let clock = FixedClock::new(START);
    let notes = NoteBoard::new(&store, &clock);
    let job = seeded_job(&store);
    let mut note = notes.create(&job, "body", "summary").unwrap();

    for bad in [-1, i64::from(NOTE_PALETTE_SIZE), 300] {
        let err = notes.set_color(&mut note, bad).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::ColorIndexOutOfRange { .. })
        ));
    }
    assert_eq!(note.color_index, 0);
    assert_eq!(notes.get(note.id).unwrap().color_index, 0);
}
