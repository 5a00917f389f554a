//! End-to-end editing against a real notes file.

use chrono::Utc;
use jotmark::editor::{EditInput, SurfaceKind};
use jotmark::persist::{JsonFileStore, NoteStore, load_or_welcome};
use jotmark::session::Session;

fn type_str(session: &mut Session, s: &str, now_ms: u64) {
    for ch in s.chars() {
        session.input(EditInput::Char(ch), now_ms);
    }
}

#[test]
fn test_first_launch_then_edit_then_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("notes.json"));

    let notes = load_or_welcome(&store, Utc::now()).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, "welcome");

    let mut session = Session::open(notes[0].clone(), SurfaceKind::Blocks, 1000);
    session.input(EditInput::End, 0);
    session.input(EditInput::Enter, 0);
    type_str(&mut session, "[] ", 0);
    type_str(&mut session, "buy milk", 0);
    assert!(session.tick(999, &store).is_none());
    session.tick(1000, &store).unwrap().unwrap();

    let reopened = store.load_all().unwrap();
    assert_eq!(reopened.len(), 1);
    assert!(
        reopened[0].content.starts_with("# Welcome to jotmark\n- [ ] buy milk\n"),
        "content: {}",
        reopened[0].content
    );

    let session = Session::open(reopened[0].clone(), SurfaceKind::Flat, 1000);
    assert_eq!(session.view()[1].text, "- [ ] buy milk");
}

#[test]
fn test_both_surfaces_write_identical_text() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("notes.json"));
    let note = jotmark::persist::Note {
        id: "n".to_string(),
        ..jotmark::persist::Note::default()
    };

    let mut blocks = Session::open(note.clone(), SurfaceKind::Blocks, 0);
    type_str(&mut blocks, "# Title", 0);
    blocks.input(EditInput::Enter, 0);
    type_str(&mut blocks, "1. one", 0);

    let mut flat = Session::open(note, SurfaceKind::Flat, 0);
    type_str(&mut flat, "# Title", 0);
    flat.input(EditInput::Enter, 0);
    type_str(&mut flat, "1. one", 0);

    assert_eq!(blocks.note().content, "# Title\n1. one");
    assert_eq!(flat.note().content, blocks.note().content);

    flat.teardown(&store).unwrap().unwrap();
    assert_eq!(store.load_all().unwrap()[0].content, "# Title\n1. one");
}
