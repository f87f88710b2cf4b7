use deskpad_core::store::{CREDENTIAL_KEY, NOTES_KEY, TASKS_KEY};
use deskpad_core::{FileStore, KeyValueStore, MemoryStore, Note, Task, Workspace};

fn persisted_tasks<S: KeyValueStore>(ws: &Workspace<S>) -> Vec<Task> {
    let raw = ws.store().get(TASKS_KEY).unwrap().unwrap_or_else(|| "[]".to_string());
    serde_json::from_str(&raw).unwrap()
}

fn persisted_notes<S: KeyValueStore>(ws: &Workspace<S>) -> Vec<Note> {
    let raw = ws.store().get(NOTES_KEY).unwrap().unwrap_or_else(|| "[]".to_string());
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn task_mutations_stay_in_lockstep_with_store() {
    let mut ws = Workspace::load(MemoryStore::new(), None).unwrap();

    let steps: Vec<Box<dyn Fn(&mut Workspace<MemoryStore>) -> bool>> = vec![
        Box::new(|ws| ws.add_task("Buy milk").unwrap()),
        Box::new(|ws| ws.add_task("Walk dog").unwrap()),
        Box::new(|ws| ws.add_task("   ").unwrap()),
        Box::new(|ws| ws.toggle_task(1).unwrap()),
        Box::new(|ws| ws.add_task("Pay bills").unwrap()),
        Box::new(|ws| ws.remove_task(0).unwrap()),
        Box::new(|ws| ws.toggle_task(9).unwrap()),
        Box::new(|ws| ws.toggle_task(0).unwrap()),
        Box::new(|ws| ws.remove_task(5).unwrap()),
    ];
    let expected_changes = [true, true, false, true, true, true, false, true, false];

    for (step, expected) in steps.iter().zip(expected_changes) {
        assert_eq!(step(&mut ws), expected);
        assert_eq!(persisted_tasks(&ws), ws.tasks().as_slice());
    }

    let texts: Vec<&str> = ws.tasks().as_slice().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["Walk dog", "Pay bills"]);
    assert!(!ws.tasks().get(0).unwrap().completed);
}

#[test]
fn rejected_input_does_not_write() {
    let mut ws = Workspace::load(MemoryStore::new(), None).unwrap();
    assert!(!ws.add_task("  \t ").unwrap());
    assert!(!ws.add_note("title", "").unwrap());
    assert!(ws.store().get(TASKS_KEY).unwrap().is_none());
    assert!(ws.store().get(NOTES_KEY).unwrap().is_none());
}

#[test]
fn note_mutations_stay_in_lockstep_with_store() {
    let mut ws = Workspace::load(MemoryStore::new(), None).unwrap();
    assert!(ws.add_note("Groceries", "eggs").unwrap());
    assert_eq!(persisted_notes(&ws), ws.notes().as_slice());
    assert!(ws.add_note("Ideas", "a terminal dashboard").unwrap());
    assert_eq!(persisted_notes(&ws), ws.notes().as_slice());
    assert!(ws.remove_note(0).unwrap());
    assert_eq!(persisted_notes(&ws), ws.notes().as_slice());
    assert_eq!(ws.notes().get(0).unwrap().title, "Ideas");
}

#[test]
fn state_survives_reopen_from_disk() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = FileStore::open(dir.path()).unwrap();
        let mut ws = Workspace::load(store, None).unwrap();
        ws.add_task("Buy milk").unwrap();
        ws.add_task("Walk dog").unwrap();
        ws.toggle_task(1).unwrap();
        ws.add_note("Trip", "Pack the tent").unwrap();
        ws.save_credential("  secret-key  ").unwrap();
    }

    let store = FileStore::open(dir.path()).unwrap();
    assert_eq!(store.get(CREDENTIAL_KEY).unwrap().as_deref(), Some("secret-key"));

    let ws = Workspace::load(store, None).unwrap();
    assert_eq!(ws.tasks().len(), 2);
    assert!(ws.tasks().get(1).unwrap().completed);
    assert_eq!(ws.notes().get(0).unwrap().content, "Pack the tent");
    assert_eq!(ws.credential(), Some("secret-key"));
    // a stored key means the chat opens with a greeting
    assert_eq!(ws.chat().messages().len(), 1);
}

#[test]
fn fallback_credential_is_not_persisted() {
    let ws = Workspace::load(MemoryStore::new(), Some("from-env".to_string())).unwrap();
    assert_eq!(ws.credential(), Some("from-env"));
    assert!(!ws.has_stored_credential());
    assert!(ws.store().get(CREDENTIAL_KEY).unwrap().is_none());
}

#[test]
fn saved_credential_takes_precedence_over_fallback() {
    let mut ws = Workspace::load(MemoryStore::new(), Some("from-env".to_string())).unwrap();
    assert!(!ws.save_credential("   ").unwrap());
    assert!(ws.save_credential("typed-key").unwrap());
    assert_eq!(ws.credential(), Some("typed-key"));
}

#[test]
fn no_credential_means_no_greeting() {
    let ws = Workspace::load(MemoryStore::new(), None).unwrap();
    assert!(ws.chat().messages().is_empty());
    assert_eq!(ws.credential(), None);
}

/// Serves whatever it was seeded with but refuses every write.
struct ReadOnlyStore {
    inner: MemoryStore,
}

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("disk full while writing {}", key)
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        anyhow::bail!("disk full while removing {}", key)
    }
}

#[test]
fn failed_write_leaves_memory_unchanged() {
    let mut seeded = MemoryStore::new();
    seeded
        .set(
            TASKS_KEY,
            r#"[{"text":"Buy milk","completed":false,"date":"2024-01-05T10:00:00.000Z"}]"#,
        )
        .unwrap();
    seeded
        .set(
            NOTES_KEY,
            r#"[{"title":"Trip","content":"Pack","date":"2024-01-05T10:00:00.000Z"}]"#,
        )
        .unwrap();
    let mut ws = Workspace::load(ReadOnlyStore { inner: seeded }, None).unwrap();
    let tasks_before = ws.tasks().as_slice().to_vec();
    let notes_before = ws.notes().as_slice().to_vec();

    assert!(ws.add_task("Walk dog").is_err());
    assert!(ws.toggle_task(0).is_err());
    assert!(ws.remove_task(0).is_err());
    assert_eq!(ws.tasks().as_slice(), tasks_before.as_slice());
    assert_eq!(persisted_tasks(&ws), ws.tasks().as_slice());

    assert!(ws.add_note("Ideas", "dashboard").is_err());
    assert!(ws.remove_note(0).is_err());
    assert_eq!(ws.notes().as_slice(), notes_before.as_slice());
    assert_eq!(persisted_notes(&ws), ws.notes().as_slice());

    assert!(ws.save_credential("key").is_err());
    assert_eq!(ws.credential(), None);
    assert!(ws.chat().messages().is_empty());
}

#[test]
fn undecodable_record_does_not_wipe_the_rest() {
    let mut store = MemoryStore::new();
    store
        .set(
            TASKS_KEY,
            r#"[{"text":"Keep me","completed":false,"date":"2024-01-05T10:00:00.000Z"},
                {"text":"legacy","completed":false},
                {"date":"2024-01-05T10:00:00.000Z"}]"#,
        )
        .unwrap();

    let mut ws = Workspace::load(store, None).unwrap();
    assert_eq!(ws.tasks().len(), 2);
    assert!(ws.add_task("New").unwrap());

    let texts: Vec<String> = persisted_tasks(&ws).into_iter().map(|t| t.text).collect();
    assert_eq!(texts, vec!["Keep me", "legacy", "New"]);
}

#[test]
fn env_only_credential_does_not_greet() {
    let ws = Workspace::load(MemoryStore::new(), Some("from-env".to_string())).unwrap();
    assert_eq!(ws.credential(), Some("from-env"));
    assert!(ws.chat().messages().is_empty());
}
