use todoli_core::{decode_tasks, encode_tasks, FileListStore, ListRepository, Task, TodoList};

// Layout written by earlier desktop releases: BOM, CRLF, self-closing tasks.
const LEGACY_FILE: &[u8] = b"\xEF\xBB\xBF<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n<tasks>\r\n\t<task title=\"Milk\" description=\"-/-\" />\r\n\t<task title=\"Eggs\" description=\"2 dozen\" />\r\n</tasks>";

#[test]
fn legacy_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Groceries.xml"), LEGACY_FILE).unwrap();
    let store = FileListStore::open(dir.path()).unwrap();

    let list = TodoList::open(store, "Groceries");
    assert_eq!(list.len(), 2);
    assert_eq!(list.task(0).unwrap().title(), "Milk");
    assert_eq!(list.task(1).unwrap().description(), "2 dozen");
}

#[test]
fn saved_file_matches_expected_layout() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileListStore::open(dir.path()).unwrap();

    let mut list = TodoList::open(store.clone(), "Groceries");
    list.add_task("Milk", "").unwrap();
    list.add_task("Eggs", "2 dozen").unwrap();
    list.save().unwrap();

    let text = std::fs::read_to_string(store.path_for("Groceries")).unwrap();
    let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
                    <tasks>\n\
                    \t<task title=\"Milk\" description=\"-/-\"/>\n\
                    \t<task title=\"Eggs\" description=\"2 dozen\"/>\n\
                    </tasks>\n";
    assert_eq!(text, expected);
}

#[test]
fn save_leaves_no_temp_files_behind() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileListStore::open(dir.path()).unwrap();

    let mut list = TodoList::open(store.clone(), "a");
    list.add_task("x", "").unwrap();
    list.save().unwrap();
    list.add_task("y", "").unwrap();
    list.save().unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["a.xml".to_string()]);
    assert_eq!(decode_tasks(&store.read("a").unwrap().unwrap()).unwrap().len(), 2);
}

#[test]
fn unicode_content_roundtrips() {
    let tasks = vec![
        Task::new("Brötchen holen", "für Sonntag").unwrap(),
        Task::new("寿司", "🍣 x3").unwrap(),
    ];
    let bytes = encode_tasks(&tasks).unwrap();
    assert_eq!(decode_tasks(&bytes).unwrap(), tasks);
}
