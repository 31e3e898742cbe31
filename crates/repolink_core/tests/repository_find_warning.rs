use log::{Level, LevelFilter, Log, Metadata, Record};
use repolink_core::db::open_db_in_memory;
use repolink_core::{RepositoryCreate, RepositoryFind, RepositoryStore, SqliteRepositoryStore};
use std::sync::Mutex;

static CAPTURED: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        CAPTURED
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

fn create_for(project_id: i64) -> RepositoryCreate {
    RepositoryCreate {
        creator_id: 1,
        vcs_id: 10,
        project_id,
        name: format!("repo-{project_id}"),
        full_path: format!("org/repo-{project_id}"),
        web_url: format!("https://git/org/repo-{project_id}"),
        base_directory: String::new(),
        branch_filter: String::new(),
        external_id: format!("ext-{project_id}"),
        webhook_id: format!("wh-{project_id}"),
    }
}

fn repo_find_warnings() -> Vec<String> {
    CAPTURED
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, message)| *level == Level::Warn && message.contains("event=repo_find"))
        .map(|(_, message)| message.clone())
        .collect()
}

// Single test in this binary: the logger is process-global.
#[test]
fn find_one_warns_once_when_several_rows_match() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO principal (id, name, email) VALUES (1, 'Alice', 'alice@example.com');
         INSERT INTO vcs (id, name, type, instance_url, api_url)
             VALUES (10, 'GitLab', 'GITLAB_SELF_HOST', 'https://git', 'https://git/api/v4');
         INSERT INTO project (id, name, key) VALUES (5, 'Project A', 'PA'), (6, 'Project B', 'PB');",
    )
    .unwrap();
    let store = SqliteRepositoryStore::try_new(&conn).unwrap();
    let first = store.create_repository(&create_for(5)).unwrap();

    store.find_repository(&RepositoryFind::by_vcs(10)).unwrap();
    assert!(repo_find_warnings().is_empty());

    store.create_repository(&create_for(6)).unwrap();
    let found = store.find_repository(&RepositoryFind::by_vcs(10)).unwrap();
    assert_eq!(found.id, first.id);

    let warnings = repo_find_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("matched=2"));
    assert!(warnings[0].contains("find={vcs_id=10}"));
}
