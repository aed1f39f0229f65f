use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use rax_davfs::middleware::{AuditEvent, AuditSink};
use rax_davfs::{
    AuthInfo, FileSystemProvider, LoggingConfig, OpenFlags, Permission, ServerConfig,
    StorageError, UserDir, UserPolicy,
};
use tempfile::TempDir;

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

struct Fixture {
    root: TempDir,
    dir: UserDir,
    sink: Arc<RecordingSink>,
}

impl Fixture {
    fn new(build: impl FnOnce(ServerConfig) -> ServerConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let root = TempDir::new().unwrap();
        let config = build(ServerConfig::new(root.path()));
        config.validate().unwrap();
        let sink = Arc::new(RecordingSink::default());
        let dir = UserDir::with_audit_sink(Arc::new(config), sink.clone());
        dir.prepare().unwrap();
        Self { root, dir, sink }
    }

    fn open_access() -> Self {
        Self::new(|config| config)
    }

    fn path(&self, relative: &str) -> std::path::PathBuf {
        self.root.path().join(relative)
    }

    fn write_file(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

fn read_all(mut file: fs::File) -> String {
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();
    contents
}

fn create_flags() -> OpenFlags {
    OpenFlags::write_only()
        .with(OpenFlags::CREAT)
        .with(OpenFlags::TRUNC)
}

fn assert_denied<T: std::fmt::Debug>(result: Result<T, StorageError>) {
    assert!(
        matches!(result, Err(StorageError::PermissionDenied(_))),
        "expected PermissionDenied, got {result:?}"
    );
}

fn assert_invalid<T: std::fmt::Debug>(result: Result<T, StorageError>) {
    assert!(
        matches!(result, Err(StorageError::InvalidOperation(_))),
        "expected InvalidOperation, got {result:?}"
    );
}

fn assert_not_found<T: std::fmt::Debug>(result: Result<T, StorageError>) {
    assert!(
        matches!(result, Err(StorageError::NotFound(_))),
        "expected NotFound, got {result:?}"
    );
}

#[test]
fn anonymous_reads_file_in_open_access_mode() {
    let fx = Fixture::open_access();
    fx.write_file("a/b.txt", "hello");

    let anonymous = AuthInfo::anonymous();
    assert_eq!(fx.dir.resolve(&anonymous, "/a/b.txt").unwrap(), fx.path("a/b.txt"));

    let file = fx
        .dir
        .open(&anonymous, "/a/b.txt", OpenFlags::read_only(), 0)
        .unwrap();
    assert_eq!(read_all(file), "hello");
}

#[test]
fn open_access_allows_every_operation_for_anonymous() {
    let fx = Fixture::open_access();
    let anonymous = AuthInfo::anonymous();

    fx.dir.make_directory(&anonymous, "/docs", DIR_MODE).unwrap();
    let mut file = fx
        .dir
        .open(&anonymous, "/docs/note.txt", create_flags(), FILE_MODE)
        .unwrap();
    file.write_all(b"draft").unwrap();
    drop(file);

    let stat = fx.dir.stat(&anonymous, "/docs/note.txt").unwrap();
    assert_eq!(stat.name, "note.txt");
    assert_eq!(stat.size, 5);
    assert!(!stat.is_dir);

    fx.dir
        .rename(&anonymous, "/docs/note.txt", "/docs/final.txt")
        .unwrap();
    assert!(fx.path("docs/final.txt").is_file());

    fx.dir.remove_all(&anonymous, "/docs").unwrap();
    assert!(!fx.path("docs").exists());
}

#[test]
fn configured_users_lock_out_anonymous() {
    let fx = Fixture::new(|config| config.with_user("bob", UserPolicy::default()));
    fx.write_file("x", "secret");
    let anonymous = AuthInfo::anonymous();

    assert_denied(fx.dir.make_directory(&anonymous, "/new", DIR_MODE));
    assert_denied(fx.dir.open(&anonymous, "/x", OpenFlags::read_only(), 0));
    assert_denied(fx.dir.open(&anonymous, "/y", create_flags(), FILE_MODE));
    assert_denied(fx.dir.stat(&anonymous, "/x"));
    assert_denied(fx.dir.rename(&anonymous, "/x", "/z"));
    assert_denied(fx.dir.remove_all(&anonymous, "/x"));

    assert!(fx.path("x").is_file());
    assert!(!fx.path("new").exists());
    assert!(!fx.path("y").exists());
}

#[test]
fn write_denied_user_cannot_create_but_can_read_list_delete() {
    let fx = Fixture::new(|config| {
        config.with_user(
            "alice",
            UserPolicy::default()
                .with_subdirectory("alice-home")
                .with_write(Permission::Deny),
        )
    });
    let alice = AuthInfo::user("alice");

    assert_eq!(
        fx.dir.resolve(&alice, "/new").unwrap(),
        fx.path("alice-home/new")
    );
    assert_denied(fx.dir.make_directory(&alice, "/new", DIR_MODE));
    assert!(!fx.path("alice-home/new").exists());

    fx.write_file("alice-home/report.txt", "numbers");
    let file = fx
        .dir
        .open(&alice, "/report.txt", OpenFlags::read_only(), 0)
        .unwrap();
    assert_eq!(read_all(file), "numbers");
    assert!(fx.dir.stat(&alice, "/report.txt").is_ok());

    assert_denied(fx.dir.open(&alice, "/report.txt", OpenFlags::read_write(), 0));
    assert_denied(fx.dir.open(&alice, "/other.txt", create_flags(), FILE_MODE));
    assert_denied(fx.dir.rename(&alice, "/report.txt", "/renamed.txt"));

    fx.dir.remove_all(&alice, "/report.txt").unwrap();
    assert!(!fx.path("alice-home/report.txt").exists());
}

#[test]
fn explicit_policy_with_unset_flags_allows_stat() {
    let fx = Fixture::new(|config| config.with_user("bob", UserPolicy::default()));
    fx.write_file("x", "");

    let stat = fx.dir.stat(&AuthInfo::user("bob"), "/x").unwrap();
    assert_eq!(stat.name, "x");
    assert_eq!(stat.size, 0);
}

#[test]
fn authenticated_user_without_policy_gets_full_access() {
    let fx = Fixture::new(|config| {
        config.with_user("bob", UserPolicy::default().with_write(Permission::Deny))
    });
    let carol = AuthInfo::user("carol");

    fx.dir.make_directory(&carol, "/carol", DIR_MODE).unwrap();
    assert!(fx.path("carol").is_dir());
    fx.dir.remove_all(&carol, "/carol").unwrap();
}

#[test]
fn root_cannot_be_removed_or_renamed() {
    let fx = Fixture::new(|config| {
        config.with_user(
            "admin",
            UserPolicy::default()
                .with_delete(Permission::Allow)
                .with_write(Permission::Allow),
        )
    });
    fx.write_file("keep.txt", "");
    let admin = AuthInfo::user("admin");

    assert_invalid(fx.dir.remove_all(&admin, "/"));
    assert_invalid(fx.dir.remove_all(&admin, ""));
    assert_invalid(fx.dir.remove_all(&admin, "/a/../.."));
    assert_invalid(fx.dir.rename(&admin, "/", "/moved"));
    assert_invalid(fx.dir.rename(&admin, "/keep.txt", "/"));

    assert!(fx.root.path().is_dir());
    assert!(fx.path("keep.txt").is_file());
}

#[test]
fn root_protection_precedes_delete_permission() {
    let fx = Fixture::new(|config| {
        config.with_user("eve", UserPolicy::default().with_delete(Permission::Deny))
    });
    assert_invalid(fx.dir.remove_all(&AuthInfo::user("eve"), "/"));
}

#[test]
fn user_home_can_be_removed_but_root_cannot() {
    let fx = Fixture::new(|config| {
        config
            .with_user("alice", UserPolicy::default().with_subdirectory("alice-home"))
            .with_user("bob", UserPolicy::default())
    });
    fx.write_file("alice-home/notes.txt", "todo");

    fx.dir.remove_all(&AuthInfo::user("alice"), "/").unwrap();
    assert!(!fx.path("alice-home").exists());

    assert_invalid(fx.dir.remove_all(&AuthInfo::user("bob"), "/"));
    assert_invalid(fx.dir.rename(&AuthInfo::user("bob"), "/", "/elsewhere"));
    assert!(fx.root.path().is_dir());
}

#[test]
fn reading_a_directory_requires_list() {
    let fx = Fixture::new(|config| {
        config.with_user("carol", UserPolicy::default().with_list(Permission::Deny))
    });
    fx.write_file("dir/file.txt", "content");
    let carol = AuthInfo::user("carol");

    assert_denied(fx.dir.open(&carol, "/dir", OpenFlags::read_only(), 0));
    assert_denied(fx.dir.stat(&carol, "/dir/file.txt"));

    let file = fx
        .dir
        .open(&carol, "/dir/file.txt", OpenFlags::read_only(), 0)
        .unwrap();
    assert_eq!(read_all(file), "content");
}

#[test]
fn write_only_open_skips_read_check() {
    let fx = Fixture::new(|config| {
        config.with_user("dave", UserPolicy::default().with_read(Permission::Deny))
    });
    fx.write_file("log.txt", "");
    let dave = AuthInfo::user("dave");

    assert_denied(fx.dir.open(&dave, "/log.txt", OpenFlags::read_only(), 0));
    assert_denied(fx.dir.open(&dave, "/log.txt", OpenFlags::read_write(), 0));

    let mut file = fx
        .dir
        .open(
            &dave,
            "/log.txt",
            OpenFlags::write_only().with(OpenFlags::APPEND),
            0,
        )
        .unwrap();
    file.write_all(b"entry\n").unwrap();
    drop(file);
    assert_eq!(fs::read_to_string(fx.path("log.txt")).unwrap(), "entry\n");
}

#[test]
fn null_byte_is_not_found_everywhere() {
    let fx = Fixture::open_access();
    let anonymous = AuthInfo::anonymous();

    assert_not_found(fx.dir.make_directory(&anonymous, "/a\0", DIR_MODE));
    assert_not_found(fx.dir.open(&anonymous, "/a\0", OpenFlags::read_only(), 0));
    assert_not_found(fx.dir.remove_all(&anonymous, "/a\0"));
    assert_not_found(fx.dir.rename(&anonymous, "/a\0", "/b"));
    assert_not_found(fx.dir.rename(&anonymous, "/a", "/b\0"));
    assert_not_found(fx.dir.stat(&anonymous, "\0"));
}

#[test]
fn traversal_stays_inside_root() {
    let fx = Fixture::open_access();
    let anonymous = AuthInfo::anonymous();

    fx.dir
        .make_directory(&anonymous, "/../../escape", DIR_MODE)
        .unwrap();
    assert!(fx.path("escape").is_dir());

    let resolved = fx.dir.resolve(&anonymous, "../../../etc/passwd").unwrap();
    assert!(resolved.starts_with(fx.root.path()));
}

#[test]
fn filesystem_errors_pass_through() {
    let fx = Fixture::open_access();
    let anonymous = AuthInfo::anonymous();

    fx.dir.make_directory(&anonymous, "/dup", DIR_MODE).unwrap();
    match fx.dir.make_directory(&anonymous, "/dup", DIR_MODE) {
        Err(StorageError::IoError(e)) => assert_eq!(e.kind(), std::io::ErrorKind::AlreadyExists),
        other => panic!("expected AlreadyExists, got {other:?}"),
    }

    let missing = fx.dir.stat(&anonymous, "/missing").unwrap_err();
    assert!(matches!(missing, StorageError::IoError(_)));
    assert!(missing.is_not_found());

    let exclusive = OpenFlags::write_only()
        .with(OpenFlags::CREAT)
        .with(OpenFlags::EXCL);
    fx.dir.open(&anonymous, "/once", exclusive, FILE_MODE).unwrap();
    assert!(matches!(
        fx.dir.open(&anonymous, "/once", exclusive, FILE_MODE),
        Err(StorageError::IoError(_))
    ));
}

#[test]
fn removing_a_missing_path_succeeds() {
    let fx = Fixture::open_access();
    fx.dir
        .remove_all(&AuthInfo::anonymous(), "/never/existed")
        .unwrap();
}

#[test]
fn stat_of_root_is_named_slash() {
    let fx = Fixture::open_access();
    let stat = fx.dir.stat(&AuthInfo::anonymous(), "/").unwrap();
    assert_eq!(stat.name, "/");
    assert!(stat.is_dir);
    assert_eq!(stat.size, 0);
}

#[test]
fn prepare_creates_user_homes() {
    let fx = Fixture::new(|config| {
        config
            .with_user("alice", UserPolicy::default().with_subdirectory("homes/alice"))
            .with_user("bob", UserPolicy::default())
    });
    assert!(fx.path("homes/alice").is_dir());
    // idempotent
    fx.dir.prepare().unwrap();
}

#[test]
fn audit_records_follow_toggles() {
    let fx = Fixture::new(|config| config.with_logging(LoggingConfig::all()));
    let anonymous = AuthInfo::anonymous();

    fx.dir.make_directory(&anonymous, "/d", DIR_MODE).unwrap();
    fx.dir
        .open(&anonymous, "/d/f", create_flags(), FILE_MODE)
        .unwrap();
    fx.dir
        .open(&anonymous, "/d/f", OpenFlags::read_only(), 0)
        .unwrap();
    fx.dir.rename(&anonymous, "/d/f", "/d/g").unwrap();
    fx.dir.remove_all(&anonymous, "/d").unwrap();
    fx.dir.stat(&anonymous, "/").unwrap();

    let user = "anonymous".to_string();
    assert_eq!(
        fx.sink.events(),
        vec![
            AuditEvent::Created {
                path: fx.path("d"),
                user: user.clone(),
            },
            AuditEvent::Read {
                path: fx.path("d/f"),
                user: user.clone(),
            },
            AuditEvent::Renamed {
                from: fx.path("d/f"),
                to: fx.path("d/g"),
                user: user.clone(),
            },
            AuditEvent::Deleted {
                path: fx.path("d"),
                user,
            },
        ]
    );
}

#[test]
fn audit_disabled_and_failures_record_nothing() {
    let fx = Fixture::new(|config| {
        config
            .with_user("alice", UserPolicy::default().with_write(Permission::Deny))
            .with_logging(LoggingConfig {
                on_create: true,
                ..LoggingConfig::default()
            })
    });
    let alice = AuthInfo::user("alice");
    fx.write_file("f", "");

    assert_denied(fx.dir.make_directory(&alice, "/d", DIR_MODE));
    fx.dir.open(&alice, "/f", OpenFlags::read_only(), 0).unwrap();
    fx.dir.remove_all(&alice, "/f").unwrap();

    assert!(fx.sink.events().is_empty());
}

#[test]
fn audit_names_the_authenticated_user() {
    let fx = Fixture::new(|config| {
        config
            .with_user("alice", UserPolicy::default().with_subdirectory("alice-home"))
            .with_logging(LoggingConfig::all())
    });
    fx.dir
        .make_directory(&AuthInfo::user("alice"), "/projects", DIR_MODE)
        .unwrap();

    let events = fx.sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].user(), "alice");
    assert_eq!(
        events[0],
        AuditEvent::Created {
            path: fx.path("alice-home/projects"),
            user: "alice".into(),
        }
    );
}

#[cfg(unix)]
#[test]
fn directory_mode_is_applied() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::open_access();
    fx.dir
        .make_directory(&AuthInfo::anonymous(), "/private", 0o700)
        .unwrap();
    let mode = fs::metadata(fx.path("private")).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o700);
}

#[test]
fn paths_are_compared_lexically() {
    let fx = Fixture::open_access();
    let resolved = fx.dir.resolve(&AuthInfo::anonymous(), "/a/./b/../c").unwrap();
    assert_eq!(resolved, fx.root.path().join(Path::new("a/c")));
}
