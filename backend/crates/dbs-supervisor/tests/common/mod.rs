#![allow(dead_code)]

use dbs_config::Config;
use dbs_supervisor::{MARKER_FILENAME, Server, TraceLevel, TraceOrigin, TraceSink};

use std::fmt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tokio::time::{Duration, Instant, sleep};

pub const READY_LINE: &str = "ready for connections";

/// Bootstraps by copying stdin into `stdin.sql`; serves by announcing
/// readiness and sleeping until signalled.
pub const WELL_BEHAVED_DATABASE: &str = r#"
echo launched >> "$DIR/launched"
echo "$@" > "$DIR/args"
case " $* " in
  *" --bootstrap "*)
    /bin/cat > "$DIR/stdin.sql"
    echo "bootstrap done" >&2
    exit 0
    ;;
esac
echo "ready for connections" >&2
exec /bin/sleep 30
"#;

/// Reads its input, then exits with a failure status.
pub const FAILING_BOOTSTRAP: &str = r#"
echo launched >> "$DIR/launched"
/bin/cat > /dev/null
echo "bootstrap error" >&2
exit 3
"#;

/// Ignores SIGTERM once it is ready.
pub const STUBBORN_DATABASE: &str = r#"
trap '' TERM
echo "ready for connections" >&2
exec /bin/sleep 30
"#;

#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(TraceLevel, TraceOrigin, String)>>,
}

impl RecordingSink {
    pub fn supervisor_messages(&self) -> Vec<String> {
        self.filtered(|_, origin| origin == TraceOrigin::Supervisor)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.filtered(|level, _| level == TraceLevel::Warning)
    }

    pub fn child_lines(&self) -> Vec<String> {
        self.filtered(|_, origin| origin == TraceOrigin::Child)
    }

    fn filtered(&self, keep: impl Fn(TraceLevel, TraceOrigin) -> bool) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, origin, _)| keep(*level, *origin))
            .map(|(_, _, message)| message.clone())
            .collect()
    }

    /// Poll until the child has printed `line` or fail after five seconds.
    pub async fn wait_for_child_line(&self, line: &str) {
        let expected = format!(">>  {line}");
        let deadline = Instant::now() + Duration::from_secs(5);

        while !self.child_lines().contains(&expected) {
            assert!(
                Instant::now() < deadline,
                "child never printed {line:?}; got {:?}",
                self.child_lines()
            );
            sleep(Duration::from_millis(20)).await;
        }
    }
}

impl TraceSink for RecordingSink {
    fn emit(&self, level: TraceLevel, origin: TraceOrigin, message: fmt::Arguments<'_>) {
        self.entries
            .lock()
            .unwrap()
            .push((level, origin, message.to_string()));
    }
}

/// Temporary installation with a shell script standing in for the database.
pub struct TestInstance {
    pub dir: TempDir,
    pub config: Config,
}

impl TestInstance {
    pub fn new(database_script: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        std::fs::create_dir(root.join("data")).unwrap();
        std::fs::create_dir(root.join("tmp")).unwrap();

        let executable = root.join("mysqld");
        // The child environment is cleared, so the script learns its
        // directory from this assignment.
        let script = format!("#!/bin/sh\nDIR='{}'\n{database_script}", root.display());
        std::fs::write(&executable, script).unwrap();
        std::fs::set_permissions(&executable, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = Config::default();
        config.paths.executable = executable;
        config.paths.package_base = root.to_path_buf();
        config.paths.charsets = root.join("charsets");
        config.paths.plugins = root.join("plugins");
        config.paths.databases = root.join("data");
        config.paths.temporary = root.join("tmp");
        config.paths.socket = root.join("mysqld.sock");
        config.paths.pid = root.join("mysqld.pid");
        config.network.port = 13306;
        config.administrator.password = "secret".to_string();

        Self { dir, config }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.config.paths.databases.join(MARKER_FILENAME)
    }

    pub fn marker_content(&self) -> Vec<u8> {
        std::fs::read(self.marker_path()).unwrap()
    }

    /// Number of times the fake database was started.
    pub fn launches(&self) -> usize {
        read_or_empty(&self.path("launched")).lines().count()
    }

    pub fn write_script(&mut self, name: &str, content: &str) {
        let path = self.path(name);
        std::fs::write(&path, content).unwrap();
        self.config.bootstrap.scripts.push(path);
    }

    pub fn server(&self) -> (Server, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let server = Server::create(Arc::new(self.config.clone()), sink.clone()).unwrap();
        (server, sink)
    }
}

pub fn read_or_empty(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
