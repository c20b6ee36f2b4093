//! Command lines for the database executable and child process creation.

use crate::{ServerError, ServerResult};

use std::ffi::OsString;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use dbs_config::Config;
use error_location::ErrorLocation;
use tokio::process::{Child, Command};
use tracing::debug;

/// Which flavour of process to launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchIntent {
    /// Administrative one-shot run that reads SQL from stdin and exits
    Bootstrap,
    /// Long-running server listening on the configured endpoint
    Normal,
}

/// Everything needed to start the child, derived only from configuration
/// and intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub intent: LaunchIntent,
    pub executable: PathBuf,
    /// Arguments after argv[0]
    pub arguments: Vec<OsString>,
    /// Complete child environment; nothing is inherited
    pub environment: Vec<(OsString, OsString)>,
    pub working_directory: PathBuf,
}

impl LaunchPlan {
    pub fn for_intent(intent: LaunchIntent, config: &Config) -> Self {
        let mut plan = Self::generic(intent, config);

        match intent {
            LaunchIntent::Bootstrap => {
                plan.push("--bootstrap");
                plan.push("--skip-grant");
                plan.push("--skip-networking");
                plan.push("--one-thread");
            }
            LaunchIntent::Normal => {
                plan.push(format!("--bind-address={}", config.network.ip));
                plan.push(format!("--port={}", config.network.port));
                plan.push("--extra-port=0");
                plan.push("--skip-ssl");
                plan.push("--skip-name-resolve");
                plan.push("--skip-host-cache");
            }
        }

        plan
    }

    pub fn bootstrap(config: &Config) -> Self {
        Self::for_intent(LaunchIntent::Bootstrap, config)
    }

    pub fn normal(config: &Config) -> Self {
        Self::for_intent(LaunchIntent::Normal, config)
    }

    fn generic(intent: LaunchIntent, config: &Config) -> Self {
        let paths = &config.paths;

        let mut plan = Self {
            intent,
            executable: paths.executable.clone(),
            arguments: Vec::with_capacity(24),
            environment: Vec::new(),
            working_directory: paths.temporary.clone(),
        };

        plan.push("--no-defaults");

        plan.push_path("--basedir=", &paths.package_base);
        plan.push_path("--character-sets-dir=", &paths.charsets);
        plan.push_path("--plugin-dir=", &paths.plugins);
        plan.push_path("--datadir=", &paths.databases);
        plan.push_path("--tmpdir=", &paths.temporary);
        plan.push_path("--socket=", &paths.socket);
        plan.push_path("--pid-file=", &paths.pid);

        plan.push("--memlock");
        plan.push("--console");
        plan.push("--log-warnings");

        plan
    }

    fn push(&mut self, argument: impl Into<OsString>) {
        self.arguments.push(argument.into());
    }

    fn push_path(&mut self, flag: &str, path: &Path) {
        let mut argument = OsString::from(flag);
        argument.push(path.as_os_str());
        self.arguments.push(argument);
    }

    /// Arguments rendered for logging.
    pub fn display_arguments(&self) -> Vec<String> {
        self.arguments
            .iter()
            .map(|argument| argument.to_string_lossy().into_owned())
            .collect()
    }

    fn command(&self, stdin: Stdio) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .args(&self.arguments)
            .env_clear()
            .envs(
                self.environment
                    .iter()
                    .map(|(key, value)| (key.as_os_str(), value.as_os_str())),
            )
            .current_dir(&self.working_directory)
            .stdin(stdin)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(false);

        #[cfg(target_os = "linux")]
        {
            use nix::errno::Errno;
            use nix::sys::prctl;
            use nix::sys::signal::Signal;
            use nix::unistd::{getpid, getppid};

            let supervisor = getpid();
            unsafe {
                command.pre_exec(move || {
                    prctl::set_pdeathsig(Signal::SIGTERM)?;
                    // The supervisor may have died before the signal was armed.
                    if getppid() != supervisor {
                        return Err(Errno::ESRCH.into());
                    }
                    Ok(())
                });
            }
        }

        command
    }

    /// Start the child with its console (stderr) piped and SIGTERM armed as
    /// its parent-death signal.
    #[track_caller]
    pub(crate) fn spawn(&self, stdin: Stdio) -> ServerResult<Child> {
        debug!(
            executable = %self.executable.display(),
            intent = ?self.intent,
            "spawning database process"
        );

        self.command(stdin)
            .spawn()
            .map_err(|source| ServerError::LaunchFailure {
                executable: self.executable.clone(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
