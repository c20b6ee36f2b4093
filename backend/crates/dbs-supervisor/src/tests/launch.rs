use crate::{LaunchIntent, LaunchPlan};

use std::net::{IpAddr, Ipv4Addr};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use dbs_config::Config;
use googletest::assert_that;
use googletest::prelude::eq;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use serial_test::serial;
use tempfile::TempDir;

fn config() -> Config {
    let mut config = Config::default();
    config.paths.executable = PathBuf::from("/opt/db/bin/mysqld");
    config.paths.package_base = PathBuf::from("/opt/db");
    config.paths.charsets = PathBuf::from("/opt/db/share/charsets");
    config.paths.plugins = PathBuf::from("/opt/db/lib/plugin");
    config.paths.databases = PathBuf::from("/srv/db/data");
    config.paths.temporary = PathBuf::from("/srv/db/tmp");
    config.paths.socket = PathBuf::from("/srv/db/mysqld.sock");
    config.paths.pid = PathBuf::from("/srv/db/mysqld.pid");
    config.network.ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));
    config.network.port = 13306;
    config
}

const GENERIC_ARGUMENTS: [&str; 11] = [
    "--no-defaults",
    "--basedir=/opt/db",
    "--character-sets-dir=/opt/db/share/charsets",
    "--plugin-dir=/opt/db/lib/plugin",
    "--datadir=/srv/db/data",
    "--tmpdir=/srv/db/tmp",
    "--socket=/srv/db/mysqld.sock",
    "--pid-file=/srv/db/mysqld.pid",
    "--memlock",
    "--console",
    "--log-warnings",
];

#[test]
fn given_bootstrap_intent_when_planned_then_administrative_flags_follow_generic_ones() {
    let plan = LaunchPlan::bootstrap(&config());

    let mut expected = GENERIC_ARGUMENTS.to_vec();
    expected.extend([
        "--bootstrap",
        "--skip-grant",
        "--skip-networking",
        "--one-thread",
    ]);

    assert_that!(plan.intent, eq(LaunchIntent::Bootstrap));
    assert_eq!(plan.display_arguments(), expected);
}

#[test]
fn given_normal_intent_when_planned_then_endpoint_flags_follow_generic_ones() {
    let plan = LaunchPlan::normal(&config());

    let mut expected = GENERIC_ARGUMENTS.to_vec();
    expected.extend([
        "--bind-address=10.0.0.7",
        "--port=13306",
        "--extra-port=0",
        "--skip-ssl",
        "--skip-name-resolve",
        "--skip-host-cache",
    ]);

    assert_that!(plan.intent, eq(LaunchIntent::Normal));
    assert_eq!(plan.display_arguments(), expected);
}

#[test]
fn given_any_intent_when_planned_then_environment_is_empty_and_cwd_is_temporary() {
    let config = config();

    for intent in [LaunchIntent::Bootstrap, LaunchIntent::Normal] {
        let plan = LaunchPlan::for_intent(intent, &config);

        assert!(plan.environment.is_empty());
        assert_eq!(plan.executable, PathBuf::from("/opt/db/bin/mysqld"));
        assert_eq!(plan.working_directory, PathBuf::from("/srv/db/tmp"));
    }
}

#[test]
fn given_same_config_when_planned_twice_then_plans_are_identical() {
    let config = config();

    assert_eq!(LaunchPlan::normal(&config), LaunchPlan::normal(&config));
    assert_eq!(LaunchPlan::bootstrap(&config), LaunchPlan::bootstrap(&config));
}

#[test]
fn given_ipv6_address_when_planned_then_bind_address_unbracketed() {
    let mut config = config();
    config.network.ip = "::1".parse().unwrap();

    let arguments = LaunchPlan::normal(&config).display_arguments();

    assert!(arguments.contains(&"--bind-address=::1".to_string()));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn given_spawning_thread_exits_when_child_running_then_child_receives_sigterm() {
    let dir = TempDir::new().unwrap();
    let executable = dir.path().join("mysqld");
    std::fs::write(&executable, "#!/bin/sh\nexec /bin/sleep 30\n").unwrap();
    std::fs::set_permissions(&executable, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut config = config();
    config.paths.executable = executable;
    config.paths.temporary = dir.path().to_path_buf();
    let plan = LaunchPlan::normal(&config);

    // The parent-death signal fires when the forking thread exits.
    let pid = std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let child = plan.spawn(Stdio::null()).unwrap();
            child.id().unwrap()
        })
    })
    .join()
    .unwrap();

    let pid = Pid::from_raw(pid as i32);
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                assert_that!(signal, eq(Signal::SIGTERM));
                break;
            }
            // Already reaped by the runtime's orphan handling.
            Err(Errno::ECHILD) => break,
            Ok(WaitStatus::StillAlive) => {
                assert!(Instant::now() < deadline, "child {pid} outlived its spawning thread");
                std::thread::sleep(Duration::from_millis(50));
            }
            other => panic!("unexpected wait result for {pid}: {other:?}"),
        }
    }
}
