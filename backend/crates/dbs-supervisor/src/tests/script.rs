use crate::{BootstrapScript, ServerErrorKind, password_statement};

use std::path::PathBuf;

use dbs_config::Config;
use googletest::assert_that;
use googletest::prelude::eq;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

fn config_with_scripts(dir: &TempDir, scripts: &[(&str, &[u8])]) -> Config {
    let mut config = Config::default();
    config.administrator.password = "secret".to_string();
    config.bootstrap.scripts = scripts
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        })
        .collect();
    config
}

#[test]
fn given_plain_password_when_formatted_then_statement_interpolates_it() {
    let statement = password_statement("secret");

    assert_eq!(
        String::from_utf8(statement).unwrap(),
        "UPDATE mysql.user SET password = PASSWORD ('secret') WHERE user = 'root';"
    );
}

#[test]
fn given_quote_and_backslash_when_formatted_then_escaped() {
    let statement = password_statement(r"it's\here");

    assert_eq!(
        String::from_utf8(statement).unwrap(),
        r"UPDATE mysql.user SET password = PASSWORD ('it\'s\\here') WHERE user = 'root';"
    );
}

#[tokio::test]
async fn given_scripts_when_prepared_then_fragments_follow_configured_order() {
    let dir = TempDir::new().unwrap();
    let config = config_with_scripts(&dir, &[("b.sql", b"B;"), ("a.sql", b"A;")]);

    let script = BootstrapScript::prepare(&config).await.unwrap();
    let fragments: Vec<&[u8]> = script.fragments().collect();

    assert_that!(fragments.len(), eq(5));
    assert_eq!(fragments[0], b"CREATE DATABASE mysql;\n");
    assert_eq!(fragments[1], b"USE mysql;");
    assert_eq!(fragments[2], b"B;");
    assert_eq!(fragments[3], b"A;");
    assert_eq!(fragments[4], password_statement("secret").as_slice());
}

#[tokio::test]
async fn given_missing_script_when_prepared_then_script_read_failure() {
    let dir = TempDir::new().unwrap();
    let mut config = config_with_scripts(&dir, &[("a.sql", b"A;")]);
    config.bootstrap.scripts.push(PathBuf::from("/nonexistent/init.sql"));

    let result = BootstrapScript::prepare(&config).await;

    let kind = result.err().map(|e| e.kind());
    assert_eq!(kind, Some(ServerErrorKind::ScriptReadFailure));
}

#[tokio::test]
async fn given_prepared_script_when_streamed_then_reader_sees_exact_concatenation() {
    let dir = TempDir::new().unwrap();
    let config = config_with_scripts(&dir, &[("t.sql", b"CREATE TABLE t(x INT);")]);
    let script = BootstrapScript::prepare(&config).await.unwrap();
    let expected_len = script.len();

    // A small pipe forces the writer to wait on the reader.
    let (writer, mut reader) = tokio::io::duplex(7);
    let streamer = script.stream(writer);

    let mut received = Vec::new();
    reader.read_to_end(&mut received).await.unwrap();
    let written = streamer.finish().await.unwrap();

    assert_eq!(
        String::from_utf8(received).unwrap(),
        "CREATE DATABASE mysql;\nUSE mysql;CREATE TABLE t(x INT);\
         UPDATE mysql.user SET password = PASSWORD ('secret') WHERE user = 'root';"
    );
    assert_that!(written, eq(expected_len as u64));
}

#[tokio::test]
async fn given_reader_gone_when_streamed_then_stream_failure() {
    let dir = TempDir::new().unwrap();
    let config = config_with_scripts(&dir, &[("big.sql", &[b'x'; 4096])]);
    let script = BootstrapScript::prepare(&config).await.unwrap();

    let (writer, reader) = tokio::io::duplex(16);
    drop(reader);
    let result = script.stream(writer).finish().await;

    let kind = result.err().map(|e| e.kind());
    assert_eq!(kind, Some(ServerErrorKind::ScriptStreamFailure));
}
