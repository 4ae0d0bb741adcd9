use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::{TempDir, tempdir};

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        Self { dir }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Fake clockify-cli: `report` prints the canned entry list, `delete`
    /// succeeds, and every invocation is appended to clockify.log.
    fn install_clockify(&self, report_json: &str) {
        let data = self.path("report.json");
        fs::write(&data, report_json).unwrap();
        let log = self.path("clockify.log");
        let shim = self.path("bin").join("clockify-cli");
        fs::write(
            &shim,
            format!(
                r#"#!/bin/sh
echo "$@" >> {log}
case "$1" in
  version) echo "v0.50.0" ;;
  report) cat {data} ;;
  delete) echo "deleted" ;;
  *) exit 1 ;;
esac
"#,
                log = log.display(),
                data = data.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&shim, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn run(&self, args: &[&str]) -> Output {
        let binary = assert_cmd::cargo::cargo_bin!("timew2clockify");
        let path_env = format!(
            "{}:{}",
            self.path("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        Command::new(binary)
            .current_dir(self.dir.path())
            .env("PATH", path_env)
            .env("NO_COLOR", "1")
            .args(args)
            .output()
            .expect("command should run")
    }

    fn log_lines(&self, name: &str) -> Vec<String> {
        fs::read_to_string(self.path(name))
            .unwrap_or_default()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }
}

const TWO_ENTRIES: &str = r#"[
  {
    "id": "e1",
    "description": "standup",
    "project": {"name": "Backend"},
    "timeInterval": {"start": "2024-03-01T08:00:00Z", "end": "2024-03-01T08:15:00Z", "duration": "PT15M"}
  },
  {
    "id": "e2",
    "description": "review",
    "project": {"name": "Backend"},
    "timeInterval": {"start": "2024-03-01T09:00:00Z", "end": "2024-03-01T09:30:00Z", "duration": "PT30M"}
  }
]"#;

fn parse_report(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).expect("stdout should be one json report object")
}

#[test]
fn dry_run_deletes_nothing() {
    let sandbox = Sandbox::new();
    sandbox.install_clockify(TWO_ENTRIES);

    let output = sandbox.run(&[
        "--format",
        "json",
        "delete",
        "--start",
        "2024-03-01",
        "--end",
        "2024-03-01",
        "--dry-run",
    ]);

    assert!(output.status.success(), "{output:?}");
    let report = parse_report(&output);
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["succeeded"], 2);
    assert_eq!(report["skipped"], 0);

    let log = sandbox.log_lines("clockify.log");
    assert!(
        log.iter().all(|l| !l.starts_with("delete")),
        "dry-run must not delete: {log:?}"
    );
}

#[test]
fn deletes_each_listed_entry_by_id() {
    let sandbox = Sandbox::new();
    sandbox.install_clockify(TWO_ENTRIES);

    let output = sandbox.run(&[
        "--format",
        "json",
        "delete",
        "--start",
        "2024-03-01",
        "--end",
        "2024-03-01",
    ]);

    assert!(output.status.success(), "{output:?}");
    let report = parse_report(&output);
    assert_eq!(report["succeeded"], 2);

    let deletes: Vec<String> = sandbox
        .log_lines("clockify.log")
        .into_iter()
        .filter(|l| l.starts_with("delete"))
        .collect();
    assert_eq!(deletes, vec!["delete e1 -i=0", "delete e2 -i=0"]);
}

#[test]
fn report_query_gets_an_inclusive_end_bound() {
    let sandbox = Sandbox::new();
    sandbox.install_clockify("[]");

    let output = sandbox.run(&[
        "delete",
        "--start",
        "2024-03-01",
        "--end",
        "2024-03-05",
        "--dry-run",
    ]);

    assert!(output.status.success(), "{output:?}");
    let log = sandbox.log_lines("clockify.log");
    assert!(
        log.contains(&"report 2024-03-01 2024-03-06 --json".to_string()),
        "clockify-cli should get the day after --end as its exclusive bound: {log:?}"
    );
}

#[test]
fn unparsable_report_output_is_fatal() {
    let sandbox = Sandbox::new();
    sandbox.install_clockify("this is not json");

    let output = sandbox.run(&[
        "--format",
        "json",
        "delete",
        "--start",
        "2024-03-01",
        "--end",
        "2024-03-01",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let error: Value = serde_json::from_str(stderr.trim()).expect("json error object");
    assert_eq!(error["error"], "sink");
}
