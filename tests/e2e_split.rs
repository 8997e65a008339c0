// perfsplit - tests/e2e_split.rs
//
// End-to-end tests for the split pipeline.
//
// These exercise the real filesystem, real walkdir traversal, the real
// rayon pool and, for exit statuses, the compiled binary. No mocks.

use perfsplit::app::split::{run_split, OutputTarget, SplitOptions};
use perfsplit::core::model::SplitSummary;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

// =============================================================================
// Helpers
// =============================================================================

const PREFIX: &str = "2019-04-12 08:15:30.123";

fn line(ip: &str, rest: &str) -> String {
    format!("{PREFIX} {ip} {rest}")
}

fn write_log(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut content = lines.join("\n");
    if !lines.is_empty() {
        content.push('\n');
    }
    fs::write(&path, content).unwrap();
    path
}

/// Run a split of `root` into `root/out` and return the summary.
fn split_into_out(root: &Path) -> SplitSummary {
    let options = SplitOptions {
        output: OutputTarget::Dir(root.join("out")),
        ..SplitOptions::new(root)
    };
    run_split(&options, |_| {}).unwrap()
}

/// Every file in `dir`, by name, with its lines.
fn read_outputs(dir: &Path) -> BTreeMap<String, Vec<String>> {
    let mut outputs = BTreeMap::new();
    let Ok(entries) = fs::read_dir(dir) else {
        return outputs;
    };
    for entry in entries {
        let entry = entry.unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        let content = fs::read_to_string(entry.path()).unwrap();
        outputs.insert(name, content.lines().map(str::to_string).collect());
    }
    outputs
}

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_perfsplit"))
}

/// An empty config file so the binary ignores any user-level config.
fn empty_config(dir: &Path) -> PathBuf {
    let path = dir.join("perfsplit-test.toml");
    fs::write(&path, "").unwrap();
    path
}

// =============================================================================
// Scenarios
// =============================================================================

/// One file, three lines, two IPs: two output files with 2 and 1 lines.
#[test]
fn e2e_single_file_two_ips() {
    let dir = tempfile::tempdir().unwrap();
    write_log(
        dir.path(),
        "SrvLog_Perf.txt",
        &[
            line("10.0.0.1", "GET /a 12ms"),
            line("10.0.0.2", "GET /b 7ms"),
            line("10.0.0.1", "POST /c 30ms"),
        ],
    );

    let summary = split_into_out(dir.path());
    let outputs = read_outputs(&dir.path().join("out"));

    assert_eq!(outputs.len(), 2, "outputs: {outputs:?}");
    assert_eq!(
        outputs["SrvLog_Perf.10.0.0.1.txt"],
        vec![line("10.0.0.1", "GET /a 12ms"), line("10.0.0.1", "POST /c 30ms")]
    );
    assert_eq!(
        outputs["SrvLog_Perf.10.0.0.2.txt"],
        vec![line("10.0.0.2", "GET /b 7ms")]
    );
    assert_eq!(summary.buckets, 2);
    assert_eq!(summary.export.lines_written, 3);
}

/// A line without the timestamp prefix lands in the unclassified file.
#[test]
fn e2e_unclassified_line_gets_sentinel_file() {
    let dir = tempfile::tempdir().unwrap();
    write_log(
        dir.path(),
        "SrvLog_Perf.txt",
        &["service restarted 10.0.0.1 by admin".to_string()],
    );

    split_into_out(dir.path());
    let outputs = read_outputs(&dir.path().join("out"));

    assert_eq!(outputs.len(), 1, "outputs: {outputs:?}");
    assert_eq!(
        outputs["SrvLog_Perf.UNCLASSIFIED.txt"],
        vec!["service restarted 10.0.0.1 by admin".to_string()]
    );
}

/// A nonexistent root exits with status 2 and writes nothing.
#[test]
fn e2e_missing_root_exits_with_status_2() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-logs");

    let output = binary()
        .arg(&missing)
        .arg("--config")
        .arg(empty_config(dir.path()))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("does not exist"), "stdout: {stdout}");
    assert!(!missing.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1, "only the config file");
}

/// No root argument exits with status 1.
#[test]
fn e2e_missing_argument_exits_with_status_1() {
    let output = binary().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

/// Lines for one IP from two files merge into a single output, in file order.
#[test]
fn e2e_two_files_merge_same_ip() {
    let dir = tempfile::tempdir().unwrap();
    write_log(
        dir.path(),
        "SrvLog_Perf.txt",
        &[line("10.0.0.7", "current-1"), line("10.0.0.8", "other")],
    );
    let nested = dir.path().join("node-b");
    fs::create_dir(&nested).unwrap();
    write_log(
        &nested,
        "SrvLog_Perf.txt",
        &[line("10.0.0.7", "nested-1"), line("10.0.0.7", "nested-2")],
    );

    split_into_out(dir.path());
    let outputs = read_outputs(&dir.path().join("out"));

    assert_eq!(
        outputs["SrvLog_Perf.10.0.0.7.txt"],
        vec![
            line("10.0.0.7", "current-1"),
            line("10.0.0.7", "nested-1"),
            line("10.0.0.7", "nested-2"),
        ]
    );
    assert_eq!(outputs["SrvLog_Perf.10.0.0.8.txt"], vec![line("10.0.0.8", "other")]);
}

// =============================================================================
// Conservation and isolation
// =============================================================================

#[test]
fn e2e_no_matching_files_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("unrelated.log"), line("10.0.0.1", "x")).unwrap();

    let summary = split_into_out(dir.path());

    assert_eq!(summary.files_discovered, 0);
    assert_eq!(summary.export.lines_written, 0);
    assert!(read_outputs(&dir.path().join("out")).is_empty());
}

#[test]
fn e2e_single_empty_file_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "SrvLog_Perf.txt", &[]);

    let summary = split_into_out(dir.path());

    assert_eq!(summary.files_discovered, 1);
    assert_eq!(summary.ingest.lines_read, 0);
    assert!(read_outputs(&dir.path().join("out")).is_empty());
}

/// Many files, mixed lines: every input line is written exactly once, and
/// only to the file for its own IP.
#[test]
fn e2e_lines_conserved_and_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let mut expected: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut total = 0usize;

    for f in 0..16 {
        let mut lines = Vec::new();
        for n in 0..250 {
            let text = if n % 50 == 0 {
                format!("garbage f{f} n{n}")
            } else {
                line(&format!("192.168.{}.{}", f % 3, n % 5), &format!("f{f} n{n}"))
            };
            let key = if n % 50 == 0 {
                "SrvLog_Perf.UNCLASSIFIED.txt".to_string()
            } else {
                format!("SrvLog_Perf.192.168.{}.{}.txt", f % 3, n % 5)
            };
            expected.entry(key).or_default().push(text.clone());
            lines.push(text);
        }
        total += lines.len();
        write_log(dir.path(), &format!("SrvLog_Perf.txt.{f:02}"), &lines);
    }

    let summary = split_into_out(dir.path());
    let mut outputs = read_outputs(&dir.path().join("out"));

    assert_eq!(summary.ingest.lines_read, total as u64);
    assert_eq!(summary.export.lines_written, total as u64);
    assert_eq!(outputs.values().map(Vec::len).sum::<usize>(), total);

    for lines in expected.values_mut() {
        lines.sort();
    }
    for lines in outputs.values_mut() {
        lines.sort();
    }
    assert_eq!(outputs, expected);
}

/// Lines in a non-UTF-8 encoding are copied byte for byte.
#[test]
fn e2e_non_utf8_lines_copied_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut gbk = format!("{PREFIX} 10.0.0.1 ").into_bytes();
    gbk.extend_from_slice(b"\xd6\xd0\xce\xc4\n");
    let mut latin1 = b"caf\xe9 no ip here".to_vec();
    latin1.push(b'\n');
    let mut content = gbk.clone();
    content.extend_from_slice(&latin1);
    fs::write(dir.path().join("SrvLog_Perf.txt"), &content).unwrap();

    split_into_out(dir.path());
    let out = dir.path().join("out");

    assert_eq!(fs::read(out.join("SrvLog_Perf.10.0.0.1.txt")).unwrap(), gbk);
    assert_eq!(fs::read(out.join("SrvLog_Perf.UNCLASSIFIED.txt")).unwrap(), latin1);
}

/// Keys that would share an output name still get separate files, and every
/// reported line is on disk.
#[test]
fn e2e_colliding_output_names_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_log(
        dir.path(),
        "SrvLog_Perf.txt",
        &[
            "host=a/b x".to_string(),
            "host=a_b y".to_string(),
            "host=UNCLASSIFIED z".to_string(),
            "nothing here".to_string(),
        ],
    );

    let options = SplitOptions {
        ip_pattern: r"host=(?P<ip>\S+)".to_string(),
        output: OutputTarget::Dir(dir.path().join("out")),
        ..SplitOptions::new(dir.path())
    };
    let summary = run_split(&options, |_| {}).unwrap();
    let outputs = read_outputs(&dir.path().join("out"));

    assert_eq!(summary.export.written.len(), 4);
    assert_eq!(summary.export.lines_written, 4);
    assert_eq!(outputs.len(), 4, "outputs: {outputs:?}");
    assert_eq!(outputs.values().map(Vec::len).sum::<usize>(), 4);
    assert_eq!(outputs["SrvLog_Perf.a_b.txt"], vec!["host=a_b y".to_string()]);
    assert_eq!(outputs["SrvLog_Perf.a_b.1.txt"], vec!["host=a/b x".to_string()]);
    assert_eq!(
        outputs["SrvLog_Perf.UNCLASSIFIED.txt"],
        vec!["nothing here".to_string()]
    );
}

// =============================================================================
// Binary behaviour
// =============================================================================

/// A missing root wins over a broken config file.
#[test]
fn e2e_missing_root_checked_before_config() {
    let dir = tempfile::tempdir().unwrap();
    let output = binary()
        .arg(dir.path().join("no-such-logs"))
        .arg("--config")
        .arg(dir.path().join("no-such-config.toml"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn e2e_binary_unsafe_prefix_exits_with_status_3() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());
    let root = dir.path().join("logs");
    fs::create_dir(&root).unwrap();
    write_log(&root, "SrvLog_Perf.txt", &[line("10.0.0.1", "a")]);

    let output = binary()
        .arg(&root)
        .args(["--prefix", "../escaped", "--flat"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 2, "unexpected files: {names:?}");
    assert_eq!(fs::read_dir(&root).unwrap().count(), 1);
}

/// Default run writes into a timestamped subdirectory of the root, and a
/// second run does not read the first run's output back in.
#[test]
fn e2e_binary_writes_timestamped_export_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());
    let root = dir.path().join("logs");
    fs::create_dir(&root).unwrap();
    write_log(
        &root,
        "SrvLog_Perf.txt",
        &[line("10.0.0.1", "a"), line("10.0.0.2", "b")],
    );

    let output = binary()
        .arg(&root)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success(), "status: {:?}", output.status);

    let export_dirs: Vec<PathBuf> = fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    assert_eq!(export_dirs.len(), 1);
    let name = export_dirs[0].file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(name.len(), "2024-01-01_12-00-00".len(), "dir name {name}");

    let outputs = read_outputs(&export_dirs[0]);
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs["SrvLog_Perf.10.0.0.1.txt"], vec![line("10.0.0.1", "a")]);
}

#[test]
fn e2e_binary_flat_with_custom_include_and_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());
    let root = dir.path().join("logs");
    fs::create_dir(&root).unwrap();
    write_log(&root, "PerformanceLog1.txt", &[line("10.9.9.9", "z")]);

    let output = binary()
        .arg(&root)
        .args(["--include", "PerformanceLog*.txt", "--prefix", "Split", "--flat"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success(), "status: {:?}", output.status);

    assert_eq!(
        fs::read_to_string(root.join("Split.10.9.9.9.txt")).unwrap(),
        format!("{}\n", line("10.9.9.9", "z"))
    );
}

#[test]
fn e2e_binary_bad_pattern_exits_with_status_3() {
    let dir = tempfile::tempdir().unwrap();
    let output = binary()
        .arg(dir.path())
        .args(["--pattern-regex", r"(\d+\.\d+\.\d+\.\d+)"])
        .arg("--config")
        .arg(empty_config(dir.path()))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}
