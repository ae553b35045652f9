use std::fs;

use tempfile::tempdir;

use merval::{
    DiagramKind, EmbeddedBlock, ErrorCode, Linter, MervalError, Severity,
    config::{ConfigError, load_config},
};

const DOCUMENT_BLOCKS: [(&str, usize, &str); 3] = [
    (
        "flowchart TD\n  A[Start] --> B{Ok?}\n  B -->|yes| C\n  B -->|no| A",
        4,
        "flowchart",
    ),
    (
        "sequenceDiagram\n  participant A\n  participant B\n  A->>B: hello\n  B->>C: hi",
        15,
        "sequenceDiagram",
    ),
    ("gantt\n  Task : t1, 2024-01-01, 5d", 30, "gantt"),
];

#[test]
fn lint_blocks_report_document_positions() {
    let linter = Linter::default();
    let reports: Vec<_> = DOCUMENT_BLOCKS
        .iter()
        .map(|(source, offset, tag)| {
            linter.lint_block(
                &EmbeddedBlock::new(source)
                    .with_line_offset(*offset)
                    .with_detected_kind(tag),
            )
        })
        .collect();

    assert!(reports[0].is_clean(), "{:?}", reports[0].diagnostics());
    assert_eq!(reports[0].kind(), DiagramKind::Flowchart);

    let undeclared = &reports[1].diagnostics()[0];
    assert_eq!(reports[1].diagnostics().len(), 1);
    assert_eq!(undeclared.code(), Some(ErrorCode::E301));
    assert_eq!(undeclared.position().line(), 20);

    let outside = &reports[2].diagnostics()[0];
    assert!(reports[2].diagram().is_none());
    assert_eq!(outside.code(), Some(ErrorCode::E202));
    assert_eq!(outside.position().line(), 32);
}

#[test]
fn config_file_drives_linter() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("merval.toml");
    fs::write(
        &path,
        "[rules]\ndisabled = [\"pie-duplicate-label\"]\n\n[rules.severity]\nE301 = \"warning\"\n",
    )
    .unwrap();

    let linter = Linter::new(load_config(Some(&path)).unwrap());

    assert!(linter.lint("pie\n\"A\": 1\n\"A\": 2").is_clean());

    let report = linter.lint("sequenceDiagram\nparticipant A\nA->>B: hi");
    assert!(!report.has_errors());
    assert_eq!(report.diagnostics()[0].severity(), Severity::Warning);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempdir().expect("Failed to create temp directory");

    let err = load_config(Some(dir.path().join("absent.toml"))).unwrap_err();

    assert!(matches!(err, MervalError::Config(ConfigError::MissingFile(_))));
}

#[test]
fn invalid_config_file_is_an_error() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("merval.toml");
    fs::write(&path, "[rules]\ndisabled = \"all\"\n").unwrap();

    let err = load_config(Some(&path)).unwrap_err();

    assert!(matches!(err, MervalError::Config(ConfigError::Parse(_))), "{err}");
}

#[test]
fn lint_file_reads_from_disk() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("states.mmd");
    fs::write(&path, "stateDiagram-v2\nstate Idle\n[*] --> Idle\nstate Idle\n").unwrap();

    let report = Linter::default().lint_file(&path).unwrap();

    assert_eq!(report.kind(), DiagramKind::StateV2);
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.diagnostics()[0].code(), Some(ErrorCode::E300));

    let err = Linter::default()
        .lint_file(dir.path().join("missing.mmd"))
        .unwrap_err();
    assert!(matches!(err, MervalError::Io(_)));
}
