use clap::Parser;
use linegroup::cli::Cli;
use linegroup::error::ExitCode;
use linegroup::input::InputError;
use linegroup::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SAMPLE: &str = "\"1\";\"5\"\n\
                      \"1\";\"6\"\n\
                      \"2\";\"6\"\n\
                      \"7\";\"8\"\n\
                      \"1\";\"5\"\n\
                      \"a\";\"1\"\n";

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["linegroup", "-q"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn write_input(dir: &Path, content: &str) -> String {
    let path = dir.join("input.txt");
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_group_writes_text_report() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let output = dir.path().join("groups.txt");

    let code = run(&["group", output.to_str().unwrap(), "--input", &input]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Group 1\n\"1\";\"5\"\n\"1\";\"6\"\n\"2\";\"6\"\n\n"
    );
}

#[test]
fn test_group_without_links_returns_no_groups() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "\"1\";\"2\"\n\"3\";\"4\"\n\"\";\"\"\n");
    let output = dir.path().join("groups.txt");

    let code = run(&["group", output.to_str().unwrap(), "--input", &input]).unwrap();

    assert_eq!(code, ExitCode::NoGroups);
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn test_group_min_size_one_emits_singletons() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let output = dir.path().join("groups.txt");

    let code = run(&[
        "group",
        output.to_str().unwrap(),
        "--input",
        &input,
        "--min-group-size",
        "1",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("Group 2\n\"7\";\"8\"\n\n"));
}

#[test]
fn test_group_union_find_merges_bridge() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "\"1\";\"10\"\n\"2\";\"20\"\n\"1\";\"20\"\n");
    let first_match = dir.path().join("first.txt");
    let union_find = dir.path().join("union.txt");

    run(&["group", first_match.to_str().unwrap(), "--input", &input]).unwrap();
    run(&[
        "group",
        union_find.to_str().unwrap(),
        "--input",
        &input,
        "--strategy",
        "union-find",
    ])
    .unwrap();

    let first = fs::read_to_string(&first_match).unwrap();
    let union = fs::read_to_string(&union_find).unwrap();
    assert_eq!(first, "Group 1\n\"1\";\"10\"\n\"1\";\"20\"\n\n");
    assert_eq!(
        union,
        "Group 1\n\"1\";\"10\"\n\"2\";\"20\"\n\"1\";\"20\"\n\n"
    );
}

#[test]
fn test_group_json_report() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let output = dir.path().join("groups.json");

    run(&[
        "group",
        output.to_str().unwrap(),
        "--input",
        &input,
        "--format",
        "json",
    ])
    .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["groups"][0]["size"], 3);
    assert_eq!(value["summary"]["lines_read"], 6);
    assert_eq!(value["summary"]["invalid_lines"], 1);
    assert_eq!(value["summary"]["duplicate_lines"], 1);
    assert_eq!(value["summary"]["unique_records"], 4);
    assert_eq!(value["summary"]["total_groups"], 2);
    assert_eq!(value["summary"]["emitted_groups"], 1);
}

#[test]
fn test_group_reads_config_file() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let config = dir.path().join("linegroup.toml");
    fs::write(
        &config,
        format!("input = {:?}\nformat = \"csv\"\n", input),
    )
    .unwrap();
    let output = dir.path().join("groups.csv");

    let code = run(&[
        "--config",
        config.to_str().unwrap(),
        "group",
        output.to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("group,size,record\n"));
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn test_cli_flag_overrides_config_file() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let config = dir.path().join("linegroup.toml");
    fs::write(&config, "format = \"csv\"\n").unwrap();
    let output = dir.path().join("groups.txt");

    run(&[
        "--config",
        config.to_str().unwrap(),
        "group",
        output.to_str().unwrap(),
        "--input",
        &input,
        "--format",
        "text",
    ])
    .unwrap();

    assert!(fs::read_to_string(&output)
        .unwrap()
        .starts_with("Group 1\n"));
}

#[test]
fn test_custom_delimiter() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "\"1\",\"5\"\n\"1\",\"6\"\n\"1\";\"6\"\n");
    let output = dir.path().join("groups.txt");

    run(&[
        "group",
        output.to_str().unwrap(),
        "--input",
        &input,
        "--delimiter",
        ",",
    ])
    .unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Group 1\n\"1\",\"5\"\n\"1\",\"6\"\n\n"
    );
}

#[test]
fn test_missing_input_is_general_error() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("groups.txt");
    let missing = dir.path().join("missing.txt.gz");

    let err = run(&[
        "group",
        output.to_str().unwrap(),
        "--input",
        missing.to_str().unwrap(),
    ])
    .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{:#}", err).contains("Input not found"));
    assert!(!output.exists());
}

#[test]
fn test_record_limit_fails_run() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let output = dir.path().join("groups.txt");

    let err = run(&[
        "group",
        output.to_str().unwrap(),
        "--input",
        &input,
        "--max-records",
        "2",
    ])
    .unwrap_err();

    let limit = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<InputError>());
    assert!(matches!(
        limit,
        Some(InputError::RecordLimitExceeded { limit: 2 })
    ));
}

#[test]
fn test_check_command_succeeds() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);

    let code = run(&["check", "--input", &input]).unwrap();
    assert_eq!(code, ExitCode::Success);
}
