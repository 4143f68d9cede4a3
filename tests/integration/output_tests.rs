use linegroup::grouping::{group, GroupingConfig, Strategy};
use linegroup::input::RecordSet;
use linegroup::output::{write_report, OutputFormat, Report, RunSummary};

fn records(lines: &[&str]) -> RecordSet {
    lines.iter().copied().collect()
}

fn render(format: OutputFormat, lines: &[&str], min_group_size: usize) -> (usize, String) {
    let (groups, _) = group(records(lines), &GroupingConfig::default());
    let report = Report::new(&groups, min_group_size);
    let mut out = Vec::new();
    let written = write_report(&report, format, &RunSummary::default(), &mut out).unwrap();
    (written, String::from_utf8(out).unwrap())
}

#[test]
fn test_numbers_follow_ranking_across_interleaved_singletons() {
    // Allocation order: 2, 1, 2, 1. Ranking moves both pairs ahead of the
    // singletons while keeping their relative order.
    let lines = [
        "\"1\";\"1\"",
        "\"1\";\"2\"",
        "\"9\";\"9\"",
        "\"3\";\"3\"",
        "\"3\";\"4\"",
        "\"8\";\"8\"",
    ];
    let (written, text) = render(OutputFormat::Text, &lines, 2);
    assert_eq!(written, 2);
    assert_eq!(
        text,
        "Group 1\n\"1\";\"1\"\n\"1\";\"2\"\n\n\
         Group 2\n\"3\";\"3\"\n\"3\";\"4\"\n\n"
    );
}

#[test]
fn test_threshold_keeps_prefix_of_ranking() {
    let lines = [
        "\"1\";\"1\"",
        "\"1\";\"2\"",
        "\"3\";\"3\"",
        "\"3\";\"4\"",
        "\"3\";\"5\"",
    ];
    let (groups, _) = group(records(&lines), &GroupingConfig::default());
    let report = Report::new(&groups, 3);
    let numbers: Vec<usize> = report.entries().map(|e| e.number).collect();
    assert_eq!(numbers, vec![1]);
    assert_eq!(report.ranked_count(), 2);
}

#[test]
fn test_csv_and_text_agree_on_groups() {
    let lines = ["\"1\";\"5\"", "\"1\";\"6\"", "\"2\";\"6\"", "\"7\";\"6\""];
    let (text_count, text) = render(OutputFormat::Text, &lines, 2);
    let (csv_count, csv) = render(OutputFormat::Csv, &lines, 2);

    assert_eq!(text_count, csv_count);
    assert_eq!(text.lines().filter(|l| l.starts_with('"')).count(), 4);
    assert_eq!(csv.lines().count(), 5);
}

#[test]
fn test_json_summary_reflects_strategy() {
    let lines = ["\"1\";\"10\"", "\"2\";\"20\"", "\"1\";\"20\""];
    let config = GroupingConfig::default().with_strategy(Strategy::UnionFind);
    let (groups, stats) = group(records(&lines), &config);
    let report = Report::new(&groups, 2);

    let summary = RunSummary {
        strategy: Strategy::UnionFind,
        total_groups: stats.groups,
        largest_group: stats.largest_group,
        ..RunSummary::default()
    };
    let mut out = Vec::new();
    write_report(&report, OutputFormat::Json, &summary, &mut out).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["summary"]["strategy"], "union-find");
    assert_eq!(value["summary"]["largest_group"], 3);
    assert_eq!(value["groups"][0]["records"].as_array().unwrap().len(), 3);
}
