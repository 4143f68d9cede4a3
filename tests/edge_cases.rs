use linegroup::grouping::{group, GroupingConfig, GroupingEngine, Strategy};
use linegroup::input::{RecordLoader, RecordSet};
use linegroup::record::RecordFormat;
use std::io::Cursor;

fn records(lines: &[&str]) -> RecordSet {
    lines.iter().copied().collect()
}

fn sizes(lines: &[&str], config: &GroupingConfig) -> Vec<usize> {
    let (groups, _) = group(records(lines), config);
    let mut sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}

#[test]
fn test_three_record_chain_forms_one_group() {
    let lines = ["\"1\";\"5\"", "\"1\";\"6\"", "\"2\";\"6\""];
    assert_eq!(sizes(&lines, &GroupingConfig::default()), vec![3]);
}

#[test]
fn test_same_value_in_different_columns_does_not_link() {
    let lines = ["\"1\";\"2\"", "\"2\";\"1\""];
    assert_eq!(sizes(&lines, &GroupingConfig::default()), vec![1, 1]);
}

#[test]
fn test_empty_fields_never_link() {
    let lines = ["\"\";\"1\"", "\"\";\"2\"", "\"\";\"\"", "\"\""];
    assert_eq!(sizes(&lines, &GroupingConfig::default()), vec![1, 1, 1, 1]);
}

#[test]
fn test_first_match_does_not_bridge_groups() {
    let lines = ["\"1\";\"10\"", "\"2\";\"20\"", "\"1\";\"20\""];
    assert_eq!(sizes(&lines, &GroupingConfig::default()), vec![2, 1]);

    let union = GroupingConfig::default().with_strategy(Strategy::UnionFind);
    assert_eq!(sizes(&lines, &union), vec![3]);
}

#[test]
fn test_records_of_different_lengths_link_on_shared_prefix_columns() {
    let lines = ["\"1\"", "\"1\";\"2\";\"3\"", "\"4\";\"5\";\"3\";\"7\""];
    assert_eq!(sizes(&lines, &GroupingConfig::default()), vec![3]);
}

#[test]
fn test_trailing_empty_field_is_ignored() {
    let mut engine = GroupingEngine::new(&RecordFormat::default());
    let a = engine.add("\"1\";\"\"".into());
    let b = engine.add("\"1\"".into());
    assert_eq!(a, b);
}

#[test]
fn test_leading_zeros_are_distinct_values() {
    let lines = ["\"01\";\"2\"", "\"1\";\"3\""];
    assert_eq!(sizes(&lines, &GroupingConfig::default()), vec![1, 1]);
}

#[test]
fn test_malformed_lines_are_rejected_before_grouping() {
    let input = "\"1\";\"2\"\n\
                 \"1\";\"2\";\n\
                 1;2\n\
                 \"1\" ;\"2\"\n\
                 \"1\";\"x\"\n\
                 \"1\";\"3\"\n";
    let loader = RecordLoader::with_defaults().unwrap();
    let (records, stats) = loader.load_reader(Cursor::new(input)).unwrap();

    assert_eq!(stats.invalid_lines, 4);
    assert_eq!(records.len(), 2);

    let (groups, _) = group(records, &GroupingConfig::default());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_single_record_input() {
    let (groups, stats) = group(records(&["\"42\""]), &GroupingConfig::default());
    assert_eq!(groups.len(), 1);
    assert_eq!(stats.multi_member_groups, 0);
}

#[test]
fn test_wide_records() {
    let wide: String = (0..500)
        .map(|i| format!("\"{}\"", i))
        .collect::<Vec<_>>()
        .join(";");
    let other = wide.replacen("\"0\"", "\"\"", 1);
    let lines = [wide.as_str(), other.as_str()];
    let (groups, stats) = group(records(&lines), &GroupingConfig::default());
    assert_eq!(groups.len(), 1);
    assert_eq!(stats.columns, 500);
}
