//! Static analysis of the config file's source text.
//!
//! `coverage.thresholds.autoUpdate` rewrites thresholds in the file the user
//! maintains, so it needs the thresholds table as written on disk, not the
//! merged value that may have come from CLI flags. Edits go through
//! `toml_edit` to keep comments and formatting intact.

use anyhow::{Context, Result, bail};
use toml_edit::{DocumentMut, Item, TableLike};

use vrun_core::types::Metric;

const PATH: [&str; 3] = ["test", "coverage", "thresholds"];

fn thresholds_item(doc: &DocumentMut) -> Option<&Item> {
    let mut item = doc.get(PATH[0])?;
    for key in &PATH[1..] {
        item = item.get(*key)?;
    }
    Some(item)
}

fn thresholds_table_mut(doc: &mut DocumentMut) -> Option<&mut dyn TableLike> {
    let mut item = doc.get_mut(PATH[0])?;
    for key in &PATH[1..] {
        item = item.get_mut(*key)?;
    }
    item.as_table_like_mut()
}

/// Whether `source` defines `test.coverage.thresholds` as a table (standard,
/// inline or dotted-key form).
pub fn has_thresholds_object(source: &str) -> bool {
    source
        .parse::<DocumentMut>()
        .ok()
        .and_then(|doc| thresholds_item(&doc).map(Item::is_table_like))
        .unwrap_or(false)
}

/// Rewrite the given metrics inside the thresholds table of `source`.
///
/// Whole numbers are written as integers. Existing entries keep their
/// surrounding whitespace and comments.
pub fn write_thresholds(source: &str, updates: &[(Metric, f64)]) -> Result<String> {
    let mut doc: DocumentMut = source
        .parse()
        .context("Unable to parse configuration file")?;
    let Some(table) = thresholds_table_mut(&mut doc) else {
        bail!("Expected config.test.coverage.thresholds to be an object");
    };

    for (metric, value) in updates {
        let mut new_value = threshold_value(*value);
        match table.get_mut(metric.as_str()).and_then(Item::as_value_mut) {
            Some(existing) => {
                *new_value.decor_mut() = existing.decor().clone();
                *existing = new_value;
            }
            None => {
                table.insert(metric.as_str(), Item::Value(new_value));
            }
        }
    }
    Ok(doc.to_string())
}

fn threshold_value(value: f64) -> toml_edit::Value {
    if value.fract() == 0.0 {
        toml_edit::Value::from(value as i64)
    } else {
        toml_edit::Value::from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_standard_table() {
        let src = "[test.coverage.thresholds]\nlines = 80\n";
        assert!(has_thresholds_object(src));
    }

    #[test]
    fn test_detects_inline_and_dotted_forms() {
        assert!(has_thresholds_object(
            "[test.coverage]\nthresholds = { lines = 80 }\n"
        ));
        assert!(has_thresholds_object("test.coverage.thresholds.lines = 80\n"));
    }

    #[test]
    fn test_rejects_missing_or_non_table() {
        assert!(!has_thresholds_object(""));
        assert!(!has_thresholds_object("[test.coverage]\nenabled = true\n"));
        assert!(!has_thresholds_object("[test.coverage]\nthresholds = 80\n"));
        assert!(!has_thresholds_object("[coverage.thresholds]\nlines = 80\n"));
        assert!(!has_thresholds_object("[test.coverage.thresholds\n"));
    }

    #[test]
    fn test_write_preserves_comments_and_layout() {
        let src = "\
# project config
[test.coverage]
enabled = true

[test.coverage.thresholds]
lines = 50 # raised by autoUpdate
autoUpdate = true
";
        let out = write_thresholds(src, &[(Metric::Lines, 81.5), (Metric::Branches, 70.0)]).unwrap();
        assert_eq!(
            out,
            "\
# project config
[test.coverage]
enabled = true

[test.coverage.thresholds]
lines = 81.5 # raised by autoUpdate
autoUpdate = true
branches = 70
"
        );
    }

    #[test]
    fn test_write_inline_table() {
        let src = "[test.coverage]\nthresholds = { lines = 10, autoUpdate = true }\n";
        let out = write_thresholds(src, &[(Metric::Lines, 20.0)]).unwrap();
        assert!(has_thresholds_object(&out));
        let reparsed: toml::Value = toml::from_str(&out).unwrap();
        assert_eq!(
            reparsed["test"]["coverage"]["thresholds"]["lines"].as_integer(),
            Some(20)
        );
    }

    #[test]
    fn test_write_without_table_fails() {
        let err = write_thresholds("[test]\n", &[(Metric::Lines, 1.0)]).unwrap_err();
        assert!(err.to_string().contains("thresholds to be an object"));
    }
}
