use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

use anyhow::{Context, bail};

/// URLs grouped by resource type, then by access date. Built once by
/// [`load_psv`] and iterated once; set membership deduplicates within a
/// (type, date) bucket.
pub type Grouping = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// Parse the pipe-delimited input file into a [`Grouping`].
///
/// Each non-empty line must be exactly `access_date|resource_type|url`; any
/// other field count is fatal since nothing downstream can recover from a
/// half-read record. Dates and URLs are taken verbatim.
pub fn load_psv(path: &Path) -> anyhow::Result<Grouping> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let mut grouping = Grouping::new();
    for (idx, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('|').collect();
        let [access_date, resource_type, url] = fields[..] else {
            bail!(
                "{}:{}: expected 3 pipe-delimited fields, got {}",
                path.display(),
                idx + 1,
                fields.len()
            );
        };
        grouping
            .entry(resource_type.to_string())
            .or_default()
            .entry(access_date.to_string())
            .or_default()
            .insert(url.to_string());
    }
    Ok(grouping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load(contents: &str) -> anyhow::Result<Grouping> {
        let mut tmp = NamedTempFile::new().expect("tmp file");
        tmp.write_all(contents.as_bytes()).expect("write");
        load_psv(tmp.path())
    }

    #[test]
    fn groups_by_type_then_date() {
        let grouping = load(concat!(
            "2023-05-01|website|https://example.com/a\n",
            "2023-05-01|website|https://example.com/b\n",
            "2023-05-02|website|https://example.com/a\n",
            "2023-05-01|book|https://example.com/a\n",
        ))
        .expect("load");

        assert_eq!(grouping.len(), 2);
        let websites = &grouping["website"];
        assert_eq!(websites["2023-05-01"].len(), 2);
        assert_eq!(websites["2023-05-02"].len(), 1);
        assert!(grouping["book"]["2023-05-01"].contains("https://example.com/a"));
    }

    #[test]
    fn duplicate_url_in_one_bucket_is_stored_once() {
        let grouping = load(concat!(
            "2023-05-01|website|https://example.com/a\n",
            "2023-05-01|website|https://example.com/a\n",
        ))
        .expect("load");
        assert_eq!(grouping["website"]["2023-05-01"].len(), 1);
    }

    #[test]
    fn empty_lines_are_skipped() {
        let grouping = load("2023-05-01|website|https://example.com/a\n\n").expect("load");
        assert_eq!(grouping["website"]["2023-05-01"].len(), 1);
    }

    #[test]
    fn wrong_field_count_is_fatal_with_line_number() {
        let err = load("2023-05-01|website|https://example.com/a\n2023-05-02|website\n")
            .expect_err("should fail");
        let msg = err.to_string();
        assert!(msg.contains(":2:"), "missing line number: {msg}");
        assert!(msg.contains("expected 3 pipe-delimited fields, got 2"), "{msg}");
    }

    #[test]
    fn extra_fields_are_fatal() {
        let err = load("2023-05-01|website|https://example.com/a|junk\n").expect_err("should fail");
        assert!(err.to_string().contains("got 4"));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_psv(Path::new("/nonexistent/data.psv")).expect_err("should fail");
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn any_pipe_free_fields_parse_into_their_bucket() {
        proptest::proptest!(|(
            date in "[0-9]{4}-[0-9]{2}-[0-9]{2}",
            ty in "[a-z]{1,12}",
            url in "https://[a-z0-9./-]{1,40}",
        )| {
            let grouping = load(&format!("{date}|{ty}|{url}\n")).expect("load");
            proptest::prop_assert!(grouping[&ty][&date].contains(&url));
        })
    }
}
