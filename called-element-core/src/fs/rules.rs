use super::FsLayout;
use crate::metadata::{wildcard_matches, IndexQuery, QueryRow, RuleIndexQueryService};
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;

/// [`RuleIndexQueryService`] that scans `.drl` rule files on every query.
///
/// A rule attribute is a line of the form `<attribute> "<value>"` inside a
/// rule header. One row is returned per occurrence.
pub struct FsRuleIndex {
    layout: FsLayout,
}

impl FsRuleIndex {
    pub fn new(layout: FsLayout) -> Self {
        Self { layout }
    }
}

#[async_trait]
impl RuleIndexQueryService for FsRuleIndex {
    async fn query(&self, query: &IndexQuery) -> Result<Vec<QueryRow>> {
        let Some(attribute) = query.attribute() else {
            return Ok(Vec::new());
        };
        let pattern = query.value_pattern().unwrap_or("*");
        let attribute_re = Regex::new(&format!(
            r#"(?m)^\s*{}\s+"([^"]*)""#,
            regex::escape(attribute)
        ))
        .context("building attribute pattern")?;

        let mut dirs = vec![self.layout.root().to_path_buf()];
        for package in self.layout.package_names().await? {
            dirs.push(self.layout.package_dir(&package)?);
        }

        let mut rows = Vec::new();
        for dir in dirs {
            for file in self.layout.files_with_extension(&dir, &["drl"]).await? {
                let content = match tokio::fs::read_to_string(&file).await {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::warn!(file = %file.display(), error = %e, "skipping rule file");
                        continue;
                    }
                };
                rows.extend(
                    attribute_re
                        .captures_iter(&content)
                        .filter_map(|caps| caps.get(1))
                        .map(|m| m.as_str())
                        .filter(|value| {
                            if query.use_wildcards {
                                wildcard_matches(pattern, value)
                            } else {
                                pattern == *value
                            }
                        })
                        .map(QueryRow::new),
                );
            }
        }
        tracing::debug!(query = %query.name, rows = rows.len(), "rule index scanned");
        Ok(rows)
    }
}
