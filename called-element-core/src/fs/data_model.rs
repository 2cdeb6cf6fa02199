use super::FsLayout;
use crate::metadata::{DataModelService, RepositoryPath};
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;?").unwrap());

/// Top-level (unindented) Java type declarations.
static JAVA_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:public\s+)?(?:(?:abstract|final|sealed|non-sealed|static)\s+)*(?:class|interface|enum|record|@interface)\s+(\w+)",
    )
    .unwrap()
});

/// DRL `declare` blocks.
static DRL_DECLARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*declare\s+(\w+)").unwrap());

/// [`DataModelService`] over a directory tree.
///
/// Path tokens resolve to existing asset files. The fact types of an asset
/// are the types declared in `.java` and `.drl` files of its package.
pub struct FsDataModel {
    layout: FsLayout,
}

impl FsDataModel {
    pub fn new(layout: FsLayout) -> Self {
        Self { layout }
    }
}

#[async_trait]
impl DataModelService for FsDataModel {
    async fn resolve_path(&self, token: &str) -> Result<Option<RepositoryPath>> {
        let Some(rel) = self.layout.relative_path(token) else {
            return Ok(None);
        };
        let path = self.layout.root().join(&rel);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let package = rel
            .parent()
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();
        let file = rel
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Some(RepositoryPath {
            uri: self.layout.storage_id(&package, &file),
            package,
        }))
    }

    async fn fact_types(&self, path: &RepositoryPath) -> Result<Vec<String>> {
        let dir = self.layout.package_dir(&path.package)?;
        let mut types = Vec::new();
        for file in self
            .layout
            .files_with_extension(&dir, &["java", "drl"])
            .await?
        {
            let content = match tokio::fs::read_to_string(&file).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "skipping model file");
                    continue;
                }
            };
            types.extend(declared_types(&file, &content));
        }
        Ok(types)
    }
}

/// Fully-qualified names of the types declared in one source file.
fn declared_types(file: &Path, content: &str) -> Vec<String> {
    let type_re = match file.extension().and_then(|e| e.to_str()) {
        Some("java") => &*JAVA_TYPE_RE,
        Some("drl") => &*DRL_DECLARE_RE,
        _ => return Vec::new(),
    };
    let package = PACKAGE_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    type_re
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| match package {
            Some(pkg) => format!("{}.{}", pkg, m.as_str()),
            None => m.as_str().to_string(),
        })
        .collect()
}
