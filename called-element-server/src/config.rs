//! Server configuration: YAML file plus environment overrides.
//!
//! Reads:
//! - `CALLED_ELEMENT_CONFIG`: path to the YAML config (optional)
//! - `CALLED_ELEMENT_BIND_ADDR`: listen address override
//! - `CALLED_ELEMENT_REPOSITORY_ROOT`: repository root when no YAML is given

use anyhow::{bail, Context, Result};
use called_element_core::fs::{FsLayout, DEFAULT_URI_SCHEME};
use called_element_core::{Backends, CalledElementService, ResolverConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4200";
pub const DEFAULT_PROFILE: &str = "jbpm";

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Profile used when a request names none.
    #[serde(default = "default_profile")]
    pub default_profile: String,
    pub profiles: HashMap<String, ProfileConfig>,
}

/// One repository the server can answer for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub repository_root: PathBuf,
    #[serde(default = "default_uri_scheme")]
    pub uri_scheme: String,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_uri_scheme() -> String {
    DEFAULT_URI_SCHEME.to_string()
}

impl ProfileConfig {
    pub fn new(repository_root: impl Into<PathBuf>) -> Self {
        Self {
            repository_root: repository_root.into(),
            uri_scheme: default_uri_scheme(),
            resolver: ResolverConfig::default(),
        }
    }

    /// Fresh backends and service for one request.
    pub fn service(&self) -> CalledElementService {
        CalledElementService::new(self.backends(), self.resolver.clone())
    }

    fn backends(&self) -> Backends {
        FsLayout::new(&self.repository_root)
            .with_scheme(&self.uri_scheme)
            .backends()
    }
}

impl ServerConfig {
    /// Single-profile config serving `repository_root` as the default profile.
    pub fn single(repository_root: impl Into<PathBuf>) -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(DEFAULT_PROFILE.to_string(), ProfileConfig::new(repository_root));
        Self {
            bind_addr: default_bind_addr(),
            default_profile: default_profile(),
            profiles,
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ServerConfig = serde_yaml::from_str(content).context("Parsing config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Loading {}", path.display()))
    }

    /// Build from the environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("CALLED_ELEMENT_CONFIG") {
            Ok(path) => Self::load_from_file(Path::new(&path))?,
            Err(_) => {
                let root = std::env::var("CALLED_ELEMENT_REPOSITORY_ROOT").context(
                    "set CALLED_ELEMENT_CONFIG or CALLED_ELEMENT_REPOSITORY_ROOT",
                )?;
                Self::single(root)
            }
        };
        if let Ok(addr) = std::env::var("CALLED_ELEMENT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        Ok(config)
    }

    /// Look up a profile. Blank or absent names select the default profile.
    pub fn profile(&self, name: Option<&str>) -> Option<&ProfileConfig> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(self.default_profile.as_str());
        self.profiles.get(name)
    }

    fn validate(&self) -> Result<()> {
        if !self.profiles.contains_key(&self.default_profile) {
            bail!(
                "default profile {:?} is not among the configured profiles",
                self.default_profile
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
bind_addr: "127.0.0.1:9000"
default_profile: jbpm
profiles:
  jbpm:
    repository_root: /srv/repo
  archive:
    repository_root: /srv/archive
    uri_scheme: git
    resolver:
      max_concurrent_fetches: 2
"#;

    #[test]
    fn parses_profiles_with_defaults() {
        let config = ServerConfig::from_yaml(YAML).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");

        let jbpm = config.profile(None).unwrap();
        assert_eq!(jbpm.repository_root, PathBuf::from("/srv/repo"));
        assert_eq!(jbpm.uri_scheme, "default");
        assert_eq!(jbpm.resolver, ResolverConfig::default());

        let archive = config.profile(Some("archive")).unwrap();
        assert_eq!(archive.uri_scheme, "git");
        assert_eq!(archive.resolver.max_concurrent_fetches, 2);
    }

    #[test]
    fn blank_profile_selects_default() {
        let config = ServerConfig::from_yaml(YAML).unwrap();
        assert_eq!(
            config.profile(Some("  ")).unwrap().repository_root,
            PathBuf::from("/srv/repo")
        );
        assert!(config.profile(Some("unknown")).is_none());
    }

    #[test]
    fn missing_default_profile_rejected() {
        let yaml = "default_profile: other\nprofiles:\n  jbpm:\n    repository_root: /r\n";
        let err = ServerConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("default profile"));
    }

    #[test]
    fn single_profile_config() {
        let config = ServerConfig::single("/tmp/repo");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.profile(Some("jbpm")).is_some());
    }
}
