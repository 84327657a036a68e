//! Include-aware loading of configuration files.
//!
//! Any file may list further files under a top-level `include` key, either as
//! a single path or an array of paths. Relative paths resolve against the
//! directory of the file that names them, and included files may include
//! others in turn. The top-level sections of every file are merged into one
//! table, and a section may be defined by one file only.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

const INCLUDE_KEY: &str = "include";

/// One parsed configuration file, with its include list split off.
struct Source {
	path: PathBuf,
	sections: toml::Table,
	includes: Vec<PathBuf>,
}

/// Reads a main configuration file together with everything it includes.
#[derive(Default)]
pub(crate) struct ConfigLoader {
	/// Canonical paths already read; reading one twice means an include cycle.
	visited: HashSet<PathBuf>,
	/// File that defined each top-level section.
	owners: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	/// Loads `path` and its includes into a validated [`Config`].
	pub(crate) async fn load(mut self, path: &Path) -> Result<Config, ConfigError> {
		let mut merged = toml::Table::new();
		let mut pending = VecDeque::from([path.to_path_buf()]);

		while let Some(next) = pending.pop_front() {
			let source = self.read(&next).await?;
			pending.extend(source.includes);
			for (section, value) in source.sections {
				self.claim(&section, &source.path)?;
				merged.insert(section, value);
			}
		}

		let config: Config = toml::Value::Table(merged).try_into()?;
		config.validate()?;
		Ok(config)
	}

	async fn read(&mut self, path: &Path) -> Result<Source, ConfigError> {
		let canonical = tokio::fs::canonicalize(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Configuration file not found: {} ({})", path.display(), e),
			))
		})?;
		if !self.visited.insert(canonical.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include: {} was already loaded",
				canonical.display()
			)));
		}

		let content = resolve_env_vars(&tokio::fs::read_to_string(&canonical).await?)?;
		let mut sections: toml::Table = toml::from_str(&content)?;
		let dir = canonical.parent().unwrap_or_else(|| Path::new("."));
		let includes = match sections.remove(INCLUDE_KEY) {
			Some(value) => include_paths(&value)?
				.into_iter()
				.map(|include| dir.join(include))
				.collect(),
			None => Vec::new(),
		};

		Ok(Source {
			path: canonical,
			sections,
			includes,
		})
	}

	/// Records `file` as the owner of `section`, failing if another file got there first.
	fn claim(&mut self, section: &str, file: &Path) -> Result<(), ConfigError> {
		if let Some(owner) = self.owners.get(section) {
			return Err(ConfigError::Validation(format!(
				"Duplicate section '{}' found in {} and {}",
				section,
				owner.display(),
				file.display()
			)));
		}
		self.owners.insert(section.to_string(), file.to_path_buf());
		Ok(())
	}
}

fn include_paths(value: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	match value {
		toml::Value::String(path) => Ok(vec![PathBuf::from(path)]),
		toml::Value::Array(items) => items
			.iter()
			.map(|item| {
				item.as_str().map(PathBuf::from).ok_or_else(|| {
					ConfigError::Validation("include entries must be strings".into())
				})
			})
			.collect(),
		_ => Err(ConfigError::Validation(
			"include must be a path or an array of paths".into(),
		)),
	}
}
