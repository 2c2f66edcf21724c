//! Namespace sources consumed by the cleaner.
//!
//! The control-plane client itself lives outside this crate; anything that
//! can produce a [`NamespaceList`] snapshot implements [`NamespaceSource`].

use std::path::PathBuf;

use builder_core::{Namespace, NamespaceList};

use crate::error::ListError;

/// Field selector key understood by the built-in sources.
pub const NAME_FIELD: &str = "metadata.name";

/// Label / field selectors passed to [`NamespaceSource::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
}

impl ListOptions {
    /// No filtering: every namespace.
    pub fn everything() -> Self {
        Self::default()
    }

    /// Filter `list` by equality selectors.
    ///
    /// Labels use `key=value[,key=value…]`; fields accept only
    /// `metadata.name=<name>`. Anything else is a [`ListError`].
    pub fn apply(&self, list: NamespaceList) -> Result<NamespaceList, ListError> {
        let labels = parse_selector(self.label_selector.as_deref())?;
        let fields = parse_selector(self.field_selector.as_deref())?;
        if let Some((key, _)) = fields.iter().find(|(key, _)| key != NAME_FIELD) {
            return Err(ListError::new(format!("unsupported field selector '{key}'")));
        }

        Ok(list
            .items
            .into_iter()
            .filter(|ns| {
                labels
                    .iter()
                    .all(|(k, v)| ns.labels.get(k).map(String::as_str) == Some(v.as_str()))
                    && fields.iter().all(|(_, v)| ns.name.0 == *v)
            })
            .collect())
    }
}

fn parse_selector(raw: Option<&str>) -> Result<Vec<(String, String)>, ListError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(vec![]);
    };
    raw.split(',')
        .map(|term| {
            let (key, value) = term
                .split_once('=')
                .ok_or_else(|| ListError::new(format!("invalid selector term '{term}'")))?;
            let key = key.trim();
            if key.is_empty() || key.ends_with('!') {
                return Err(ListError::new(format!("invalid selector term '{term}'")));
            }
            Ok((key.to_string(), value.trim_start_matches('=').trim().to_string()))
        })
        .collect()
}

/// Anything that can report the live namespace set.
///
/// Implementations may block (the cleaner calls them from a blocking
/// context) and may fail transiently; the cleaner retries on its next cycle.
pub trait NamespaceSource: Send + Sync {
    fn list(&self, options: &ListOptions) -> Result<NamespaceList, ListError>;
}

/// Fixed in-memory namespace set.
#[derive(Debug, Clone, Default)]
pub struct StaticNamespaceSource {
    list: NamespaceList,
}

impl StaticNamespaceSource {
    pub fn new(list: NamespaceList) -> Self {
        Self { list }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(|n| Namespace::new(n.into())).collect())
    }
}

impl NamespaceSource for StaticNamespaceSource {
    fn list(&self, options: &ListOptions) -> Result<NamespaceList, ListError> {
        options.apply(self.list.clone())
    }
}

/// Reads a `NamespaceList` document from disk on every call.
///
/// `.json` files are parsed as JSON, anything else as YAML:
///
/// ```yaml
/// items:
///   - name: foo
///   - name: bar
///     labels: { team: web }
/// ```
#[derive(Debug, Clone)]
pub struct FileNamespaceSource {
    path: PathBuf,
}

impl FileNamespaceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<NamespaceList, ListError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            ListError::with_source(format!("cannot read {}", self.path.display()), e)
        })?;
        let is_json = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            serde_json::from_str(&contents).map_err(|e| {
                ListError::with_source(format!("cannot parse {}", self.path.display()), e)
            })
        } else {
            serde_yaml::from_str(&contents).map_err(|e| {
                ListError::with_source(format!("cannot parse {}", self.path.display()), e)
            })
        }
    }
}

impl NamespaceSource for FileNamespaceSource {
    fn list(&self, options: &ListOptions) -> Result<NamespaceList, ListError> {
        options.apply(self.read()?)
    }
}
