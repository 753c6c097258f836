use serde::{Deserialize, Serialize};

/// Ordered set of environment-variable overrides for one matrix permutation.
///
/// Insertion order is preserved because the driver layers these over the
/// baseline environment in sequence, the same way the engine resolves them.
/// Absent keys fall back to defaults baked into the synthesizers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvOverrides(Vec<(String, String)>);

impl EnvOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from `(name, value)` pairs, keeping their order.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Append an override; a repeated name shadows the earlier value on
    /// lookup but both entries are exported to the engine in order.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((name.into(), value.into()));
        self
    }

    /// Last value set for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Resolve `name` against a baked-in default.
    ///
    /// An override set to the empty string resolves to the default: the
    /// engine's own conditionals treat empty-but-set variables as unset, and
    /// the oracle must mirror that resolution order exactly.
    #[must_use]
    pub fn resolve<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.get(name) {
            Some(v) if !v.is_empty() => v,
            _ => default,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Human-readable permutation label for reports, e.g.
    /// `PHP_VERSION=8.1 DOCKER_ENV=--env "FOO=bar"`; `(defaults)` when empty.
    #[must_use]
    pub fn label(&self) -> String {
        if self.0.is_empty() {
            return "(defaults)".to_owned();
        }
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'a> IntoIterator for &'a EnvOverrides {
    type Item = (&'a String, &'a String);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a String, &'a String),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let split: fn(&'a (String, String)) -> (&'a String, &'a String) = |(k, v)| (k, v);
        self.0.iter().map(split)
    }
}
