//! awsQuery request parameters.
//!
//! Query-protocol services (IAM, STS) receive a flat
//! `application/x-www-form-urlencoded` map. Lists and structures are
//! flattened with 1-based indices:
//!
//! ```text
//! Tags.member.1.Key=env&Tags.member.1.Value=dev&PolicyArns.member.1.arn=...
//! ```

use std::collections::BTreeMap;

/// A query parameter is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    /// A required parameter is absent or empty.
    #[error("missing required parameter '{0}'")]
    Missing(String),

    /// A parameter could not be parsed into its expected type.
    #[error("invalid value '{value}' for parameter '{name}'")]
    Invalid {
        /// Parameter name.
        name: String,
        /// Offending raw value.
        value: String,
    },
}

/// Decoded awsQuery parameters, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a form-encoded body or query string. Later duplicates win.
    #[must_use]
    pub fn parse(input: &[u8]) -> Self {
        form_urlencoded::parse(input).into_owned().collect()
    }

    /// Add every parameter from `other` that is not already present.
    pub fn extend_from(&mut self, other: Self) {
        for (k, v) in other.0 {
            self.0.entry(k).or_insert(v);
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether a parameter is present with a non-empty value.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }

    /// The `Action` parameter.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.get("Action")
    }

    /// A parameter that must be present and non-empty.
    pub fn required(&self, name: &str) -> Result<&str, ParamError> {
        self.get(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ParamError::Missing(name.to_owned()))
    }

    /// An optional parameter, owned.
    #[must_use]
    pub fn optional(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_owned)
    }

    pub fn optional_i32(&self, name: &str) -> Result<Option<i32>, ParamError> {
        self.parse_optional(name)
    }

    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>, ParamError> {
        self.parse_optional(name)
    }

    fn parse_optional<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, ParamError> {
        self.get(name)
            .map(|raw| {
                raw.parse::<T>().map_err(|_| ParamError::Invalid {
                    name: name.to_owned(),
                    value: raw.to_owned(),
                })
            })
            .transpose()
    }

    /// Values of `Name.member.1`, `Name.member.2`, ... up to the first gap.
    #[must_use]
    pub fn member_list(&self, name: &str) -> Vec<String> {
        (1..)
            .map_while(|i| self.get(&format!("{name}.member.{i}")).map(str::to_owned))
            .collect()
    }

    /// Structures under `Name.member.N.<Field>`, each as a field map, up to the first gap.
    #[must_use]
    pub fn member_structs(&self, name: &str) -> Vec<BTreeMap<String, String>> {
        let mut out = Vec::new();
        for i in 1.. {
            let prefix = format!("{name}.member.{i}.");
            let fields: BTreeMap<String, String> = self
                .0
                .range(prefix.clone()..)
                .take_while(|(k, _)| k.starts_with(&prefix))
                .map(|(k, v)| (k[prefix.len()..].to_owned(), v.clone()))
                .collect();
            if fields.is_empty() {
                break;
            }
            out.push(fields);
        }
        out
    }

    /// `Name.member.N.Key` / `Name.member.N.Value` pairs. Entries without a key are skipped.
    #[must_use]
    pub fn tags(&self, name: &str) -> Vec<(String, String)> {
        self.member_structs(name)
            .into_iter()
            .filter_map(|mut fields| {
                let key = fields.remove("Key")?;
                let value = fields.remove("Value").unwrap_or_default();
                Some((key, value))
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Build a typed input from awsQuery parameters.
pub trait FromQueryParams: Sized {
    /// Decode the input, failing on missing or malformed parameters.
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError>;
}
