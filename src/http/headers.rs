//! Case-insensitive, multi-valued header collection.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{Error, Result};

/// Header collection with case-insensitive names and ordered values.
///
/// Reading a header with several values joins them with `,`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    inner: HeaderMap,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, keeping any existing ones.
    pub fn add(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        let (name, value) = parse(name, value)?;
        self.inner.append(name, value);
        Ok(self)
    }

    /// Replace all values of `name`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        let (name, value) = parse(name, value)?;
        self.inner.insert(name, value);
        Ok(self)
    }

    /// All values of `name` joined with `,`.
    pub fn value(&self, name: &str) -> Option<String> {
        let values = self.values(name);
        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }

    pub fn values(&self, name: &str) -> Vec<&str> {
        self.inner
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let joined = self.value(name);
        self.inner.remove(name);
        joined
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.inner.keys_len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Header names with their joined values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, String)> {
        self.inner.keys().map(|name| {
            let joined = self
                .inner
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect::<Vec<_>>()
                .join(",");
            (name.as_str(), joined)
        })
    }

    pub fn as_header_map(&self) -> &HeaderMap {
        &self.inner
    }
}

fn parse(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::InvalidHeader(format!("{}: {}", name, e)))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidHeader(format!("{}: {}", name, e)))?;
    Ok((name, value))
}

impl From<HeaderMap> for HttpHeaders {
    fn from(inner: HeaderMap) -> Self {
        Self { inner }
    }
}

impl From<HttpHeaders> for HeaderMap {
    fn from(headers: HttpHeaders) -> Self {
        headers.inner
    }
}

impl fmt::Debug for HttpHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values are omitted so credentials never reach logs.
        f.debug_list().entries(self.inner.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_joins_values_in_order() {
        let mut headers = HttpHeaders::new();
        headers.add("a", "b").unwrap();
        headers.add("a", "c").unwrap();
        assert_eq!(headers.value("a").as_deref(), Some("b,c"));
        assert_eq!(headers.values("a"), vec!["b", "c"]);
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let mut headers = HttpHeaders::new();
        headers.add("X-Custom", "1").unwrap();
        headers.add("x-custom", "2").unwrap();
        assert_eq!(headers.value("X-CUSTOM").as_deref(), Some("1,2"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_set_replaces() {
        let mut headers = HttpHeaders::new();
        headers.add("a", "b").unwrap().add("a", "c").unwrap();
        headers.set("A", "d").unwrap();
        assert_eq!(headers.value("a").as_deref(), Some("d"));
    }

    #[test]
    fn test_remove() {
        let mut headers = HttpHeaders::new();
        headers.add("a", "b").unwrap();
        assert_eq!(headers.remove("a").as_deref(), Some("b"));
        assert!(!headers.contains("a"));
        assert!(headers.is_empty());
        assert_eq!(headers.remove("a"), None);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut headers = HttpHeaders::new();
        assert!(matches!(
            headers.add("bad name", "v"),
            Err(Error::InvalidHeader(_))
        ));
        assert!(matches!(
            headers.add("name", "line\nbreak"),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_debug_hides_values() {
        let mut headers = HttpHeaders::new();
        headers.set("authorization", "Bearer secret").unwrap();
        let debug = format!("{:?}", headers);
        assert!(debug.contains("authorization"));
        assert!(!debug.contains("secret"));
    }
}
