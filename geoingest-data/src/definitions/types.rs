//! Typed wrappers for definition service endpoints.

use std::{fmt, ops::Deref};

use geoingest_core::CrsCode;

/// Base URL of a definition service, always ending in a single `/`.
///
/// # Examples
/// ```
/// # use geoingest_data::definitions::BaseUrl;
/// let url = BaseUrl::new("https://maps.example.org/proj4def/");
/// assert_eq!(url.as_ref(), "https://maps.example.org/proj4def/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Construct a new [`BaseUrl`] from an owned or borrowed string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The request URL for `code`, formed by appending it to the base.
    #[must_use]
    pub fn definition_url(&self, code: &CrsCode) -> DefinitionUrl {
        DefinitionUrl::new(format!("{}{code}", self.0))
    }

    /// Consume the wrapper and return the inner [`String`].
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for BaseUrl {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for BaseUrl {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified URL of one projection definition.
///
/// # Examples
/// ```
/// # use geoingest_core::CrsCode;
/// # use geoingest_data::definitions::BaseUrl;
/// let url = BaseUrl::from("https://maps.example.org/proj4def/").definition_url(&CrsCode::epsg(3112));
/// assert_eq!(url.as_ref(), "https://maps.example.org/proj4def/EPSG:3112");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionUrl(String);

impl DefinitionUrl {
    /// Construct a new [`DefinitionUrl`] from an owned or borrowed string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Consume the wrapper and return the inner [`String`].
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for DefinitionUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for DefinitionUrl {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for DefinitionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
