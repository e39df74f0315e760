//! Validated text types shared across the intake workspace.
//!
//! Form input arrives as loosely-typed strings. The types here are the points where a
//! required value is checked once, so the rest of the code can hold a value that is known to
//! be present.

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// A required field was empty or whitespace only.
    #[error("{field} is required")]
    Missing { field: &'static str },
    /// A clinic id contained characters outside `[A-Za-z0-9_-]`.
    #[error("clinic id contains invalid characters: {0}")]
    InvalidClinicId(String),
}

/// A trimmed, non-empty value for a named form field.
///
/// The field name is carried only in the error so that a rejected form can say which input
/// was missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequiredText(String);

impl RequiredText {
    /// Trims `input` and rejects it when nothing is left.
    pub fn new(field: &'static str, input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Missing { field });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for RequiredText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequiredText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of the clinic that owns a submission.
///
/// Stamped on every record at creation and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClinicId(String);

impl ClinicId {
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let value = RequiredText::new("clinic id", input)?.into_inner();
        let ok = value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'));
        if !ok {
            return Err(TextError::InvalidClinicId(value));
        }
        Ok(Self(value))
    }

    /// Wrap a built-in constant without validating it. Callers test their constants with
    /// [`ClinicId::parse`].
    pub fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClinicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for ClinicId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for ClinicId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ClinicId::parse(&s).map_err(serde::de::Error::custom)
    }
}
