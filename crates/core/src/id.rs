//! Identifiers for qualtrack entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identifier of a curriculum task, formatted `<category>-<seq>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap a raw task id. No format check happens here; schedules validate
    /// their own ids when built.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the id for `seq` within `category`.
    pub fn for_category(category: CategoryId, seq: u32) -> Self {
        Self(format!("{}-{}", category.0, seq))
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric category prefix, if the id is well-formed.
    pub fn category(&self) -> Option<CategoryId> {
        let (prefix, seq) = self.0.split_once('-')?;
        seq.parse::<u32>().ok()?;
        prefix.parse().ok().map(CategoryId)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Identifier of a curriculum category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u32);

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an enrolled student.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Wrap a raw student id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a person acting on the system (student, evaluator or admin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Wrap a raw actor id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique identifier for a Signoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignoffId(Ulid);

impl SignoffId {
    /// Generate a new SignoffId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SignoffId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SignoffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SignoffId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_category_prefix() {
        assert_eq!(TaskId::new("3-12").category(), Some(CategoryId(3)));
        assert_eq!(TaskId::for_category(CategoryId(8), 1).as_str(), "8-1");
    }

    #[test]
    fn test_task_id_malformed_has_no_category() {
        assert_eq!(TaskId::new("abc").category(), None);
        assert_eq!(TaskId::new("x-1").category(), None);
        assert_eq!(TaskId::new("1-").category(), None);
    }

    #[test]
    fn test_signoff_id_roundtrips_through_display() {
        let id = SignoffId::new();
        let parsed: SignoffId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
