//! Opaque state snapshots.
//!
//! The engine captures a snapshot (typically a serialized path condition)
//! whenever the sampling core asks for one. The core stores snapshots on
//! decision nodes and best results but never interprets them.

/// Owned, engine-defined snapshot bytes.
///
/// Cloning is a deep copy, so a stored snapshot is independent of whatever
/// the engine does to its live state afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StateSnapshot(Vec<u8>);

impl StateSnapshot {
    /// The empty snapshot (used for terminal nodes and unset best results).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lossy UTF-8 view, for logs.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for StateSnapshot {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}
