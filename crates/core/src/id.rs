// SPDX-License-Identifier: MIT

//! Integer-keyed identifiers for the three durable entities in §3 of the
//! specification. All three are SQLite `INTEGER PRIMARY KEY` rowids; the
//! newtypes exist so handlers and the scheduler can't accidentally compare
//! a `PipelineId` to a `ScheduleId`.

/// Defines an `i64`-backed newtype ID with the conversions the daemon needs:
/// `Display` (for the scheduler's string-keyed job registry, per spec §4.5),
/// `From<i64>`, and round-trip through `i64`.
macro_rules! define_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifies a `Pipeline` row.
    pub struct PipelineId;
}

define_id! {
    /// Identifies a `Schedule` row. Rendered as a string to key the
    /// in-memory scheduler job registry (spec §4.5).
    pub struct ScheduleId;
}

define_id! {
    /// Identifies a `Run` row.
    pub struct RunId;
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
