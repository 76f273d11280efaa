//! Type-safe identifier wrappers for participants and events.
//!
//! Both identifiers originate in the surrounding convention-planner web
//! application (they are database keys, not values the engine mints), so
//! they wrap [`String`] rather than a UUID type. The newtypes exist to
//! prevent accidental mixing of participant and event identifiers at
//! compile time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return whether the identifier is the empty string.
            ///
            /// Empty identifiers show up in malformed input rows and are
            /// dropped during normalization.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Consume the wrapper and return the inner [`String`].
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a roster participant.
    ParticipantId
}

define_id! {
    /// Unique identifier for a convention event.
    EventId
}
