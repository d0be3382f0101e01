// SPDX-License-Identifier: MIT OR Apache-2.0
//! Opaque string identifiers.
//!
//! Every entity is keyed by a string id. Freshly created entities get a
//! random UUID; imported documents may carry any string.

/// Declare a string-backed identifier newtype.
///
/// The generated type orders lexicographically, serializes as a bare string
/// and can be built from `&str`/`String` for documents and tests.
#[macro_export]
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        #[allow(clippy::new_without_default)]
        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self($crate::id::fresh_id())
            }

            /// Borrow the raw id string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

/// Generate a fresh globally unique id string.
pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    crate::string_id!(
        /// Id used only by these tests
        SampleId
    );

    #[test]
    fn test_fresh_ids_are_unique() {
        let a = SampleId::new();
        let b = SampleId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = SampleId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert_eq!(id.to_string(), "abc");
    }
}
