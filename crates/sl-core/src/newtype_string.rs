//! Macro for defining identifier newtypes over `String`.
//!
//! Identifiers are trimmed on construction and must not be empty afterwards.

/// Define a trimmed, non-empty string identifier.
///
/// Generates `try_new()` (returns `Option`), `new()` (panics on empty),
/// `as_str()`, plus `Display`, `Deref<Target=str>`, `Borrow<str>`,
/// `PartialEq<&str>` and serde impls that enforce the invariant.
macro_rules! define_newtype_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::try_new(s).ok_or_else(|| {
                    serde::de::Error::custom(concat!(stringify!($Name), " must not be blank"))
                })
            }
        }

        impl $Name {
            /// Create a new identifier, panicking if it is blank.
            ///
            /// Prefer [`try_new`](Self::try_new) for untrusted input.
            pub fn new(name: impl Into<String>) -> Self {
                Self::try_new(name).expect(concat!(stringify!($Name), " must not be blank"))
            }

            /// Trim `name` and wrap it, returning `None` when nothing is left.
            pub fn try_new(name: impl Into<String>) -> Option<Self> {
                let s = name.into();
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else if trimmed.len() == s.len() {
                    Some(Self(s))
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

pub(crate) use define_newtype_string;
