//! Macro for identifier newtypes that must be non-empty and unpadded.

/// Define a strongly-typed identifier wrapper around `String`.
///
/// The generated type rejects empty values and values with leading or
/// trailing whitespace, both at construction and during deserialization.
/// `$what` names the identifier in error messages.
macro_rules! define_identifier {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident, $what:literal;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl $Name {
            /// Validate and wrap `value`.
            pub fn parse(value: impl Into<String>) -> $crate::error::CoreResult<Self> {
                let value = value.into();
                if value.is_empty() {
                    return Err($crate::error::CoreError::ConfigInvalid {
                        message: concat!($what, " must not be empty").to_string(),
                    });
                }
                if value.trim() != value {
                    return Err($crate::error::CoreError::ConfigInvalid {
                        message: format!(concat!($what, " '{}' has surrounding whitespace"), value),
                    });
                }
                Ok(Self(value))
            }

            /// Like [`parse`](Self::parse) but discards the error.
            pub fn try_new(value: impl Into<String>) -> Option<Self> {
                Self::parse(value).ok()
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::parse(s).map_err(serde::de::Error::custom)
            }
        }

        impl std::str::FromStr for $Name {
            type Err = $crate::error::CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $Name {
            type Error = $crate::error::CoreError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl TryFrom<&str> for $Name {
            type Error = $crate::error::CoreError;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str { &self.0 }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str { &self.0 }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool { self.0 == other }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }
    };
}

pub(crate) use define_identifier;
