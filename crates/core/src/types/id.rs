//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create validated string ID wrappers that
//! prevent accidentally mixing IDs from different entity types. IDs end up in
//! URL path segments and storage keys, so construction rejects values that
//! would be ambiguous there.

/// Errors that can occur when parsing an ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input is empty or only whitespace.
    #[error("id cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a path separator.
    #[error("id cannot contain '/'")]
    PathSeparator,
    /// The input is `.` or `..`.
    #[error("id cannot be a dot segment")]
    DotSegment,
}

/// Maximum length of any ID, in bytes.
pub const MAX_ID_LENGTH: usize = 128;

/// Validate a raw ID string, returning the trimmed value.
///
/// # Errors
///
/// Returns an error if the trimmed input is empty, longer than
/// [`MAX_ID_LENGTH`], contains `/`, or is `.` or `..`.
pub fn validate_id(raw: &str) -> Result<&str, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty);
    }
    if trimmed.len() > MAX_ID_LENGTH {
        return Err(IdError::TooLong {
            max: MAX_ID_LENGTH,
        });
    }
    if trimmed.contains('/') {
        return Err(IdError::PathSeparator);
    }
    if matches!(trimmed, "." | "..") {
        return Err(IdError::DotSegment);
    }
    Ok(trimmed)
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` as a plain string, validated on input
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()`, `as_str()`, `into_inner()`
/// - `Display`, `FromStr`, `AsRef<str>` and `TryFrom<String>`
///
/// # Example
///
/// ```rust
/// # use marketplace_core::define_id;
/// define_id!(SellerId);
/// define_id!(OrderId);
///
/// let seller = SellerId::parse("s-1").unwrap();
/// let order = OrderId::parse("s-1").unwrap();
///
/// // These are different types, so this won't compile:
/// // let _: SellerId = order;
/// assert_eq!(seller.as_str(), order.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an ID, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns an error if the value is empty, too long, contains `/`,
            /// or is a dot segment.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::IdError> {
                $crate::validate_id(raw).map(|id| Self(id.to_owned()))
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the ID and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl ::core::convert::TryFrom<String> for $name {
            type Error = $crate::IdError;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(UserId);
define_id!(ProductId);
