//! Newtype IDs for type-safe record references.
//!
//! Record identifiers are opaque strings assigned by the document store.
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! mixing IDs from different collections (a `ToyId` cannot be passed where
//! an `ElfId` is expected).

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use santas_workshop_core::define_id;
/// define_id!(SleighId);
/// define_id!(ReindeerId);
///
/// let sleigh = SleighId::new("s-1");
/// let reindeer = ReindeerId::new("s-1");
///
/// // These are different types, so this won't compile:
/// // let _: SleighId = reindeer;
/// assert_eq!(sleigh.as_str(), reindeer.as_str());
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
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the identifier is empty (or whitespace only).
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Record IDs, one per collection.
define_id!(ToyId);
define_id!(OrderId);
define_id!(ElfId);

// Identity of a signed-in user, also the key of their role record.
define_id!(UserId);

// Anonymous per-session identity substitute (`anon_<millis>_<suffix>`).
define_id!(SessionId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let id = ToyId::new("t1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"t1\"");

        let parsed: ToyId = serde_json::from_str("\"t1\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_is_blank() {
        assert!(ToyId::new("").is_blank());
        assert!(ToyId::new("   ").is_blank());
        assert!(!ToyId::new("t1").is_blank());
    }

    #[test]
    fn test_display_and_conversions() {
        let id = SessionId::from("anon_1_abc");
        assert_eq!(id.to_string(), "anon_1_abc");
        assert_eq!(String::from(id), "anon_1_abc");
    }
}
