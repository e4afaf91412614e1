//! Key folding for backend records.
//!
//! The backend is Mongo-backed: documents carry `_id`, and when the `id`
//! virtual is enabled they carry both. A plain serde alias rejects the second
//! shape as a duplicate field, so record types fold the legacy key into the
//! canonical one before the derived deserializer sees the document.
//!
//! Types opt in with `#[serde(remote = "Self")]` on their derive and a
//! [`record_keys!`](crate::record_keys) invocation naming the key pairs.

use serde_json::Value;

/// Move `legacy` into `canonical` unless `canonical` is already present.
///
/// The legacy entry is always dropped. Non-object values are left untouched.
pub fn fold_key(value: &mut Value, canonical: &str, legacy: &str) {
    let Value::Object(map) = value else {
        return;
    };
    if let Some(folded) = map.remove(legacy) {
        map.entry(canonical).or_insert(folded);
    }
}

/// Implement `Serialize`/`Deserialize` for a `#[serde(remote = "Self")]`
/// record, folding each `"canonical" <- "legacy"` pair on the way in.
///
/// ```
/// use brimline_core::record_keys;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// #[serde(remote = "Self")]
/// struct Doc {
///     id: String,
/// }
///
/// record_keys!(Doc, "id" <- "_id");
///
/// let both: Doc = serde_json::from_str(r#"{"_id":"a","id":"b"}"#).unwrap();
/// assert_eq!(both.id, "b");
/// let legacy: Doc = serde_json::from_str(r#"{"_id":"a"}"#).unwrap();
/// assert_eq!(legacy.id, "a");
/// ```
#[macro_export]
macro_rules! record_keys {
    ($name:ident $(, $canonical:literal <- $legacy:literal)+ $(,)?) => {
        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                $name::serialize(self, serializer)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let mut value =
                    <::serde_json::Value as ::serde::Deserialize>::deserialize(deserializer)?;
                $( $crate::types::record::fold_key(&mut value, $canonical, $legacy); )+
                $name::deserialize(value).map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }
    };
}
