//! Record encoding between application and storage representation.

use bson::{Bson, Document};

use crate::ident::{IdentifierMap, NATIVE_KEY};

/// Applies the identifier convention to whole records.
///
/// `decode(encode(r)) == r` whenever no null-key or opaque-id
/// normalization is involved.
#[derive(Debug, Clone)]
pub struct RecordCodec {
    ident: IdentifierMap,
}

impl RecordCodec {
    #[must_use]
    pub fn new(ident: IdentifierMap) -> Self {
        Self { ident }
    }

    /// Encode a record for storage: rename the logical identifier to the
    /// native key field, and drop the key entirely when its value is the
    /// nil sentinel so the backend assigns one.
    #[must_use]
    pub fn encode(&self, mut record: Document) -> Document {
        if let Some(logical) = self.ident.logical() {
            if let Some(value) = record.remove(logical) {
                record.insert(NATIVE_KEY, value);
            }
        }
        if record.get(NATIVE_KEY) == Some(&Bson::Null) {
            record.remove(NATIVE_KEY);
        }
        record
    }

    /// Decode a stored record: stringify an opaque backend-generated key,
    /// then rename the native key field back to the logical identifier.
    #[must_use]
    pub fn decode(&self, mut record: Document) -> Document {
        if let Some(Bson::ObjectId(oid)) = record.get(NATIVE_KEY) {
            let hex = oid.to_hex();
            record.insert(NATIVE_KEY, hex);
        }
        if let Some(logical) = self.ident.logical() {
            if let Some(value) = record.remove(NATIVE_KEY) {
                record.insert(logical, value);
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use bson::{doc, oid::ObjectId};

    fn codec() -> RecordCodec {
        RecordCodec::new(IdentifierMap::new("id"))
    }

    #[test]
    fn encode_renames_logical_identifier() {
        let encoded = codec().encode(doc! { "id": "abc", "name": "bob" });
        assert_eq!(encoded, doc! { "_id": "abc", "name": "bob" });
    }

    #[test]
    fn encode_drops_nil_key() {
        let encoded = codec().encode(doc! { "id": Bson::Null, "username": "bob" });
        assert_eq!(encoded, doc! { "username": "bob" });
    }

    #[test]
    fn decode_stringifies_opaque_key() {
        let oid = ObjectId::new();
        let decoded = codec().decode(doc! { "_id": oid, "name": "bob" });
        assert_eq!(decoded.get_str("id").unwrap(), oid.to_hex());
    }

    #[test]
    fn roundtrip_without_normalization_is_identity() {
        let record = doc! { "id": "abc", "name": "bob", "score": 7_i64 };
        assert_eq!(codec().decode(codec().encode(record.clone())), record);
    }

    #[test]
    fn no_mapping_leaves_records_untouched() {
        let codec = RecordCodec::new(IdentifierMap::none());
        let record = doc! { "_id": "abc", "name": "bob" };
        assert_eq!(codec.encode(record.clone()), record);
        assert_eq!(codec.decode(record.clone()), record);
    }
}
