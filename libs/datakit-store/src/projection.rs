//! Projection building.
//!
//! Backends include the native key field by default; when the caller did
//! not ask for the logical identifier, the key must be suppressed
//! explicitly to keep the output shape consistent with the identifier
//! convention.

use bson::Document;

use crate::ident::{IdentifierMap, NATIVE_KEY};

/// Convert a list of desired field names into a native inclusion
/// projection.
///
/// `None` or an empty list means "no projection": all fields come back,
/// including the native key. Duplicate field names collapse.
#[must_use]
pub fn build_projection(fields: Option<&[String]>, ident: &IdentifierMap) -> Option<Document> {
    let fields = fields?;
    if fields.is_empty() {
        return None;
    }
    let mut projection = Document::new();
    for field in fields {
        projection.insert(ident.to_native(field), 1_i32);
    }
    if !projection.contains_key(NATIVE_KEY) {
        projection.insert(NATIVE_KEY, 0_i32);
    }
    Some(projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn absent_and_empty_lists_mean_no_projection() {
        let ident = IdentifierMap::new("id");
        assert_eq!(build_projection(None, &ident), None);
        assert_eq!(build_projection(Some(&[]), &ident), None);
    }

    #[test]
    fn logical_identifier_is_included_as_native_key() {
        let ident = IdentifierMap::new("id");
        let projection = build_projection(Some(&fields(&["id", "name"])), &ident);
        assert_eq!(projection, Some(doc! { "_id": 1, "name": 1 }));
    }

    #[test]
    fn native_key_is_excluded_when_not_requested() {
        let ident = IdentifierMap::new("id");
        let projection = build_projection(Some(&fields(&["name", "score"])), &ident);
        assert_eq!(projection, Some(doc! { "name": 1, "score": 1, "_id": 0 }));
    }

    #[test]
    fn duplicate_fields_collapse() {
        let ident = IdentifierMap::none();
        let projection = build_projection(Some(&fields(&["name", "name"])), &ident);
        assert_eq!(projection, Some(doc! { "name": 1, "_id": 0 }));
    }
}
