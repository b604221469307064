//! Logical-identifier remapping.
//!
//! Callers address a record's primary key by a logical name (say `"id"`)
//! that is independent of the storage engine's native key field. The map is
//! applied uniformly by the condition translator, the record codec and the
//! projection builder.

/// The storage engine's own primary-key field.
pub const NATIVE_KEY: &str = "_id";

/// Optional rename between a logical identifier and [`NATIVE_KEY`].
///
/// With no logical name configured, field names pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    logical: Option<String>,
}

impl IdentifierMap {
    /// Map the given logical field name to the native key field.
    pub fn new(logical: impl Into<String>) -> Self {
        Self {
            logical: Some(logical.into()),
        }
    }

    /// No remapping performed.
    #[must_use]
    pub fn none() -> Self {
        Self { logical: None }
    }

    /// The configured logical identifier, if any.
    #[must_use]
    pub fn logical(&self) -> Option<&str> {
        self.logical.as_deref()
    }

    /// Rewrite a field name for the backend: the logical identifier becomes
    /// [`NATIVE_KEY`], every other field passes through.
    #[must_use]
    pub fn to_native<'a>(&self, field: &'a str) -> &'a str {
        match &self.logical {
            Some(logical) if logical == field => NATIVE_KEY,
            _ => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_field_maps_to_native_key() {
        let ident = IdentifierMap::new("id");
        assert_eq!(ident.to_native("id"), NATIVE_KEY);
        assert_eq!(ident.to_native("username"), "username");
    }

    #[test]
    fn unmapped_fields_pass_through() {
        let ident = IdentifierMap::none();
        assert_eq!(ident.to_native("id"), "id");
        assert_eq!(ident.to_native(NATIVE_KEY), NATIVE_KEY);
    }
}
