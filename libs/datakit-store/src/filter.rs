//! Condition translation into the backend's native filter representation.
//!
//! Translation is a pure, total function over the decoded
//! [`Condition`] AST: every operator was vetted at the wire boundary, so
//! nothing here can fail. An absent or empty condition list yields the
//! empty filter, which matches everything.

use bson::{Bson, Document};

use crate::condition::{Combinator, Condition};
use crate::ident::IdentifierMap;

/// Translate a caller-supplied condition list into a native filter.
///
/// Top-level conditions are joined with `$and`, matching the wire
/// convention that a `where` payload is a conjunction.
#[must_use]
pub fn translate(conditions: Option<&[Condition]>, ident: &IdentifierMap) -> Document {
    match conditions {
        Some(conditions) => translate_group(Combinator::And, conditions, ident),
        None => Document::new(),
    }
}

fn translate_group(
    combinator: Combinator,
    operands: &[Condition],
    ident: &IdentifierMap,
) -> Document {
    // An empty group is "no constraint"; backends reject an empty
    // combinator node, so emit the match-all filter instead.
    if operands.is_empty() {
        return Document::new();
    }
    let translated: Vec<Bson> = operands
        .iter()
        .map(|operand| Bson::Document(translate_condition(operand, ident)))
        .collect();
    let mut filter = Document::new();
    filter.insert(combinator.native(), translated);
    filter
}

fn translate_condition(condition: &Condition, ident: &IdentifierMap) -> Document {
    match condition {
        Condition::Compare { field, op, value } => {
            let mut comparison = Document::new();
            comparison.insert(op.native(), value.clone());
            let mut filter = Document::new();
            filter.insert(ident.to_native(field), comparison);
            filter
        }
        Condition::Group {
            combinator,
            operands,
        } => translate_group(*combinator, operands, ident),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::CompareOp;
    use bson::doc;

    fn no_ident() -> IdentifierMap {
        IdentifierMap::none()
    }

    #[test]
    fn absent_conditions_match_all() {
        assert_eq!(translate(None, &no_ident()), Document::new());
    }

    #[test]
    fn empty_list_matches_all() {
        assert_eq!(translate(Some(&[]), &no_ident()), Document::new());
    }

    #[test]
    fn empty_group_matches_all() {
        let conds = [Condition::and(vec![])];
        assert_eq!(
            translate(Some(&conds), &no_ident()),
            doc! { "$and": [{}] }
        );
    }

    #[test]
    fn shorthand_and_explicit_equality_translate_identically() {
        let shorthand = [Condition::eq("name", "bob")];
        let explicit = [Condition::compare("name", CompareOp::Eq, "bob")];
        assert_eq!(
            translate(Some(&shorthand), &no_ident()),
            translate(Some(&explicit), &no_ident())
        );
    }

    #[test]
    fn each_operator_maps_to_its_native_token() {
        let cases = [
            (CompareOp::Eq, "$eq"),
            (CompareOp::Gt, "$gt"),
            (CompareOp::Gte, "$gte"),
            (CompareOp::Lt, "$lt"),
            (CompareOp::Lte, "$lte"),
        ];
        for (op, native) in cases {
            let conds = [Condition::compare("score", op, 5_i64)];
            let mut comparison = Document::new();
            comparison.insert(native, 5_i64);
            let expected = doc! { "$and": [{ "score": comparison }] };
            assert_eq!(translate(Some(&conds), &no_ident()), expected);
        }
    }

    #[test]
    fn logical_identifier_is_rewritten() {
        let ident = IdentifierMap::new("id");
        let conds = [Condition::eq("id", "abc")];
        assert_eq!(
            translate(Some(&conds), &ident),
            doc! { "$and": [{ "_id": { "$eq": "abc" } }] }
        );
    }

    #[test]
    fn nested_groups_translate_recursively() {
        let conds = [Condition::or(vec![
            Condition::compare("score", CompareOp::Gt, 100_i64),
            Condition::and(vec![
                Condition::eq("name", "bob"),
                Condition::compare("rank", CompareOp::Lte, 3_i64),
            ]),
        ])];
        let expected = doc! { "$and": [{ "$or": [
            { "score": { "$gt": 100_i64 } },
            { "$and": [
                { "name": { "$eq": "bob" } },
                { "rank": { "$lte": 3_i64 } },
            ]},
        ]}]};
        assert_eq!(translate(Some(&conds), &no_ident()), expected);
    }
}
