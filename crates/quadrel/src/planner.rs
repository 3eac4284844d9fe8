//! The pattern planner.
//!
//! Given a [`QuadPattern`], the planner selects the narrowing predicate for
//! the single wide `quads` relation: which key columns to filter on, in what
//! order, and whether the flavor disambiguator applies.
//!
//! The dispatch is a static lookup table over the sixteen subsets of the
//! four independent filter axes `{context, subject, predicate, value}`,
//! where the value axis stands for the mutually exclusive resource-object /
//! literal-object slots. Keeping all sixteen cases in one table (rather
//! than folding filters together generically) keeps the single most
//! important correctness rule auditable: every entry that binds the value
//! axis also applies the flavor equality filter, because a resource and a
//! literal may share an object key.
//!
//! Filters are equality on the integer key columns only. The text columns
//! exist to reconstruct terms on read and are never filtered on.

use crate::dialect::{
    SqlDialect, COL_CONTEXT_KEY, COL_OBJECT_KEY, COL_PREDICATE_KEY, COL_SUBJECT_KEY,
};
use crate::{Error, QuadPattern, Result};
use std::fmt::Write as _;

/// One filter axis of the `quads` relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Context,
    Subject,
    Predicate,
    /// The object slot, resource- or literal-flavored.
    Value,
}

impl Axis {
    fn column(self) -> &'static str {
        match self {
            Self::Context => COL_CONTEXT_KEY,
            Self::Subject => COL_SUBJECT_KEY,
            Self::Predicate => COL_PREDICATE_KEY,
            Self::Value => COL_OBJECT_KEY,
        }
    }
}

/// One row of the dispatch table.
pub(crate) struct PlanEntry {
    /// Collapsed signature: bound axes in insertion order, with both the
    /// `O` and `L` slots written as `V`.
    pub signature: &'static str,
    /// Key columns to filter on, in signature order.
    pub axes: &'static [Axis],
    /// Whether the flavor equality filter is appended. Must be `true`
    /// exactly when [`axes`](Self::axes) binds [`Axis::Value`].
    pub flavor_filter: bool,
}

/// The sixteen cases: every subset of `{C, S, P, V}`, the empty subset
/// planning an unfiltered scan.
pub(crate) static PLAN_TABLE: [PlanEntry; 16] = [
    PlanEntry { signature: "", axes: &[], flavor_filter: false },
    PlanEntry { signature: "C", axes: &[Axis::Context], flavor_filter: false },
    PlanEntry { signature: "S", axes: &[Axis::Subject], flavor_filter: false },
    PlanEntry { signature: "P", axes: &[Axis::Predicate], flavor_filter: false },
    PlanEntry { signature: "V", axes: &[Axis::Value], flavor_filter: true },
    PlanEntry { signature: "CS", axes: &[Axis::Context, Axis::Subject], flavor_filter: false },
    PlanEntry { signature: "CP", axes: &[Axis::Context, Axis::Predicate], flavor_filter: false },
    PlanEntry { signature: "CV", axes: &[Axis::Context, Axis::Value], flavor_filter: true },
    PlanEntry { signature: "SP", axes: &[Axis::Subject, Axis::Predicate], flavor_filter: false },
    PlanEntry { signature: "SV", axes: &[Axis::Subject, Axis::Value], flavor_filter: true },
    PlanEntry { signature: "PV", axes: &[Axis::Predicate, Axis::Value], flavor_filter: true },
    PlanEntry { signature: "CSP", axes: &[Axis::Context, Axis::Subject, Axis::Predicate], flavor_filter: false },
    PlanEntry { signature: "CSV", axes: &[Axis::Context, Axis::Subject, Axis::Value], flavor_filter: true },
    PlanEntry { signature: "CPV", axes: &[Axis::Context, Axis::Predicate, Axis::Value], flavor_filter: true },
    PlanEntry { signature: "SPV", axes: &[Axis::Subject, Axis::Predicate, Axis::Value], flavor_filter: true },
    PlanEntry { signature: "CSPV", axes: &[Axis::Context, Axis::Subject, Axis::Predicate, Axis::Value], flavor_filter: true },
];

/// A planned predicate: WHERE-clause text plus its bound parameters.
///
/// An empty clause means the pattern was a wildcard and plans a full scan.
#[derive(Debug)]
pub(crate) struct Plan {
    /// Collapsed signature the plan was selected by.
    pub signature: &'static str,
    /// The WHERE-clause body, without the `WHERE` keyword. Empty for a
    /// full scan.
    pub clause: String,
    /// Parameter values in clause order.
    pub params: Vec<i64>,
}

impl Plan {
    /// `true` if the plan filters nothing.
    pub fn is_full_scan(&self) -> bool {
        self.clause.is_empty()
    }
}

/// Builds the plan for a pattern against a dialect.
pub(crate) fn plan(pattern: &QuadPattern, dialect: &dyn SqlDialect) -> Result<Plan> {
    let mut collapsed = String::with_capacity(4);
    if pattern.context.is_some() {
        collapsed.push('C');
    }
    if pattern.subject.is_some() {
        collapsed.push('S');
    }
    if pattern.predicate.is_some() {
        collapsed.push('P');
    }
    if pattern.bound_object().is_some() {
        collapsed.push('V');
    }

    let entry = PLAN_TABLE
        .iter()
        .find(|e| e.signature == collapsed)
        .ok_or_else(|| Error::Operation(format!("no plan for signature {:?}", collapsed)))?;

    let mut clause = String::new();
    let mut params = Vec::with_capacity(entry.axes.len() + 1);

    for axis in entry.axes {
        let key = axis_key(pattern, *axis)
            .ok_or_else(|| Error::Operation(format!("unbound axis in signature {:?}", collapsed)))?;
        if !clause.is_empty() {
            clause.push_str(" AND ");
        }
        let _ = write!(
            clause,
            "{} = {}",
            axis.column(),
            dialect.placeholder(params.len() + 1)
        );
        params.push(key);
    }

    if entry.flavor_filter {
        let flavor = pattern
            .bound_object()
            .map(|o| o.flavor())
            .ok_or_else(|| Error::Operation(format!("flavor filter without bound object in signature {:?}", collapsed)))?;
        let _ = write!(
            clause,
            " AND {} = {}",
            crate::dialect::COL_FLAVOR,
            dialect.placeholder(params.len() + 1)
        );
        params.push(flavor.as_i64());
    }

    log::trace!(
        "planned signature {} ({} filters) for pattern {}",
        entry.signature,
        params.len(),
        pattern.signature()
    );

    Ok(Plan {
        signature: entry.signature,
        clause,
        params,
    })
}

fn axis_key(pattern: &QuadPattern, axis: Axis) -> Option<i64> {
    match axis {
        Axis::Context => pattern.context.as_ref().map(|t| t.key()),
        Axis::Subject => pattern.subject.as_ref().map(|t| t.key()),
        Axis::Predicate => pattern.predicate.as_ref().map(|t| t.key()),
        Axis::Value => pattern.bound_object().map(|o| o.term().key()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqliteDialect;
    use crate::{Flavor, Term};

    fn term(text: &str) -> Term {
        Term::new(text).unwrap()
    }

    #[test]
    fn test_table_covers_all_subsets_exactly_once() {
        let mut signatures: Vec<&str> = PLAN_TABLE.iter().map(|e| e.signature).collect();
        signatures.sort_unstable();
        signatures.dedup();
        assert_eq!(signatures.len(), 16);
    }

    #[test]
    fn test_flavor_filter_iff_value_axis() {
        for entry in &PLAN_TABLE {
            let binds_value = entry.axes.contains(&Axis::Value);
            assert_eq!(
                entry.flavor_filter, binds_value,
                "signature {:?} has inconsistent flavor rule",
                entry.signature
            );
        }
    }

    #[test]
    fn test_wildcard_plans_full_scan() {
        let plan = plan(&QuadPattern::any(), &SqliteDialect).unwrap();
        assert!(plan.is_full_scan());
        assert!(plan.params.is_empty());
        assert_eq!(plan.signature, "");
    }

    #[test]
    fn test_context_subject_clause() {
        let pattern = QuadPattern::context(term("c")).with_subject(term("s"));
        let plan = plan(&pattern, &SqliteDialect).unwrap();
        assert_eq!(plan.clause, "context_key = ?1 AND subject_key = ?2");
        assert_eq!(plan.params, vec![term("c").key(), term("s").key()]);
    }

    #[test]
    fn test_object_binding_adds_flavor() {
        let pattern = QuadPattern::object(term("o"));
        let plan = plan(&pattern, &SqliteDialect).unwrap();
        assert_eq!(plan.clause, "object_key = ?1 AND flavor = ?2");
        assert_eq!(plan.params, vec![term("o").key(), Flavor::Resource.as_i64()]);

        let pattern = QuadPattern::literal(term("o"));
        let plan = super::plan(&pattern, &SqliteDialect).unwrap();
        assert_eq!(plan.params[1], Flavor::Literal.as_i64());
    }

    #[test]
    fn test_fully_bound_clause() {
        let pattern = QuadPattern::context(term("c"))
            .with_subject(term("s"))
            .with_predicate(term("p"))
            .with_literal(term("o"));
        let plan = plan(&pattern, &SqliteDialect).unwrap();
        assert_eq!(plan.signature, "CSPV");
        assert_eq!(
            plan.clause,
            "context_key = ?1 AND subject_key = ?2 AND predicate_key = ?3 \
             AND object_key = ?4 AND flavor = ?5"
        );
        assert_eq!(plan.params.len(), 5);
    }

    // Every non-empty subset resolves and its filter count matches the
    // number of bound slots (plus flavor when the object axis is bound).
    #[test]
    fn test_every_signature_plans() {
        for use_context in [false, true] {
            for use_subject in [false, true] {
                for use_predicate in [false, true] {
                    for object_slot in [0u8, 1, 2] {
                        let mut pattern = QuadPattern::any();
                        let mut expected = 0;
                        if use_context {
                            pattern = pattern.with_context(term("c"));
                            expected += 1;
                        }
                        if use_subject {
                            pattern = pattern.with_subject(term("s"));
                            expected += 1;
                        }
                        if use_predicate {
                            pattern = pattern.with_predicate(term("p"));
                            expected += 1;
                        }
                        match object_slot {
                            1 => {
                                pattern = pattern.with_object(term("o"));
                                expected += 2;
                            }
                            2 => {
                                pattern = pattern.with_literal(term("l"));
                                expected += 2;
                            }
                            _ => {}
                        }

                        let plan = plan(&pattern, &SqliteDialect).unwrap();
                        assert_eq!(
                            plan.params.len(),
                            expected,
                            "signature {:?}",
                            pattern.signature()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_no_text_columns_in_clauses() {
        let pattern = QuadPattern::context(term("c"))
            .with_subject(term("s"))
            .with_predicate(term("p"))
            .with_object(term("o"));
        let plan = plan(&pattern, &SqliteDialect).unwrap();
        assert!(!plan.clause.contains("_text"));
    }
}
