//! Ordering primitives for client-side record sorting.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Sort direction requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// How a field's values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKind {
    Numeric,
    Lexical,
}

/// A sortable column: the field path plus how to compare it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub kind: SortKind,
}

impl SortKey {
    pub fn numeric(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: SortKind::Numeric,
        }
    }

    pub fn lexical(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: SortKind::Lexical,
        }
    }
}

/// Build a comparator over records for `key`.
///
/// `None` and `Some(Asc)` keep natural order, `Some(Desc)` inverts it.
/// Equal keys compare `Equal`; pair with [`stable_sort`] for a stable result.
pub fn compare_by<R: Record>(
    key: &SortKey,
    direction: Option<SortDirection>,
) -> impl Fn(&R, &R) -> Ordering + '_ {
    move |a: &R, b: &R| {
        let ordering = match key.kind {
            SortKind::Numeric => {
                let left = a.field(&key.field).as_number();
                let right = b.field(&key.field).as_number();
                left.total_cmp(&right)
            }
            SortKind::Lexical => {
                let left = a.field(&key.field);
                let right = b.field(&key.field);
                left.as_text().cmp(&right.as_text())
            }
        };
        match direction {
            Some(SortDirection::Desc) => ordering.reverse(),
            Some(SortDirection::Asc) | None => ordering,
        }
    }
}

/// Sort into a new vector, leaving `records` untouched.
///
/// Each element is decorated with its input position, which breaks ties,
/// so equal keys keep their relative order in both directions.
pub fn stable_sort<T, F>(records: &[T], comparator: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let mut decorated: Vec<(usize, &T)> = records.iter().enumerate().collect();
    decorated.sort_unstable_by(|(ia, a), (ib, b)| comparator(a, b).then(ia.cmp(ib)));
    decorated.into_iter().map(|(_, record)| record.clone()).collect()
}
