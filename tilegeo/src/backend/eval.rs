//! Request evaluation shared by the backends.
//!
//! Filter, compute distance and score, sort (stable), limit, project.

use super::request::{Direction, OrderKey, QueryRequest, Scoring, SortKey};
use super::types::AddressRecord;
use crate::geo::haversine_m;
use crate::text::token_similarity;
use std::cmp::Ordering;

/// Evaluates `request` over `rows`.
pub fn evaluate(rows: Vec<AddressRecord>, request: &QueryRequest) -> Vec<AddressRecord> {
    evaluate_with(rows, request, |_| Some(0.0), false)
}

/// Evaluates `request` with an external relevance function.
///
/// Rows for which `score` returns `None` are dropped. Used by ranked search,
/// where rows without any matching term are not results.
pub fn evaluate_scored<F>(rows: Vec<AddressRecord>, request: &QueryRequest, score: F) -> Vec<AddressRecord>
where
    F: Fn(&AddressRecord) -> Option<f64>,
{
    evaluate_with(rows, request, score, true)
}

fn evaluate_with<F>(
    rows: Vec<AddressRecord>,
    request: &QueryRequest,
    external: F,
    use_external: bool,
) -> Vec<AddressRecord>
where
    F: Fn(&AddressRecord) -> Option<f64>,
{
    let mut out: Vec<AddressRecord> = Vec::with_capacity(rows.len());

    for mut row in rows {
        if !request.predicate.matches(&row) {
            continue;
        }

        if let Some((lat, lon)) = request.distance_from {
            row.distance_m = Some(haversine_m(lat, lon, row.latitude, row.longitude));
        }

        if use_external {
            match external(&row) {
                Some(score) => row.score = Some(score),
                None => continue,
            }
        } else if let Some(Scoring::Similarity { column, query }) = &request.scoring {
            let field = row.text(*column).unwrap_or("");
            row.score = Some(token_similarity(query, field));
        }

        out.push(row);
    }

    if !request.order.is_empty() {
        out.sort_by(|a, b| compare_rows(a, b, &request.order));
    }

    if let Some(limit) = request.limit {
        out.truncate(limit);
    }

    for row in &mut out {
        row.retain_columns(&request.columns);
    }

    out
}

/// Compares two rows by a list of keys. Missing values sort last in either
/// direction.
pub fn compare_rows(a: &AddressRecord, b: &AddressRecord, order: &[OrderKey]) -> Ordering {
    for key in order {
        let ord = match key.key {
            SortKey::Distance => compare_optional(a.distance_m, b.distance_m, key.direction, cmp_f64),
            SortKey::Score => compare_optional(a.score, b.score, key.direction, cmp_f64),
            SortKey::Column(column) => {
                compare_optional(a.text(column), b.text(column), key.direction, compare_text)
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn compare_optional<T, C>(a: Option<T>, b: Option<T>, direction: Direction, cmp: C) -> Ordering
where
    C: Fn(&T, &T) -> Ordering,
{
    match (a, b) {
        (Some(x), Some(y)) => match direction {
            Direction::Asc => cmp(&x, &y),
            Direction::Desc => cmp(&y, &x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_f64(a: &f64, b: &f64) -> Ordering {
    a.total_cmp(b)
}

/// Text comparison that orders digit-only values numerically, so that
/// house number "9" sorts before "10". Digit-only values sort before
/// mixed values.
pub fn compare_text(a: &&str, b: &&str) -> Ordering {
    let (a, b) = (a.trim(), b.trim());
    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn numeric_value(s: &str) -> Option<u128> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
