use std::collections::HashMap;

use crate::value::Row;

/// Group label for rows where the field is absent or blank.
pub const NONE_LABEL: &str = "(none)";

/// Count rows per distinct value of `field`, in first-seen order.
pub fn count_by<'a, I>(rows: I, field: &str) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let key = match row.get(field) {
            Some(v) if !v.is_blank() => v.as_text(),
            _ => NONE_LABEL.to_string(),
        };
        match positions.get(&key) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts
}

/// Sum of numeric values of `field`; non-numeric values are skipped.
pub fn sum_by<'a, I>(rows: I, field: &str) -> f64
where
    I: IntoIterator<Item = &'a Row>,
{
    rows.into_iter()
        .filter_map(|row| row.get(field).and_then(|v| v.as_f64()))
        .sum()
}
