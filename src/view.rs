use crate::filter::{
    active_filters_count, build_predicate, FilterKind, FilterSpec, FilterValue, FilterValues,
};
use crate::value::Row;

/// Per-view selection state. The only state user interaction changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search: String,
    pub filters: FilterValues,
    pub selected: usize,
}

/// Values derived from rows + state. Recomputed on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedView {
    /// Indices into the source rows that pass every active constraint.
    pub indices: Vec<usize>,
    pub total: usize,
    pub active_filters: usize,
}

impl DerivedView {
    pub fn rows<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        self.indices.iter().filter_map(|&i| rows.get(i)).collect()
    }

    pub fn shown(&self) -> usize {
        self.indices.len()
    }
}

impl ViewState {
    pub fn derive(&self, rows: &[Row], specs: &[FilterSpec]) -> DerivedView {
        let predicate = build_predicate(specs, &self.filters, &self.search);
        DerivedView {
            indices: predicate.apply(rows),
            total: rows.len(),
            active_filters: active_filters_count(specs, &self.filters),
        }
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
        self.selected = 0;
    }

    pub fn set_filter(&mut self, id: &str, value: FilterValue) {
        if value.is_empty() {
            self.filters.remove(id);
        } else {
            self.filters.insert(id.to_string(), value);
        }
        self.selected = 0;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.search.clear();
        self.selected = 0;
    }

    /// Add or remove `value` from a multiselect filter.
    pub fn toggle_multi(&mut self, id: &str, value: &str) {
        let mut values: Vec<String> = self
            .filters
            .get(id)
            .map(|v| v.values().into_iter().map(str::to_string).collect())
            .unwrap_or_default();
        match values.iter().position(|v| v == value) {
            Some(pos) => {
                values.remove(pos);
            }
            None => values.push(value.to_string()),
        }
        self.set_filter(id, FilterValue::Many(values));
    }

    /// Step a select filter through "no constraint" and each option in order.
    pub fn cycle_select(&mut self, spec: &FilterSpec, forward: bool) {
        if spec.kind != FilterKind::Select || spec.options.is_empty() {
            return;
        }
        let current = match self.filters.get(&spec.id) {
            Some(FilterValue::Single(v)) => spec.options.iter().position(|o| &o.value == v),
            _ => None,
        };
        // Slot 0 is "no constraint"; slot i+1 is options[i]
        let slots = spec.options.len() + 1;
        let slot = current.map_or(0, |i| i + 1);
        let next = if forward {
            (slot + 1) % slots
        } else {
            (slot + slots - 1) % slots
        };
        let value = match next {
            0 => FilterValue::Single(String::new()),
            i => FilterValue::Single(spec.options[i - 1].value.clone()),
        };
        self.set_filter(&spec.id, value);
    }

    /// Clamp the selection to the derived row count.
    pub fn clamp_selection(&mut self, shown: usize) {
        self.selected = self.selected.min(shown.saturating_sub(1));
    }

    pub fn select_next(&mut self, shown: usize) {
        if shown > 0 {
            self.selected = (self.selected + 1).min(shown - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
