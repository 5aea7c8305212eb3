//! Column naming for synthetic blocks.

use std::collections::{HashMap, HashSet};

use crate::dtypes::Dtype;
use crate::error::{EvidenceError, Result};

/// How many columns a sampling call produces, and what they are called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    /// `n` auto-named columns, `"<dtype>_<i>"`
    Count(usize),
    /// Columns with exactly these names
    Names(Vec<String>),
}

impl Columns {
    /// Builds [`Columns::Names`] from anything string-like.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Columns::Names(names.into_iter().map(Into::into).collect())
    }

    /// Number of columns requested.
    pub fn len(&self) -> usize {
        match self {
            Columns::Count(n) => *n,
            Columns::Names(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-dtype auto-naming counters.
///
/// A counter only moves forward, so an index is never issued twice for the
/// same dtype even when earlier columns were overwritten. It also stays one
/// past the highest `<dtype>_<index>` name that entered the dataset.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameCounters {
    next: HashMap<Dtype, usize>,
}

impl NameCounters {
    /// Next `count` free names for `dtype`, skipping any in `taken`.
    pub(crate) fn issue(
        &mut self,
        dtype: Dtype,
        count: usize,
        taken: &HashSet<String>,
    ) -> Vec<String> {
        let next = self.next.entry(dtype).or_insert(0);
        let mut names = Vec::with_capacity(count);
        while names.len() < count {
            let candidate = format!("{}_{}", dtype.as_str(), *next);
            *next += 1;
            if !taken.contains(&candidate) {
                names.push(candidate);
            }
        }
        names
    }

    /// Moves the counter past `name` if it has the form `<dtype>_<index>`.
    pub(crate) fn observe(&mut self, name: &str) {
        let Some((prefix, index)) = name.rsplit_once('_') else {
            return;
        };
        let Some(dtype) = Dtype::ALL.into_iter().find(|d| d.as_str() == prefix) else {
            return;
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return;
        }
        if let Ok(index) = index.parse::<usize>() {
            let next = self.next.entry(dtype).or_insert(0);
            *next = (*next).max(index.saturating_add(1));
        }
    }

    /// Index the next auto-generated name for `dtype` would try.
    #[cfg(test)]
    pub(crate) fn peek(&self, dtype: Dtype) -> usize {
        self.next.get(&dtype).copied().unwrap_or(0)
    }
}

/// Resolves the names of a block.
///
/// `overrides` wins over `columns`; otherwise `Names` are used verbatim and
/// `Count` draws from the counters.
pub(crate) fn resolve_names(
    dtype: Dtype,
    columns: &Columns,
    overrides: Option<&[String]>,
    counters: &mut NameCounters,
    taken: &HashSet<String>,
) -> Result<Vec<String>> {
    let names = match (overrides, columns) {
        (Some(names), _) => {
            if names.len() != columns.len() {
                return Err(EvidenceError::invalid_parameter(format!(
                    "{} column names given for {} columns",
                    names.len(),
                    columns.len()
                )));
            }
            names.to_vec()
        }
        (None, Columns::Names(names)) => names.clone(),
        (None, Columns::Count(n)) => counters.issue(dtype, *n, taken),
    };

    let mut seen = HashSet::with_capacity(names.len());
    for name in &names {
        if name.is_empty() {
            return Err(EvidenceError::invalid_parameter("column names must be non-empty"));
        }
        if !seen.insert(name.as_str()) {
            return Err(EvidenceError::invalid_parameter(format!(
                "column name '{name}' given twice"
            )));
        }
    }
    Ok(names)
}
