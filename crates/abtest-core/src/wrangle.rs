//! Cleaning raw experiment exports.
//!
//! Raw data from a landing-page experiment typically contains two kinds of
//! noise: users whose logged page does not match their assigned group, and
//! users logged more than once. [`clean`] removes both.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Which page each experiment group is expected to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assignment {
    /// Label of the control group.
    pub control_group: String,
    /// Label of the treatment group.
    pub treatment_group: String,
    /// Page shown to the control group.
    pub control_page: String,
    /// Page shown to the treatment group.
    pub treatment_page: String,
}

impl Default for Assignment {
    fn default() -> Self {
        Self {
            control_group: "control".to_string(),
            treatment_group: "treatment".to_string(),
            control_page: "old_page".to_string(),
            treatment_page: "new_page".to_string(),
        }
    }
}

impl Assignment {
    /// Whether a row's group and page agree with the assignment.
    pub fn is_aligned(&self, group: &str, page: &str) -> bool {
        (group == self.control_group && page == self.control_page)
            || (group == self.treatment_group && page == self.treatment_page)
    }
}

/// What [`clean`] did to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanSummary {
    /// Rows in the raw dataset.
    pub rows_in: usize,
    /// Rows dropped because the page did not match the group.
    pub misaligned_dropped: usize,
    /// Rows dropped because the user appeared again later.
    pub duplicates_dropped: usize,
    /// Rows in the cleaned dataset.
    pub rows_out: usize,
    /// Cleaned row count per group, in first-seen order.
    pub group_counts: Vec<(String, usize)>,
}

impl std::fmt::Display for CleanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rows read: {}", self.rows_in)?;
        writeln!(f, "Misaligned rows dropped: {}", self.misaligned_dropped)?;
        writeln!(f, "Duplicate users dropped: {}", self.duplicates_dropped)?;
        write!(f, "Rows kept: {}", self.rows_out)?;
        for (group, count) in &self.group_counts {
            write!(f, "\n  {group}: {count}")?;
        }
        Ok(())
    }
}

/// Drop misaligned rows, then keep only the last row of each user.
///
/// Surviving rows keep their original relative order.
pub fn clean(dataset: &Dataset, assignment: &Assignment) -> (Dataset, CleanSummary) {
    let rows_in = dataset.len();

    let aligned: Vec<usize> = (0..rows_in)
        .filter(|&i| assignment.is_aligned(dataset.group(i), dataset.page(i)))
        .collect();
    let misaligned_dropped = rows_in - aligned.len();

    let mut last_seen: HashMap<&str, usize> = HashMap::with_capacity(aligned.len());
    for &i in &aligned {
        last_seen.insert(dataset.user(i), i);
    }

    let records = aligned
        .iter()
        .copied()
        .filter(|&i| last_seen.get(dataset.user(i)) == Some(&i))
        .map(|i| dataset.records()[i].clone())
        .collect::<Vec<_>>();
    let duplicates_dropped = aligned.len() - records.len();

    let cleaned = dataset.with_records(records);
    let summary = CleanSummary {
        rows_in,
        misaligned_dropped,
        duplicates_dropped,
        rows_out: cleaned.len(),
        group_counts: cleaned.group_counts(),
    };

    tracing::info!(
        rows_in,
        misaligned_dropped,
        duplicates_dropped,
        rows_out = summary.rows_out,
        "cleaned dataset"
    );

    (cleaned, summary)
}
