//! Per-group conversion counts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{Error, Result};

/// Conversion statistics for a single experiment group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Group label.
    pub group: String,
    /// The single page the group saw.
    pub page: String,
    /// Number of converted users.
    pub conversions: u64,
    /// Number of users in the group.
    pub total_users: u64,
    /// `conversions / total_users`.
    pub rate: f64,
    /// Percentage of all rows belonging to this group, rounded to 2 decimals.
    pub share_of_users: f64,
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Percentage of {} users who saw ['{}']: {:?}%",
            self.group, self.page, self.share_of_users
        )
    }
}

/// Count conversions for `group`.
///
/// The group must have seen exactly one page; clean the data with
/// [`crate::wrangle::clean`] first if it has not.
pub fn report_conversions(dataset: &Dataset, group: &str) -> Result<ConversionReport> {
    let rows: Vec<usize> = (0..dataset.len())
        .filter(|&i| dataset.group(i) == group)
        .collect();

    let mut pages: Vec<String> = Vec::new();
    for &i in &rows {
        let page = dataset.page(i);
        if !pages.iter().any(|p| p == page) {
            pages.push(page.to_string());
        }
    }

    if rows.is_empty() {
        return Err(Error::EmptyGroup {
            group: group.to_string(),
        });
    }
    if pages.len() != 1 {
        tracing::warn!(group, ?pages, "group saw more than one page");
        return Err(Error::NonSingularPage {
            group: group.to_string(),
            pages,
        });
    }

    let mut conversions = 0u64;
    for &i in &rows {
        if dataset.converted(i)? {
            conversions += 1;
        }
    }
    let total_users = rows.len() as u64;
    let share = total_users as f64 / dataset.len() as f64 * 100.0;

    let report = ConversionReport {
        group: group.to_string(),
        page: pages.remove(0),
        conversions,
        total_users,
        rate: conversions as f64 / total_users as f64,
        share_of_users: round_to(share, 2),
    };
    tracing::info!("{report}");
    Ok(report)
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dataset::ColumnNames;
    use crate::dataset::tests::sample;

    #[test]
    fn test_report_control() {
        let report = report_conversions(&sample(), "control").unwrap();
        assert_eq!(report.conversions, 1);
        assert_eq!(report.total_users, 3);
        assert_eq!(report.rate, 0.333_333_333_333_333_3);
        assert_eq!(report.share_of_users, 60.0);
        assert_eq!(report.page, "old_page");
    }

    #[test]
    fn test_report_treatment() {
        let report = report_conversions(&sample(), "treatment").unwrap();
        assert_eq!(report.conversions, 1);
        assert_eq!(report.total_users, 2);
        assert_eq!(report.rate, 0.5);
        assert_eq!(report.share_of_users, 40.0);
    }

    #[test]
    fn test_report_display() {
        let report = report_conversions(&sample(), "control").unwrap();
        assert_eq!(
            report.to_string(),
            "Percentage of control users who saw ['old_page']: 60.0%"
        );
    }

    #[test]
    fn test_share_rounds_to_two_decimals() {
        let csv = "user_id,group,landing_page,converted\n\
                   1,control,old_page,0\n\
                   2,treatment,new_page,0\n\
                   3,treatment,new_page,1\n";
        let ds = Dataset::from_reader(csv.as_bytes(), &ColumnNames::default()).unwrap();
        let report = report_conversions(&ds, "control").unwrap();
        assert_eq!(report.share_of_users, 33.33);
    }

    #[test]
    fn test_non_singular_page() {
        let csv = "user_id,group,landing_page,converted\n\
                   1,control,old_page,0\n\
                   2,control,new_page,1\n";
        let ds = Dataset::from_reader(csv.as_bytes(), &ColumnNames::default()).unwrap();
        let err = report_conversions(&ds, "control").unwrap_err();
        let Error::NonSingularPage { group, pages } = err else {
            unreachable!("Expected NonSingularPage");
        };
        assert_eq!(group, "control");
        assert_eq!(pages, vec!["old_page".to_string(), "new_page".to_string()]);
    }

    #[test]
    fn test_empty_group() {
        let err = report_conversions(&sample(), "holdout").unwrap_err();
        assert!(matches!(err, Error::EmptyGroup { .. }));
    }
}
