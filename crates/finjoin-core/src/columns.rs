//! Column reconciliation between annual and quarterly tables
//!
//! Columns are grouped by calendar year. Within a year the quarters come
//! first (`Q1`..`Q4`) and the annual column closes the group. A year whose
//! only quarterly column is `Q4` and which also has an annual column drops
//! that `Q4`: once the year has closed the two carry the same figure.
//!
//! Unrecognized labels follow the last year group, and `LTM` is always the
//! final column.

use crate::label::ColumnLabel;
use crate::table::{MergedColumn, Source};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Output column order plus the columns that were dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPlan {
    /// Surviving columns in output order
    pub columns: Vec<MergedColumn>,
    /// Suppressed `yQ4` labels, in year order
    pub suppressed: Vec<String>,
}

impl ColumnPlan {
    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }
}

#[derive(Default)]
struct YearGroup<'a> {
    annual: Option<&'a str>,
    quarters: [Option<&'a str>; 4],
}

impl YearGroup<'_> {
    /// Q4 present, Q1-Q3 absent, annual column present
    fn suppresses_q4(&self) -> bool {
        self.annual.is_some()
            && self.quarters[3].is_some()
            && self.quarters[..3].iter().all(Option::is_none)
    }
}

/// Compute the merged column order.
///
/// `annual` holds the annual table's header labels (years, `LTM`, anything
/// else); `quarterly` holds the quarterly table's labels. Labels that belong
/// to the other table's kind (a quarter in the annual header, a year or
/// `LTM` in the quarterly header) are skipped.
pub fn reconcile_columns<A, Q>(annual: &[A], quarterly: &[Q]) -> ColumnPlan
where
    A: AsRef<str>,
    Q: AsRef<str>,
{
    let mut years: BTreeMap<i32, YearGroup<'_>> = BTreeMap::new();
    let mut others: Vec<MergedColumn> = Vec::new();
    let mut ltm: Option<&str> = None;

    let mut push_other = |label: &str, source: Source| {
        if !others.iter().any(|c| c.label == label) {
            others.push(MergedColumn::new(label, source));
        }
    };

    for label in annual.iter().map(|l| l.as_ref()) {
        match ColumnLabel::parse(label) {
            ColumnLabel::Year(year) => years.entry(year).or_default().annual = Some(label),
            ColumnLabel::Ltm => ltm = Some(label),
            ColumnLabel::Other(_) => push_other(label, Source::Annual),
            ColumnLabel::Quarter { .. } => {
                debug!(label, "skipping quarter column in annual table");
            }
        }
    }

    for label in quarterly.iter().map(|l| l.as_ref()) {
        match ColumnLabel::parse(label) {
            ColumnLabel::Quarter { year, quarter } => {
                years.entry(year).or_default().quarters[usize::from(quarter - 1)] = Some(label);
            }
            ColumnLabel::Other(_) => push_other(label, Source::Quarterly),
            ColumnLabel::Year(_) | ColumnLabel::Ltm => {
                debug!(label, "skipping annual column in quarterly table");
            }
        }
    }

    let mut plan = ColumnPlan::default();

    for (year, group) in &years {
        let suppress = group.suppresses_q4();

        for (idx, quarter) in group.quarters.iter().enumerate() {
            let Some(label) = quarter else { continue };
            if idx == 3 && suppress {
                debug!(year, label, "suppressing lone Q4 column in favor of annual column");
                plan.suppressed.push(label.to_string());
                continue;
            }
            plan.columns.push(MergedColumn::new(*label, Source::Quarterly));
        }

        if let Some(label) = group.annual {
            plan.columns.push(MergedColumn::new(label, Source::Annual));
        }
    }

    plan.columns.extend(others);

    if let Some(label) = ltm {
        plan.columns.push(MergedColumn::new(label, Source::Annual));
    }

    plan
}
