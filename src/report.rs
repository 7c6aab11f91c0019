//! Transaction reports
//!
//! Aggregations behind the `report` subcommands: totals per category and
//! spending per category broken down by payee. Amounts are kept in base
//! units (cents) and only converted for display.

use crate::error::{Error, Result};
use crate::types::{Timestamp, TransactionResource};
use chrono::{DateTime, Months, TimeZone};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Base units per currency unit
pub const BASE_UNIT_DIVISOR: i64 = 100;

/// Category totals key for uncategorised money out
pub const INCOME: &str = "income";

/// Key for everything else without a category
pub const UNCATEGORIZED: &str = "uncategorized";

const SEPARATOR: &str = "-------------------------------- ----------------";

/// A key with its aggregated value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub value: i64,
}

/// Sort a map into pairs by descending value; equal values are ordered by key
pub fn sort_by_value(map: &HashMap<String, i64>) -> Vec<Pair> {
    let mut pairs: Vec<Pair> = map
        .iter()
        .map(|(key, value)| Pair {
            key: key.clone(),
            value: *value,
        })
        .collect();
    pairs.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
    pairs
}

/// Render base units as a decimal amount with two places, e.g. `-1234` as `-12.34`
pub fn format_base_units(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let divisor = BASE_UNIT_DIVISOR as u64;
    format!("{sign}{}.{:02}", abs / divisor, abs % divisor)
}

/// Absolute amount per category.
///
/// Uncategorised transactions are keyed [`INCOME`] when the amount is
/// negative and [`UNCATEGORIZED`] otherwise.
pub fn category_totals(transactions: &[TransactionResource]) -> HashMap<String, i64> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for txn in transactions {
        let value = txn.value_in_base_units();
        let key = match txn.category_id() {
            Some(id) => id,
            None if value < 0 => INCOME,
            None => UNCATEGORIZED,
        };
        *totals.entry(key.to_string()).or_default() += value.abs();
    }
    totals
}

/// Text table of [`category_totals`], largest first
pub fn render_category_totals(totals: &HashMap<String, i64>) -> String {
    let mut out = String::from("Category Totals\n");
    for pair in sort_by_value(totals) {
        out.push_str(&format!(
            "{:<30} : {}\n",
            pair.key,
            format_base_units(pair.value)
        ));
    }
    out
}

/// Total spent with one payee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payee {
    pub name: String,
    pub total: i64,
}

/// Spending grouped by category, then payee
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseReport {
    /// Category id to payees in first-seen order
    pub categories: BTreeMap<String, Vec<Payee>>,
}

impl ExpenseReport {
    /// Sum of all payees in `category`
    pub fn category_total(&self, category: &str) -> i64 {
        self.categories
            .get(category)
            .map_or(0, |payees| payees.iter().map(|p| p.total).sum())
    }

    /// Sum across every category
    pub fn total(&self) -> i64 {
        self.categories
            .values()
            .flat_map(|payees| payees.iter().map(|p| p.total))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Text layout: one block per category with a payee table and total
    pub fn render(&self) -> String {
        let mut out = String::from("Expense Category Totals\n\n");
        for (category, payees) in &self.categories {
            out.push_str(&format!("{category}\n{SEPARATOR}\n"));
            for payee in payees {
                out.push_str(&format!(
                    "{:<30} : {:>7}\n",
                    payee.name,
                    format_base_units(payee.total)
                ));
            }
            out.push_str(&format!(
                "{SEPARATOR}\n{:>30} : {:>7}\n\n",
                "total",
                format_base_units(self.category_total(category))
            ));
        }
        out
    }
}

/// Group spending by category and payee description.
///
/// Income (positive amounts) is skipped. Totals are positive base units.
pub fn expenses_by_category(transactions: &[TransactionResource]) -> ExpenseReport {
    let mut report = ExpenseReport::default();
    for txn in transactions {
        let value = txn.value_in_base_units();
        let description = &txn.attributes.description;
        if value > 0 {
            debug!(
                desc = %description,
                amount = value,
                category = ?txn.category_id(),
                "Skipping income"
            );
            continue;
        }

        let category = txn.category_id().unwrap_or(UNCATEGORIZED);
        let payees = report.categories.entry(category.to_string()).or_default();
        match payees.iter_mut().find(|p| &p.name == description) {
            Some(payee) => payee.total += -value,
            None => payees.push(Payee {
                name: description.clone(),
                total: -value,
            }),
        }
    }
    report
}

/// A `[since, until)` window for transaction filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub since: Timestamp,
    pub until: Option<Timestamp>,
}

impl ReportPeriod {
    /// From two months ago to one month ago
    pub fn last_month<Tz: TimeZone>(now: DateTime<Tz>) -> Result<Self> {
        let now = now.fixed_offset();
        Ok(Self {
            since: months_before(now, 2)?,
            until: Some(months_before(now, 1)?),
        })
    }

    /// From `months` months ago, open-ended
    pub fn months_back<Tz: TimeZone>(now: DateTime<Tz>, months: u32) -> Result<Self> {
        Ok(Self {
            since: months_before(now.fixed_offset(), months)?,
            until: None,
        })
    }
}

// Clamps to the end of shorter months, e.g. 31 March minus one month is 29 February.
fn months_before(ts: Timestamp, months: u32) -> Result<Timestamp> {
    ts.checked_sub_months(Months::new(months))
        .ok_or_else(|| Error::config(format!("cannot go back {months} months from {ts}")))
}
