//! Calendar domain logic for the journal.
//!
//! This module owns date arithmetic and the month aggregation that turns a
//! set of stored days into grid cells and money totals. Everything here is
//! a pure function of its inputs; loading records is the caller's job.

use chrono::{Datelike, NaiveDate};
use shared::{CalendarCell, CalendarMonth, DayRecord, DEFAULT_CELL_COLOR};
use std::collections::HashMap;

use super::models::{DayKey, StoredDay};
use super::routes::Route;

/// Cells and totals for one month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthAggregate {
    pub cells: Vec<CalendarCell>,
    pub total_expense: f64,
    pub total_income: f64,
}

/// Calendar service that handles month layout and aggregation
#[derive(Clone, Debug)]
pub struct CalendarService {
    expense_alert_threshold: f64,
}

impl CalendarService {
    pub fn new(expense_alert_threshold: f64) -> Self {
        Self { expense_alert_threshold }
    }

    /// Build the cells and totals for `month` (1-12) of `year`
    ///
    /// Records outside the month are ignored. Days without a record get the
    /// default cell and add nothing to the totals. Totals are summed over the
    /// same per-day records the cells are built from.
    pub fn aggregate_month(&self, year: i32, month: u32, days: &[StoredDay]) -> MonthAggregate {
        let days_in_month = self.days_in_month(month, year);

        let records_by_day: HashMap<u32, &DayRecord> = days
            .iter()
            .filter(|stored| stored.key.year() == year && stored.key.month() == month)
            .map(|stored| (stored.key.day(), &stored.record))
            .collect();

        let mut total_expense = 0.0;
        let mut total_income = 0.0;
        let mut cells = Vec::with_capacity(days_in_month as usize);

        for day in 1..=days_in_month {
            let Some(key) = DayKey::new(year, month, day) else {
                continue;
            };
            let route_key = key.route_key();
            let path = Route::Day(route_key.clone()).path();

            let cell = match records_by_day.get(&day) {
                Some(record) => {
                    total_expense += record.expense;
                    total_income += record.income;
                    CalendarCell {
                        date: day,
                        color: record.productivity.cell_color().to_string(),
                        has_gym: record.gym,
                        route_key,
                        path,
                    }
                }
                None => CalendarCell {
                    date: day,
                    color: DEFAULT_CELL_COLOR.to_string(),
                    has_gym: false,
                    route_key,
                    path,
                },
            };
            cells.push(cell);
        }

        MonthAggregate {
            cells,
            total_expense,
            total_income,
        }
    }

    /// Aggregate a month and wrap it into the view sent to clients
    pub fn build_month_view(&self, year: i32, month: u32, days: &[StoredDay]) -> CalendarMonth {
        let aggregate = self.aggregate_month(year, month, days);

        CalendarMonth {
            year,
            month,
            month_name: self.month_name(month).to_string(),
            first_day_of_week: self.first_day_of_month(month, year),
            expense_alert: aggregate.total_expense > self.expense_alert_threshold,
            has_income: aggregate.total_income > 0.0,
            expense_label: self.format_amount(aggregate.total_expense),
            income_label: self.format_amount(aggregate.total_income),
            cells: aggregate.cells,
            total_expense: aggregate.total_expense,
            total_income: aggregate.total_income,
        }
    }

    /// Get the number of days in a given month and year
    ///
    /// Months outside 1-12 have no days.
    pub fn days_in_month(&self, month: u32, year: i32) -> u32 {
        match month {
            2 => {
                if self.is_leap_year(year) {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            _ => 0,
        }
    }

    /// Check if a year is a leap year
    pub fn is_leap_year(&self, year: i32) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// Get the first day of month (0 = Sunday, 1 = Monday, etc.)
    pub fn first_day_of_month(&self, month: u32, year: i32) -> u32 {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|date| date.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }

    /// Get the human-readable name for a month number
    pub fn month_name(&self, month: u32) -> &'static str {
        match month {
            1 => "January", 2 => "February", 3 => "March", 4 => "April",
            5 => "May", 6 => "June", 7 => "July", 8 => "August",
            9 => "September", 10 => "October", 11 => "November", 12 => "December",
            _ => "Invalid Month",
        }
    }

    /// Format an amount the way the summary shows it, e.g. `₹150.00`
    pub fn format_amount(&self, amount: f64) -> String {
        format!("₹{:.2}", amount)
    }
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new(3000.0)
    }
}
