//! CSV exports of the filtered dashboard tables.

use crate::domain::csv::write_rows;
use crate::domain::metrics::{ActivityCount, Bottleneck, ThroughputPoint};

#[must_use]
pub fn bottleneck_csv(rows: &[Bottleneck]) -> String {
    write_rows(
        &["activity", "avg_hours"],
        rows.iter()
            .map(|r| [r.activity.clone(), format!("{:.4}", r.avg_hours)]),
    )
}

#[must_use]
pub fn throughput_csv(rows: &[ThroughputPoint]) -> String {
    write_rows(
        &["date", "count"],
        rows.iter().map(|r| [r.date.to_string(), r.count.to_string()]),
    )
}

#[must_use]
pub fn activity_frequency_csv(rows: &[ActivityCount]) -> String {
    write_rows(
        &["activity", "date", "count"],
        rows.iter()
            .map(|r| [r.activity.clone(), r.date.to_string(), r.count.to_string()]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_names_with_commas_are_quoted() {
        let csv = bottleneck_csv(&[Bottleneck {
            activity: "Review, final".into(),
            avg_hours: 2.5,
        }]);
        assert_eq!(csv, "activity,avg_hours\n\"Review, final\",2.5000\n");
    }

    #[test]
    fn empty_table_is_just_a_header() {
        assert_eq!(throughput_csv(&[]), "date,count\n");
    }
}
