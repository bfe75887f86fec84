use crate::analyzer::daily::collapse_to_daily;
use crate::model::{CycleSpan, CycleSummary, DailyFlow, OverallSummary, Reading, StorageError};
use crate::storage::CycleRepository;
use crate::utils::round_to;

/// Trait defining the interface for cycle statistics.
pub trait CycleAnalyzer {
    fn summarize(&self, span: &CycleSpan, daily: &[DailyFlow]) -> CycleSummary;
    fn overall(&self, user_id: &str, spans: &[CycleSpan], daily: &[DailyFlow]) -> OverallSummary;
}

pub struct CycleAnalyzerImpl;

impl CycleAnalyzerImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CycleAnalyzerImpl {
    fn default() -> Self {
        Self::new()
    }
}

fn window<'a>(
    span: &'a CycleSpan,
    daily: &'a [DailyFlow],
) -> impl Iterator<Item = &'a DailyFlow> + 'a {
    daily.iter().filter(move |d| span.contains(d.day))
}

impl CycleAnalyzer for CycleAnalyzerImpl {
    /// Length counts every calendar day in the span, including days without
    /// readings. An empty window yields zeros and no peak day.
    fn summarize(&self, span: &CycleSpan, daily: &[DailyFlow]) -> CycleSummary {
        let mut total = 0.0;
        let mut peak: Option<&DailyFlow> = None;
        for entry in window(span, daily) {
            total += entry.flow_ml;
            // Strictly greater keeps the earliest day on ties.
            if peak.is_none_or(|p| entry.flow_ml > p.flow_ml) {
                peak = Some(entry);
            }
        }

        let Some(peak) = peak else {
            return CycleSummary {
                cycle_id: span.id,
                start_date: span.start_date,
                end_date: span.end_date,
                days: 0,
                total_flow_ml: 0.0,
                avg_daily_ml: 0.0,
                peak_ml: 0.0,
                peak_day: None,
            };
        };

        let days = span.length_days();
        CycleSummary {
            cycle_id: span.id,
            start_date: span.start_date,
            end_date: span.end_date,
            days,
            total_flow_ml: total,
            avg_daily_ml: round_to(total / days as f64, 2),
            peak_ml: peak.flow_ml,
            peak_day: Some(peak.day),
        }
    }

    /// Averages over spans that have at least one reading in range.
    fn overall(&self, user_id: &str, spans: &[CycleSpan], daily: &[DailyFlow]) -> OverallSummary {
        if daily.is_empty() || spans.is_empty() {
            return OverallSummary {
                user_id: user_id.to_string(),
                cycles: 0,
                avg_cycle_length_days: None,
                avg_total_flow_ml: None,
            };
        }

        let mut lengths = Vec::new();
        let mut totals = Vec::new();
        for span in spans {
            let mut entries = window(span, daily).peekable();
            if entries.peek().is_none() {
                continue;
            }
            totals.push(entries.map(|d| d.flow_ml).sum::<f64>());
            lengths.push(span.length_days() as f64);
        }

        OverallSummary {
            user_id: user_id.to_string(),
            cycles: spans.len(),
            avg_cycle_length_days: mean(&lengths).map(|v| round_to(v, 1)),
            avg_total_flow_ml: mean(&totals).map(|v| round_to(v, 1)),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Summary of one stored cycle, `None` if the user has no cycle with that id.
pub fn cycle_summary<R: CycleRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    cycle_id: i64,
    readings: &[Reading],
) -> Result<Option<CycleSummary>, StorageError> {
    let Some(span) = repo.get_span(user_id, cycle_id)? else {
        return Ok(None);
    };
    let daily = collapse_to_daily(readings);
    Ok(Some(CycleAnalyzerImpl::new().summarize(&span, &daily)))
}

pub fn overall_summary<R: CycleRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    readings: &[Reading],
) -> Result<OverallSummary, StorageError> {
    let spans = repo.list_spans(user_id)?;
    let daily = collapse_to_daily(readings);
    Ok(CycleAnalyzerImpl::new().overall(user_id, &spans, &daily))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn d(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Days::new(offset)
    }

    fn span(id: i64, start: u64, end: u64) -> CycleSpan {
        CycleSpan {
            id,
            user_id: "u1".into(),
            start_date: d(start),
            end_date: d(end),
        }
    }

    fn entry(offset: u64, flow_ml: f64) -> DailyFlow {
        DailyFlow { day: d(offset), flow_ml }
    }

    #[test]
    fn summarizes_a_cycle() {
        let daily = vec![entry(0, 20.0), entry(1, 10.0), entry(2, 10.0), entry(3, 10.0)];
        let summary = CycleAnalyzerImpl::new().summarize(&span(1, 0, 3), &daily);

        assert_eq!(summary.days, 4);
        assert_eq!(summary.total_flow_ml, 50.0);
        assert_eq!(summary.avg_daily_ml, 12.5);
        assert_eq!(summary.peak_ml, 20.0);
        assert_eq!(summary.peak_day, Some(d(0)));
    }

    #[test]
    fn peak_ties_go_to_earliest_day() {
        let daily = vec![entry(0, 5.0), entry(1, 9.0), entry(2, 9.0)];
        let summary = CycleAnalyzerImpl::new().summarize(&span(1, 0, 2), &daily);
        assert_eq!(summary.peak_day, Some(d(1)));
    }

    #[test]
    fn days_without_readings_count_toward_length() {
        let daily = vec![entry(0, 12.0), entry(3, 3.0)];
        let summary = CycleAnalyzerImpl::new().summarize(&span(1, 0, 5), &daily);
        assert_eq!(summary.days, 6);
        assert_eq!(summary.avg_daily_ml, 2.5);
    }

    #[test]
    fn empty_window_is_zeroed() {
        let daily = vec![entry(10, 12.0)];
        let summary = CycleAnalyzerImpl::new().summarize(&span(7, 0, 3), &daily);
        assert_eq!(summary.cycle_id, 7);
        assert_eq!(summary.days, 0);
        assert_eq!(summary.total_flow_ml, 0.0);
        assert_eq!(summary.avg_daily_ml, 0.0);
        assert_eq!(summary.peak_ml, 0.0);
        assert_eq!(summary.peak_day, None);
    }

    #[test]
    fn overall_skips_spans_without_data() {
        let daily = vec![entry(0, 10.0), entry(1, 10.0), entry(4, 6.0)];
        let spans = vec![span(1, 0, 3), span(2, 4, 4), span(3, 20, 25)];
        let overall = CycleAnalyzerImpl::new().overall("u1", &spans, &daily);

        assert_eq!(overall.cycles, 3);
        assert_eq!(overall.avg_cycle_length_days, Some(2.5));
        assert_eq!(overall.avg_total_flow_ml, Some(13.0));
    }

    #[test]
    fn overall_without_data_is_null() {
        let analyzer = CycleAnalyzerImpl::new();
        let empty = analyzer.overall("u1", &[], &[entry(0, 1.0)]);
        assert_eq!(empty.avg_cycle_length_days, None);
        assert_eq!(empty.avg_total_flow_ml, None);

        let no_data = analyzer.overall("u1", &[span(1, 0, 3)], &[]);
        assert_eq!(no_data.cycles, 0);
        assert_eq!(no_data.avg_total_flow_ml, None);
    }
}
