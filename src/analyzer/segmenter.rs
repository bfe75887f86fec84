use crate::analyzer::daily::collapse_to_daily;
use crate::model::{CycleSpan, DailyFlow, Reading, SpanBounds, StorageError};
use crate::storage::CycleRepository;
use chrono::Days;
use tracing::{debug, info};

/// Indices of cycle start days in an ascending daily series.
///
/// A day starts a cycle when it has flow and the previous *entry* (not the
/// previous calendar day) had none. A calendar gap does not end a cycle.
pub fn detect_cycle_starts(daily: &[DailyFlow]) -> Vec<usize> {
    let mut starts: Vec<usize> = daily
        .iter()
        .enumerate()
        .filter(|(i, entry)| {
            let prev_flow = if *i > 0 { daily[i - 1].flow_ml } else { 0.0 };
            entry.flow_ml > 0.0 && prev_flow == 0.0
        })
        .map(|(i, _)| i)
        .collect();

    // Data that begins mid-cycle still opens a cycle on its first day.
    if starts.is_empty() && daily.first().is_some_and(|d| d.flow_ml > 0.0) {
        starts.push(0);
    }
    starts
}

/// Splits the series into spans: each start runs to the day before the next
/// start, the last one to the final day of the series.
pub fn segment(daily: &[DailyFlow]) -> Vec<SpanBounds> {
    let Some(last) = daily.last() else {
        return Vec::new();
    };
    let starts = detect_cycle_starts(daily);

    starts
        .iter()
        .enumerate()
        .map(|(n, &idx)| {
            let start = daily[idx].day;
            let end = match starts.get(n + 1) {
                Some(&next) => daily[next]
                    .day
                    .checked_sub_days(Days::new(1))
                    .unwrap_or(start),
                None => last.day,
            };
            SpanBounds::new(start, end.max(start))
        })
        .collect()
}

/// Re-derives a user's cycles from their readings and swaps them into the
/// repository in one step.
pub fn rebuild_cycles<R: CycleRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    readings: &[Reading],
) -> Result<Vec<CycleSpan>, StorageError> {
    let daily = collapse_to_daily(readings);
    let spans = segment(&daily);
    debug!("{} daily entries, {} spans for {}", daily.len(), spans.len(), user_id);

    let stored = repo.replace_spans(user_id, &spans)?;
    info!("Rebuilt {} cycles for {}", stored.len(), user_id);
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn d(offset: u64) -> NaiveDate {
        base() + Days::new(offset)
    }

    fn series(flows: &[f64]) -> Vec<DailyFlow> {
        flows
            .iter()
            .enumerate()
            .map(|(i, &flow_ml)| DailyFlow { day: d(i as u64), flow_ml })
            .collect()
    }

    #[test]
    fn splits_on_recorded_zero_days() {
        let spans = segment(&series(&[10.0, 20.0, 0.0, 0.0, 15.0, 5.0, 0.0]));
        assert_eq!(
            spans,
            vec![SpanBounds::new(d(0), d(3)), SpanBounds::new(d(4), d(6))]
        );
    }

    #[test]
    fn single_day_cycles() {
        let spans = segment(&series(&[5.0, 0.0, 5.0]));
        assert_eq!(
            spans,
            vec![SpanBounds::new(d(0), d(0)), SpanBounds::new(d(2), d(2))]
        );
    }

    #[test]
    fn calendar_gap_does_not_end_cycle() {
        let daily = vec![
            DailyFlow { day: d(0), flow_ml: 8.0 },
            DailyFlow { day: d(5), flow_ml: 4.0 },
            DailyFlow { day: d(9), flow_ml: 0.0 },
        ];
        assert_eq!(segment(&daily), vec![SpanBounds::new(d(0), d(9))]);
    }

    #[test]
    fn leading_zero_days_are_not_covered() {
        let spans = segment(&series(&[0.0, 0.0, 3.0, 0.0]));
        assert_eq!(spans, vec![SpanBounds::new(d(2), d(3))]);
    }

    #[test]
    fn no_flow_at_all_gives_no_spans() {
        assert!(segment(&series(&[0.0, 0.0])).is_empty());
        assert!(segment(&[]).is_empty());
    }

    #[test]
    fn starts_follow_the_rule_and_fallback() {
        assert_eq!(detect_cycle_starts(&series(&[1.0, 2.0, 0.0, 3.0])), vec![0, 3]);
        assert_eq!(detect_cycle_starts(&series(&[0.0, 2.0, 2.0])), vec![1]);
    }

    #[test]
    fn spans_are_contiguous_and_cover_the_tail() {
        let flows = [0.0, 4.0, 0.0, 7.0, 7.0, 0.0, 0.0, 2.0, 0.0, 1.0, 9.0];
        let daily = series(&flows);
        let spans = segment(&daily);
        let starts = detect_cycle_starts(&daily);

        assert_eq!(spans.first().unwrap().start, daily[starts[0]].day);
        assert_eq!(spans.last().unwrap().end, daily.last().unwrap().day);
        for pair in spans.windows(2) {
            assert!(pair[0].start <= pair[0].end);
            assert!(pair[0].end < pair[1].start);
            assert_eq!(pair[0].end + Days::new(1), pair[1].start);
        }
    }

    #[test]
    fn segmentation_is_idempotent() {
        let daily = series(&[3.0, 0.0, 6.0, 6.0, 0.0, 1.0]);
        assert_eq!(segment(&daily), segment(&daily));
    }
}
