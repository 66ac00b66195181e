use crate::models::{
    DayLedger, DayView, Document, Entry, GoalSet, HistoryDay, Macro, MacroProgress, Progress,
    Totals,
};

pub fn sum_entries(entries: &[Entry]) -> Totals {
    entries.iter().fold(Totals::default(), |mut acc, entry| {
        acc.cals += entry.cals;
        acc.p += entry.p;
        acc.c += entry.c;
        acc.f += entry.f;
        acc
    })
}

/// Share of the goal reached, clamped to `[0, 1]`.
///
/// The calorie goal is floored to 1 so an unset calorie goal reads as full
/// once anything is eaten. An unset protein, carb or fat goal always reads 0.
pub fn goal_ratio(which: Macro, total: f64, goal: u32) -> f64 {
    let denom = match which {
        Macro::Cals => goal.max(1),
        _ if goal == 0 => return 0.0,
        _ => goal,
    };

    let ratio = total / f64::from(denom);
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn build_progress(totals: &Totals, goals: &GoalSet) -> Progress {
    let progress = |which: Macro| MacroProgress {
        total: totals.get(which),
        goal: goals.get(which),
        ratio: goal_ratio(which, totals.get(which), goals.get(which)),
    };

    Progress {
        goals_configured: goals.is_configured(),
        cals: progress(Macro::Cals),
        p: progress(Macro::Protein),
        c: progress(Macro::Carbs),
        f: progress(Macro::Fat),
    }
}

/// Read-only view of a day. A date with no ledger shows as an empty day.
pub fn build_day_view(doc: &Document, date: &str) -> DayView {
    let empty = DayLedger::default();
    let ledger = doc.days.get(date).unwrap_or(&empty);
    let totals = sum_entries(&ledger.entries);

    DayView {
        date: date.to_string(),
        entries: ledger.entries.iter().rev().cloned().collect(),
        weight: ledger.weight.clone(),
        water: ledger.water.clone(),
        progress: build_progress(&totals, &doc.goals),
        totals,
    }
}

/// Every stored day, most recent first.
pub fn build_history(doc: &Document) -> Vec<HistoryDay> {
    doc.days
        .iter()
        .rev()
        .map(|(date, ledger)| HistoryDay {
            date: date.clone(),
            entry_count: ledger.entries.len(),
            totals: sum_entries(&ledger.entries),
            weight: ledger.weight.clone(),
            water: ledger.water.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: i64, cals: f64, p: f64, c: f64, f: f64) -> Entry {
        Entry {
            timestamp: ts,
            note: String::new(),
            cals,
            p,
            c,
            f,
        }
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        assert_eq!(sum_entries(&[]), Totals::default());
    }

    #[test]
    fn sums_each_field() {
        let entries = vec![
            entry(1, 500.0, 30.0, 50.0, 10.0),
            entry(2, 250.5, 12.25, 0.0, 8.0),
            entry(3, 0.0, 0.0, 20.0, 0.0),
        ];
        let totals = sum_entries(&entries);
        assert_eq!(totals.cals, 750.5);
        assert_eq!(totals.p, 42.25);
        assert_eq!(totals.c, 70.0);
        assert_eq!(totals.f, 18.0);

        let mut reversed = entries.clone();
        reversed.reverse();
        assert_eq!(sum_entries(&reversed), totals);
    }

    #[test]
    fn ratio_clamps_to_one() {
        assert_eq!(goal_ratio(Macro::Cals, 2500.0, 2000), 1.0);
        assert_eq!(goal_ratio(Macro::Cals, 500.0, 2000), 0.25);
        assert_eq!(goal_ratio(Macro::Protein, -10.0, 100), 0.0);
    }

    #[test]
    fn unset_macro_goal_reads_zero() {
        assert_eq!(goal_ratio(Macro::Protein, 75.0, 0), 0.0);
        assert_eq!(goal_ratio(Macro::Carbs, 0.0, 0), 0.0);
        assert_eq!(goal_ratio(Macro::Fat, 1e6, 0), 0.0);
    }

    #[test]
    fn unset_calorie_goal_uses_floor_of_one() {
        assert_eq!(goal_ratio(Macro::Cals, 0.0, 0), 0.0);
        assert_eq!(goal_ratio(Macro::Cals, 0.5, 0), 0.5);
        assert_eq!(goal_ratio(Macro::Cals, 300.0, 0), 1.0);
    }

    #[test]
    fn progress_against_goals() {
        let goals = GoalSet { cals: 2000, p: 150, c: 200, f: 70 };
        let totals = Totals { cals: 1000.0, p: 75.0, c: 250.0, f: 0.0 };
        let progress = build_progress(&totals, &goals);
        assert!(progress.goals_configured);
        assert_eq!(progress.cals.ratio, 0.5);
        assert_eq!(progress.p.ratio, 0.5);
        assert_eq!(progress.c.ratio, 1.0);
        assert_eq!(progress.f.ratio, 0.0);
        assert_eq!(progress.p.goal, 150);
        assert_eq!(progress.c.total, 250.0);
    }

    #[test]
    fn day_view_lists_newest_first() {
        let mut doc = Document::default();
        doc.days.insert(
            "2026-01-05".to_string(),
            DayLedger {
                entries: vec![entry(1, 100.0, 0.0, 0.0, 0.0), entry(2, 200.0, 0.0, 0.0, 0.0)],
                weight: "80".to_string(),
                water: String::new(),
            },
        );

        let view = build_day_view(&doc, "2026-01-05");
        assert_eq!(view.entries[0].timestamp, 2);
        assert_eq!(view.entries[1].timestamp, 1);
        assert_eq!(view.totals.cals, 300.0);
        assert_eq!(view.weight, "80");

        let missing = build_day_view(&doc, "2026-01-06");
        assert!(missing.entries.is_empty());
        assert!(!doc.days.contains_key("2026-01-06"));
    }

    #[test]
    fn history_is_most_recent_first() {
        let mut doc = Document::default();
        for date in ["2026-01-03", "2026-02-01", "2025-12-31"] {
            doc.days.insert(date.to_string(), DayLedger::default());
        }
        doc.days
            .get_mut("2026-01-03")
            .unwrap()
            .entries
            .push(entry(1, 640.0, 0.0, 0.0, 0.0));

        let history = build_history(&doc);
        let dates: Vec<&str> = history.iter().map(|day| day.date.as_str()).collect();
        assert_eq!(dates, ["2026-02-01", "2026-01-03", "2025-12-31"]);
        assert_eq!(history[1].entry_count, 1);
        assert_eq!(history[1].totals.cals, 640.0);
    }
}
