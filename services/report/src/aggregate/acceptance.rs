use tandem_snapshots::MetricsSnapshot;

/// Suggestion/acceptance counters summed across every language leaf of a
/// metrics payload. Lines-based and count-based figures are two
/// independently-reported statistics; they are never reconciled into one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptanceTotals {
    pub lines_suggested: u64,
    pub lines_accepted: u64,
    pub suggestions: u64,
    pub acceptances: u64,
}

impl AcceptanceTotals {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        let mut totals = Self::default();
        for leaf in snapshot.language_leaves() {
            totals.lines_suggested += leaf.total_code_lines_suggested;
            totals.lines_accepted += leaf.total_code_lines_accepted;
            totals.suggestions += leaf.total_code_suggestions;
            totals.acceptances += leaf.total_code_acceptances;
        }
        totals
    }

    pub fn lines_rate(&self) -> f64 {
        acceptance_rate(self.lines_accepted, self.lines_suggested)
    }

    pub fn count_rate(&self) -> f64 {
        acceptance_rate(self.acceptances, self.suggestions)
    }
}

/// `accepted / suggested * 100`, rounded to 2 decimals. Exactly 0 when
/// nothing was suggested; never NaN or infinite.
pub fn acceptance_rate(accepted: u64, suggested: u64) -> f64 {
    if suggested == 0 {
        return 0.0;
    }
    let rate = accepted as f64 / suggested as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
