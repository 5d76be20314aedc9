// Text Report
// Renders a dashboard view as plain text for the terminal front end

use std::fmt::{self, Write};

use crate::models::{DashboardView, SweepRow};

pub const DISCUSSION_QUESTIONS: [(&str, &str); 7] = [
    (
        "Stakeholder Priorities",
        "Which stakeholder's concerns should matter most? How would you weigh cost savings against risk mitigation?",
    ),
    (
        "Geographic Fairness",
        "Is the disparity in flagging rates between regions acceptable? Why or why not? What are the ethical implications?",
    ),
    (
        "Regional Thresholds",
        "Should different thresholds be used by region to achieve more equitable outcomes? What are the trade-offs?",
    ),
    (
        "Worst Case Scenario",
        "What would happen if a major sustainability violation at a supplier is missed? How should this risk factor into the threshold decision?",
    ),
    (
        "Board Justification",
        "How would you justify your recommended threshold to the board of directors? What data would you present?",
    ),
    (
        "Implementation",
        "Beyond the threshold, what other safeguards or processes should be implemented to manage supplier sustainability risk?",
    ),
    (
        "Model Limitations",
        "What are the limitations of using a predictive model for this decision? When might human judgment be more appropriate?",
    ),
];

#[derive(Debug, Copy, Clone, Default)]
pub struct ReportOptions {
    pub questions: bool,
}

/// Signed money delta, e.g. "+$1.2M" / "-$2.3M".
fn signed_money(value: f64) -> String {
    let sign = if value < 0.0 { '-' } else { '+' };
    format!("{}${:.1}M", sign, value.abs())
}

fn section<W: Write>(out: &mut W, title: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

pub fn write_dashboard<W: Write>(
    out: &mut W,
    view: &DashboardView,
    options: ReportOptions,
) -> fmt::Result {
    let reference = format!("vs {:.2}", view.reference_threshold);

    writeln!(out, "SUPPLIER SUSTAINABILITY - Threshold Decision Dashboard")?;
    writeln!(out, "Threshold: {:.2}", view.threshold)?;
    if let Some(notice) = &view.notice {
        writeln!(out, "! {}", notice)?;
    }

    section(out, "Key Metrics")?;
    let m = &view.metrics;
    let d = &view.delta;
    writeln!(
        out,
        "Suppliers Flagged : {} of {} ({:.1}%)  {:+} {}",
        m.flagged, view.total_suppliers, m.flagged_pct, d.flagged, reference
    )?;
    writeln!(
        out,
        "Annual Cost       : ${:.1}M  {} {}",
        m.cost,
        signed_money(d.cost),
        reference
    )?;
    writeln!(
        out,
        "False Positives   : {}  {:+} {}",
        m.false_positives, d.false_positives, reference
    )?;
    writeln!(
        out,
        "False Negatives   : {}  {:+} {}",
        m.false_negatives, d.false_negatives, reference
    )?;
    writeln!(out, "Accuracy          : {:.1}%  {:+.1} {}", m.accuracy, d.accuracy, reference)?;

    section(out, "Geographic Fairness")?;
    for rate in view.fairness.rates.iter() {
        writeln!(out, "- {}: {:.1}% (n={})", rate.region, rate.rate, rate.sample_size)?;
    }
    writeln!(out, "Maximum Disparity: {:.1} percentage points", view.fairness.disparity)?;
    writeln!(out, "[{}] {}", view.fairness.severity.as_str(), view.fairness.message)?;
    for region in &view.fairness.small_sample_regions {
        writeln!(
            out,
            "Note: the '{}' region has a small sample; interpret its rate with caution.",
            region
        )?;
    }

    section(out, "Stakeholder Perspectives")?;
    let p = &view.stakeholders;
    writeln!(out, "{} ({}) - {}", p.cfo.identity.role, p.cfo.identity.name, p.cfo.identity.focus)?;
    writeln!(
        out,
        "  Prefers: Threshold {:.2} (${:.1}M)",
        p.cfo.preferred_threshold, p.cfo.preferred_cost
    )?;
    writeln!(out, "  Current: Threshold {:.2} (${:.1}M)", view.threshold, p.cfo.current_cost)?;
    writeln!(
        out,
        "  Gap: {} ({:+.0}%)",
        signed_money(p.cfo.cost_gap),
        p.cfo.cost_gap_pct
    )?;
    writeln!(out, "  \"{}\"", p.cfo.identity.quote)?;

    writeln!(out, "{} ({}) - {}", p.cso.identity.role, p.cso.identity.name, p.cso.identity.focus)?;
    writeln!(
        out,
        "  Prefers: Threshold {:.2} ({} false negatives)",
        p.cso.preferred_threshold, p.cso.preferred_fn
    )?;
    writeln!(out, "  Current: Threshold {:.2} ({} false negatives)", view.threshold, p.cso.current_fn)?;
    writeln!(out, "  Gap: {:+} missed risks ({:+.0}%)", p.cso.fn_gap, p.cso.fn_gap_pct)?;
    writeln!(out, "  \"{}\"", p.cso.identity.quote)?;

    let r = &p.relations;
    writeln!(out, "{} ({}) - {}", r.identity.role, r.identity.name, r.identity.focus)?;
    writeln!(out, "  Current: {:.0}% flagged ({} suppliers)", r.flagged_pct, r.flagged_count)?;
    writeln!(out, "  \"{}\"", r.identity.quote)?;

    let c = &p.counsel;
    writeln!(out, "{} ({}) - {}", c.identity.role, c.identity.name, c.identity.focus)?;
    writeln!(out, "  Geographic disparity: {:.1} percentage points", c.disparity)?;
    for rate in c.rates.iter() {
        writeln!(out, "  ({}: {:.1}% | n={})", rate.region, rate.rate, rate.sample_size)?;
    }
    writeln!(out, "  \"{}\"", c.identity.quote)?;

    writeln!(out)?;
    writeln!(
        out,
        "KEY INSIGHT: No single threshold satisfies all stakeholders. Explore different thresholds to understand the trade-offs."
    )?;

    if options.questions {
        section(out, "Discussion Questions")?;
        for (i, (title, body)) in DISCUSSION_QUESTIONS.iter().enumerate() {
            writeln!(out, "{}. {}: {}", i + 1, title, body)?;
        }
    }
    Ok(())
}

pub fn write_sweep<W: Write>(out: &mut W, rows: &[SweepRow]) -> fmt::Result {
    writeln!(
        out,
        "{:>9} {:>8} {:>7} {:>7} {:>5} {:>5} {:>8} {:>10}",
        "threshold", "flagged", "pct", "cost", "fp", "fn", "accuracy", "disparity"
    )?;
    for row in rows {
        let m = &row.metrics;
        writeln!(
            out,
            "{:>8.2}{} {:>8} {:>7.1} {:>7.2} {:>5} {:>5} {:>8.1} {:>10.1}",
            row.threshold,
            if row.is_standard { ' ' } else { '*' },
            m.flagged,
            m.flagged_pct,
            m.cost,
            m.false_positives,
            m.false_negatives,
            m.accuracy,
            row.disparity
        )?;
    }
    writeln!(out, "* interpolated")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DashboardState;

    #[test]
    fn test_signed_money() {
        assert_eq!(signed_money(-2.3), "-$2.3M");
        assert_eq!(signed_money(0.0), "+$0.0M");
    }

    #[test]
    fn test_render_standard_threshold() {
        let state = DashboardState::default();
        let view = state.dashboard(0.50).unwrap();
        let mut text = String::new();
        write_dashboard(&mut text, &view, ReportOptions::default()).unwrap();
        assert!(text.contains("Suppliers Flagged : 571 of 1000 (57.1%)  -290 vs 0.60"));
        assert!(text.contains("Annual Cost       : $4.6M  -$2.3M vs 0.60"));
        assert!(text.contains("Hans Verhoeven"));
        assert!(!text.contains("Interpolated values"));
        assert!(!text.contains("Discussion Questions"));
    }

    #[test]
    fn test_render_interpolated_with_questions() {
        let state = DashboardState::default();
        let view = state.dashboard(0.62).unwrap();
        let mut text = String::new();
        write_dashboard(&mut text, &view, ReportOptions { questions: true }).unwrap();
        assert!(text.contains("Interpolated values"));
        assert!(text.contains("7. Model Limitations"));
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_sink_errors_propagate() {
        let view = DashboardState::default().dashboard(0.60).unwrap();
        assert!(write_dashboard(&mut FailingSink, &view, ReportOptions::default()).is_err());
        assert!(write_sweep(&mut FailingSink, &[]).is_err());
    }

    #[test]
    fn test_render_sweep_marks_interpolated_rows() {
        let state = DashboardState::default();
        let rows = state.sweep();
        let mut text = String::new();
        write_sweep(&mut text, &rows).unwrap();
        assert_eq!(text.lines().count(), rows.len() + 2);
        assert!(text.contains("0.51*"));
    }
}
