//! Plain-text run summary.

use abtest_core::ExperimentReport;

pub fn render(report: &ExperimentReport) -> String {
    let mut out = format!(
        "Explorations: {}, Exploitations: {}, Optimal Selections: {}\n\
         Overall Success Rate: {:.2}\n\
         Expected Regret: {:.2}\n",
        report.num_explored,
        report.num_exploited,
        report.num_optimal,
        report.overall_success_rate,
        report.expected_regret
    );
    out.push_str(&format!(
        "{:<8} {:>10} {:>10} {:>8}\n",
        "option", "true_rate", "estimate", "count"
    ));
    for o in &report.options {
        let marker = if o.index == report.optimal_index { "*" } else { "" };
        out.push_str(&format!(
            "{:<8} {:>10.4} {:>10.4} {:>8}\n",
            format!("{}{}", o.index + 1, marker),
            o.true_rate,
            o.estimate,
            o.count
        ));
    }
    out
}
