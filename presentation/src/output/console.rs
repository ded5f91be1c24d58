//! Console output formatter for orchestration results

use crate::output::formatter::OutputFormatter;
use chorus_domain::orchestration::stage::TOTAL_KEY;
use chorus_domain::{OrchestrationResult, Scorecard, Stage};
use colored::Colorize;

/// Formats orchestration results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result
    pub fn format(result: &OrchestrationResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Chorus Result"));
        output.push('\n');

        output.push_str(&format!("\n{}\n", result.final_answer));

        output.push_str(&format!(
            "\n{} {}\n",
            "Confidence:".cyan().bold(),
            Self::confidence_label(result.confidence)
        ));

        if !result.key_points.is_empty() {
            output.push_str(&format!("\n{}\n", "Key Points:".cyan().bold()));
            for point in &result.key_points {
                output.push_str(&format!("  * {}\n", point));
            }
        }

        if !result.citations.is_empty() {
            output.push_str(&format!("\n{}\n", "Citations:".cyan().bold()));
            for citation in &result.citations {
                output.push_str(&format!(
                    "  {} {}\n",
                    format!("[{}]", citation.source).dimmed(),
                    citation.span
                ));
            }
        }

        output.push_str(&Self::section_header("Costs"));
        output.push_str(&format!(
            "  ${:.4}  ({} tokens)\n",
            result.costs.usd, result.costs.tokens
        ));

        output.push_str(&Self::section_header("Stage Timings"));
        for stage in Stage::ALL {
            if let Some(ms) = result.timings.get(stage.as_str()) {
                output.push_str(&format!("  {:<12} {:>9.1} ms\n", stage.as_str(), ms));
            }
        }
        if let Some(total) = result.timings.get(TOTAL_KEY) {
            output.push_str(&format!(
                "  {} {:>9.1} ms\n",
                format!("{:<12}", TOTAL_KEY).bold(),
                total
            ));
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &OrchestrationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final answer only (concise output)
    pub fn format_answer_only(result: &OrchestrationResult) -> String {
        format!("{}\n", result.final_answer)
    }

    /// Format scorecards as a table, best first
    pub fn format_scorecards(scorecards: &[Scorecard]) -> String {
        if scorecards.is_empty() {
            return format!("{}\n", "No scorecards recorded yet.".dimmed());
        }

        let mut output = String::new();
        output.push_str(&Self::header("Backend Scorecards"));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>6} {:>8} {:>8} {:>10} {:>10}\n",
            "backend", "tasks", "quality", "factual", "latency", "cost"
        ));
        for card in scorecards {
            output.push_str(&format!(
                "{:<24} {:>6} {:>8.3} {:>8.3} {:>8.0}ms {:>10.5}\n",
                card.backend_name,
                card.task_count,
                card.avg_quality,
                card.avg_factuality,
                card.avg_latency_ms,
                card.avg_cost_usd
            ));
        }
        output.push_str(&Self::footer());
        output
    }

    fn confidence_label(confidence: f64) -> String {
        let text = format!("{:.0}%", confidence * 100.0);
        if confidence >= 0.75 {
            text.green().to_string()
        } else if confidence >= 0.5 {
            text.yellow().to_string()
        } else {
            text.red().to_string()
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &OrchestrationResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &OrchestrationResult) -> String {
        Self::format_json(result)
    }

    fn format_answer_only(&self, result: &OrchestrationResult) -> String {
        Self::format_answer_only(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_domain::{Citation, Costs, OutputFormat};
    use std::collections::BTreeMap;

    fn result() -> OrchestrationResult {
        OrchestrationResult {
            final_answer: "Paris is the capital of France.".to_string(),
            confidence: 0.82,
            key_points: vec!["Paris is the capital of France.".to_string()],
            citations: vec![Citation {
                source: "ref-1".to_string(),
                span: "Paris has been the capital since 987.".to_string(),
            }],
            costs: Costs {
                usd: 0.0123,
                tokens: 321,
            },
            timings: BTreeMap::from([
                ("ensemble".to_string(), 40.0),
                ("voting".to_string(), 0.2),
                (TOTAL_KEY.to_string(), 42.5),
            ]),
        }
    }

    #[test]
    fn test_full_output_sections() {
        let out = ConsoleFormatter::format(&result());
        assert!(out.contains("Paris is the capital of France."));
        assert!(out.contains("82%"));
        assert!(out.contains("Key Points:"));
        assert!(out.contains("Paris has been the capital since 987."));
        assert!(out.contains("0.0123"));
        assert!(out.contains("321 tokens"));
        assert!(out.contains("ensemble"));
        assert!(!out.contains("factcheck"));
    }

    #[test]
    fn test_render_dispatches_on_format() {
        let r = result();
        let f = ConsoleFormatter;
        assert_eq!(f.render(&r, OutputFormat::Answer), "Paris is the capital of France.\n");

        let json: serde_json::Value =
            serde_json::from_str(&f.render(&r, OutputFormat::Json)).unwrap();
        assert_eq!(json["confidence"], 0.82);
        assert_eq!(json["timings"]["total"], 42.5);
    }

    #[test]
    fn test_scorecard_table() {
        assert!(ConsoleFormatter::format_scorecards(&[]).contains("No scorecards"));

        let out = ConsoleFormatter::format_scorecards(&[Scorecard {
            backend_name: "gpt-4o".to_string(),
            task_count: 4,
            avg_quality: 0.812,
            avg_factuality: 0.7,
            avg_latency_ms: 950.0,
            avg_cost_usd: 0.002,
        }]);
        assert!(out.contains("gpt-4o"));
        assert!(out.contains("0.812"));
        assert!(out.contains("950ms"));
    }
}
