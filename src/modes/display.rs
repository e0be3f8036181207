use crate::metrics::Metrics;
use crate::storage::{ThoughtKind, ThoughtRecord};

const BORDER_WIDTH: usize = 60;
const LINE_CHARS: usize = 56;
const LINE_WIDTH: usize = 58;
const METRICS_RULE: usize = 50;

/// Title line for a thought: revision, branch or plain position.
pub fn thought_title(record: &ThoughtRecord) -> String {
    match record.kind() {
        ThoughtKind::Revision => format!(
            "🔄 Revision of Thought {}",
            record.revises_thought.unwrap_or(record.thought_number)
        ),
        ThoughtKind::Branch => format!(
            "🌿 Branch {} from Thought {}",
            record.branch_id.as_deref().unwrap_or_default(),
            record
                .branch_from
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string())
        ),
        ThoughtKind::Plain => format!(
            "💭 Thought {}/{}",
            record.thought_number, record.total_thoughts
        ),
    }
}

/// All five scores with two decimals, pipe separated.
pub fn metrics_line(metrics: &Metrics) -> String {
    format!(
        "Complexity: {:.2} | Depth: {:.2} | Quality: {:.2} | Impact: {:.2} | Confidence: {:.2}",
        metrics.complexity, metrics.depth, metrics.quality, metrics.impact, metrics.confidence
    )
}

/// Boxed five-line rendering: title, truncated content, metrics.
pub fn render_thought_box(record: &ThoughtRecord) -> String {
    let title = thought_title(record);
    let title_rule = "─".repeat(BORDER_WIDTH.saturating_sub(title.chars().count() + 4));

    [
        format!("┌─ {} ─{}┐", title, title_rule),
        boxed_line(&record.content),
        format!("├─ Metrics ─{}┤", "─".repeat(METRICS_RULE)),
        boxed_line(&metrics_line(&record.metrics)),
        format!("└{}┘", "─".repeat(BORDER_WIDTH)),
    ]
    .join("\n")
}

fn boxed_line(text: &str) -> String {
    let clipped: String = text.chars().take(LINE_CHARS).collect();
    format!("│ {:<width$} │", clipped, width = LINE_WIDTH)
}
