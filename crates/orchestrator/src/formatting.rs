//! User-visible rendering of dispatch outcomes.

use provider_core::ProviderOutcome;

/// Render one outcome for display.
///
/// Normal answers are returned as-is. A fallback answer is prefixed with a
/// note naming the requested provider and the substitute; a terminal failure
/// shows the requested provider and the raw error text.
pub fn render_outcome(outcome: &ProviderOutcome) -> String {
    if let Some(error) = &outcome.error {
        return format!(
            "[{} unavailable: {}]",
            outcome.provider.display_name(),
            error
        );
    }

    match outcome.substitute {
        Some(substitute) if outcome.degraded => format!(
            "[{} unavailable, answered by {}]\n{}",
            outcome.provider.display_name(),
            substitute.display_name(),
            outcome.content
        ),
        _ => outcome.content.clone(),
    }
}

/// Render every outcome under a heading, in provider order.
pub fn render_outcomes(outcomes: &[ProviderOutcome]) -> String {
    let mut sorted: Vec<&ProviderOutcome> = outcomes.iter().collect();
    sorted.sort_by_key(|o| o.provider);

    sorted
        .iter()
        .map(|o| format!("## {}\n{}", o.provider.display_name(), render_outcome(o)))
        .collect::<Vec<_>>()
        .join("\n\n")
}
