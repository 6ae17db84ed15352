//! Prompt formatting.
//!
//! Every message line is tagged with a recency weight `1.5^index` (oldest
//! line is index 0). The tag is plain text inside the prompt; the model gets
//! no other signal from it.

/// Growth factor between consecutive message weights.
pub const WEIGHT_BASE: f64 = 1.5;

/// Weight for the message at `index` (0 = oldest).
pub fn weight(index: usize) -> f64 {
    WEIGHT_BASE.powi(index as i32)
}

/// Format a weight with one decimal place, rounding halves away from zero
/// (2.25 → "2.3").
pub fn format_weight(w: f64) -> String {
    format!("{:.1}", (w * 10.0).round() / 10.0)
}

/// Build the full prompt from chronologically ordered message lines.
///
/// Lines are joined with `\n`. A non-empty persona is appended after a blank
/// line.
pub fn build_prompt<S: AsRef<str>>(lines: &[S], persona: Option<&str>) -> String {
    let mut prompt = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("[Weight: {}] {}", format_weight(weight(i)), line.as_ref()))
        .collect::<Vec<_>>()
        .join("\n");

    if let Some(persona) = persona.filter(|p| !p.is_empty()) {
        prompt.push_str("\n\n");
        prompt.push_str(persona);
    }

    prompt
}
