//! Renders the resolved field set plus a knowledge excerpt into a
//! generation request.
//!
//! Pure: same inputs, same prompt text. Two renderings exist (standard and
//! social/compact) differing in verbosity and output-format constraints.

use crate::error::Result;
use crate::fields::ExtractedFields;
use crate::schedule::ValidationIssue;
use crate::turn::OutputMode;
use minijinja::{context, Environment};
use once_cell::sync::Lazy;

/// The section heading the generator must emit and the validator looks for.
pub const SCHEDULE_HEADING: &str = "## Suggested Schedule";

const STANDARD_TEMPLATE: &str = r#"You are a pediatric sleep consultant writing a one-day schedule for a parent.

Child:
- Age: {{ age_label }}
- Usual wake time: {{ wake_time }}
{%- if bedtime %}
- Usual bedtime: {{ bedtime }}
{%- endif %}
{%- if naps_count %}
- Naps per day: {{ naps_count }}
{%- endif %}
{%- if nap_lengths %}
- Typical nap length: {{ nap_lengths }}
{%- endif %}
- Main concern: {{ issue_label }}
{%- if assumptions %}

Assumptions already made on the parent's behalf:
{% for note in assumptions -%}
- {{ note }}
{% endfor %}
{%- endif %}

What the parent wrote:
{{ original_text }}

Background to ground the schedule in:
{{ knowledge }}

Output rules:
{% for rule in rules -%}
- {{ rule }}
{% endfor %}"#;

const SOCIAL_TEMPLATE: &str = r#"Write a compact one-day sleep schedule for a {{ age_label }} old child who wakes around {{ wake_time }}. Main concern: {{ issue_label }}.

Background:
{{ knowledge }}

The parent wrote: {{ original_text }}

Output rules:
{% for rule in rules -%}
- {{ rule }}
{% endfor %}"#;

const REPAIR_TEMPLATE: &str = r#"Your previous draft of a child sleep schedule broke these rules:
{% for issue in issues -%}
- {{ issue }}
{% endfor %}
Rewrite the full document so that every rule below holds. Keep the advice
itself unchanged wherever possible.

Previous draft:
{{ draft }}

Output rules:
{% for rule in rules -%}
- {{ rule }}
{% endfor %}"#;

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    // Templates are static; a failure here is a programming error.
    env.add_template("standard", STANDARD_TEMPLATE)
        .expect("standard template compiles");
    env.add_template("social", SOCIAL_TEMPLATE)
        .expect("social template compiles");
    env.add_template("repair", REPAIR_TEMPLATE)
        .expect("repair template compiles");
    env
});

/// The structural rules embedded in every generation request. The validator
/// checks exactly these properties.
pub fn structural_rules(mode: OutputMode) -> Vec<String> {
    let mut rules = vec![
        format!("Include exactly one section headed '{SCHEDULE_HEADING}'."),
        "Inside it, list each entry on its own line as '- Label: H:MM AM'.".to_string(),
        "Include exactly one 'Wake' entry and make it the first entry.".to_string(),
        "Order entries by time, strictly increasing; no two entries may share a time."
            .to_string(),
        "Close the schedule with a 'Lights Out' entry at or after every other entry."
            .to_string(),
        "Include at least five schedule entries.".to_string(),
    ];
    match mode {
        OutputMode::Standard => {
            rules.insert(
                0,
                "Begin with a warm two or three sentence introduction before any heading."
                    .to_string(),
            );
            rules.push("After the schedule, add a short '## Notes' section.".to_string());
            rules.push("Keep the whole answer under 350 words.".to_string());
        }
        OutputMode::Social => {
            rules.insert(
                0,
                "Begin with a single friendly sentence before the heading.".to_string(),
            );
            rules.push("No other sections; keep the whole answer under 120 words.".to_string());
        }
    }
    rules
}

fn age_label(age_months: u32) -> String {
    format!("{age_months} months")
}

/// Renders the generation request for a resolved field set.
///
/// `fields` must have age and wake time resolved; the dialogue controller
/// guarantees that before generation starts.
pub fn build_prompt(
    fields: &ExtractedFields,
    knowledge: &str,
    original_text: &str,
    mode: OutputMode,
) -> Result<String> {
    let template = match mode {
        OutputMode::Standard => ENV.get_template("standard")?,
        OutputMode::Social => ENV.get_template("social")?,
    };
    let rendered = template.render(context! {
        age_label => fields.age_months.map(age_label).unwrap_or_else(|| "unknown age".to_string()),
        wake_time => fields.wake_time.map(|t| t.format_12h()).unwrap_or_else(|| "7:00 AM".to_string()),
        bedtime => fields.bedtime.map(|t| t.format_12h()),
        naps_count => fields.naps_count,
        nap_lengths => fields.nap_lengths.clone(),
        issue_label => fields
            .main_issue
            .map(|i| i.label().to_string())
            .unwrap_or_else(|| "general sleep quality".to_string()),
        assumptions => fields.assumptions.clone(),
        original_text => original_text,
        knowledge => knowledge,
        rules => structural_rules(mode),
    })?;
    Ok(rendered)
}

/// Renders the single bounded repair request: the violated rules verbatim
/// plus the offending draft.
pub fn build_repair_prompt(draft: &str, issues: &[ValidationIssue]) -> Result<String> {
    let template = ENV.get_template("repair")?;
    let rendered = template.render(context! {
        issues => issues.iter().map(|i| i.message.clone()).collect::<Vec<_>>(),
        draft => draft,
        rules => structural_rules(OutputMode::Standard),
    })?;
    Ok(rendered)
}
