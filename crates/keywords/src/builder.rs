//! Payload builder for matched keywords.

use crate::types::{InstructionPayload, Keyword, USER_PROMPT_SUBMIT};

/// Build the instruction payload for `matches`, already in priority order.
///
/// No matches yield the bare `continue` payload.
pub fn build_payload(matches: &[&Keyword]) -> InstructionPayload {
    match format_context(matches) {
        Some(context) => InstructionPayload::with_context(USER_PROMPT_SUBMIT, context),
        None => InstructionPayload::proceed(),
    }
}

/// Render the side-channel text for `matches`.
pub fn format_context(matches: &[&Keyword]) -> Option<String> {
    match matches {
        [] => None,
        [keyword] => Some(format_single(keyword)),
        _ => Some(format_multiple(matches)),
    }
}

fn format_single(keyword: &Keyword) -> String {
    let mut context = format!("[MAGIC KEYWORD: {}]\n\n", keyword.name.to_uppercase());
    context.push_str(keyword.instruction.trim());

    if let Some(skill) = &keyword.skill {
        context.push_str("\n\n");
        context.push_str(&skill_lines(skill, keyword.skill_args.as_deref()));
        context.push_str("\nInvoke this skill IMMEDIATELY, before doing anything else.");
    }

    context
}

fn format_multiple(matches: &[&Keyword]) -> String {
    let banner = matches
        .iter()
        .map(|keyword| keyword.name.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");

    let mut context = format!("[MAGIC KEYWORDS: {}]", banner);

    for keyword in matches {
        context.push_str(&format!("\n\n## {}\n", keyword.name.to_uppercase()));
        context.push_str(keyword.instruction.trim());
        if let Some(skill) = &keyword.skill {
            context.push('\n');
            context.push_str(&skill_lines(skill, keyword.skill_args.as_deref()));
        }
    }

    if matches.iter().any(|keyword| keyword.skill.is_some()) {
        context.push_str(
            "\n\nInvoke ALL of the skills listed above IMMEDIATELY, in the order shown.",
        );
    }

    context
}

fn skill_lines(skill: &str, args: Option<&str>) -> String {
    match args {
        Some(args) if !args.trim().is_empty() => {
            format!("Skill: {}\nArguments: {}", skill, args.trim())
        }
        _ => format!("Skill: {}", skill),
    }
}
