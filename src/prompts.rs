//! Centralized prompt definitions for the solver tools
//!
//! This module contains the Chain of Draft and Chain of Thought instructions
//! sent to the reasoning collaborator, and the line markers the solver parses
//! back out of its reply.

use crate::modes::Approach;

/// Prefix of the line carrying the final answer.
pub const FINAL_ANSWER_MARKER: &str = "FINAL ANSWER:";

/// Prefixes of lines collected as reasoning steps.
pub const STEP_MARKERS: &[&str] = &["DRAFT", "STEP", "COMPARISON"];

/// Answer reported when the reply has no final-answer line.
pub const NO_FINAL_ANSWER: &str = "No final answer provided";

/// Placeholder replaced by the per-step word budget clause.
const WORD_LIMIT_SLOT: &str = "{word_limit}";

/// Instructions for multi-draft reasoning.
pub const CHAIN_OF_DRAFT_PROMPT: &str = r#"Use Chain of Draft reasoning:
1. Create multiple draft solutions (2-3 drafts)
2. For each draft, provide concise reasoning{word_limit}
3. Compare and refine drafts
4. Provide final answer

Format your response as:
DRAFT 1: [reasoning]
DRAFT 2: [reasoning]
DRAFT 3: [reasoning]
COMPARISON: [analysis of drafts]
FINAL ANSWER: [final solution]"#;

/// Instructions for sequential step reasoning.
pub const CHAIN_OF_THOUGHT_PROMPT: &str = r#"Use Chain of Thought reasoning:
1. Break down the problem step by step
2. Show your work for each step{word_limit}
3. Build toward the final answer

Format your response as:
STEP 1: [reasoning]
STEP 2: [reasoning]
STEP 3: [reasoning]
...
FINAL ANSWER: [final solution]"#;

/// Get the instruction template for an approach.
pub fn get_prompt_for_approach(approach: Approach) -> &'static str {
    match approach {
        Approach::ChainOfDraft => CHAIN_OF_DRAFT_PROMPT,
        Approach::ChainOfThought => CHAIN_OF_THOUGHT_PROMPT,
    }
}

/// Build the full solve prompt.
///
/// The per-step word budget is stated only when `enforce_format` is set.
pub fn build_solve_prompt(
    problem: &str,
    domain: &str,
    approach: Approach,
    word_limit: u32,
    enforce_format: bool,
) -> String {
    let limit_clause = if enforce_format {
        format!(" (max {} words per step)", word_limit)
    } else {
        String::new()
    };
    let instructions = get_prompt_for_approach(approach).replace(WORD_LIMIT_SLOT, &limit_clause);

    format!(
        "You are solving a {} problem using {} reasoning.\n\nProblem: {}\n\n{}",
        domain,
        approach.full_name(),
        problem,
        instructions
    )
}
