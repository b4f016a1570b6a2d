// All LLM prompt constants for the interview engine.
// Question prompts return plain text; evaluation prompts enforce JSON-only.

use crate::models::session::{AnswerTurn, QuestionTurn};

/// System prompt for question generation — one question, no preamble.
pub const QUESTION_SYSTEM: &str = "You are an experienced interviewer running a mock interview. \
    Respond with EXACTLY ONE interview question as plain text. \
    Do NOT number the question. \
    Do NOT add commentary, preamble, or quotation marks.";

/// First-question prompt template.
/// Replace: {mode_description}, {target_role}, {candidate_context}
pub const FIRST_QUESTION_TEMPLATE: &str = r#"You are conducting {mode_description}.

Target role: {target_role}
{candidate_context}
Ask your opening question. It should be appropriate as the very first question of the interview."#;

/// Next-question prompt template. The full running history keeps follow-ups
/// coherent with what the candidate already said.
/// Replace: {mode_description}, {target_role}, {history}
pub const NEXT_QUESTION_TEMPLATE: &str = r#"You are conducting {mode_description}.

Target role: {target_role}

Interview so far:
{history}

Ask the next question. Build on the candidate's previous answers where useful, and do not repeat a question already asked."#;

/// System prompt for answer evaluation — enforces JSON-only output.
pub const EVALUATION_SYSTEM: &str = "You are a precise interview assessor. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Answer evaluation prompt template.
/// Replace: {mode}, {target_role}, {question}, {answer}
pub const EVALUATION_TEMPLATE: &str = r#"Evaluate this mock-interview answer for a {target_role} candidate in a {mode} interview.

QUESTION:
{question}

ANSWER:
{answer}

Return a JSON object with this EXACT schema (no extra fields):
{
  "score": 82,
  "feedback": "Two to four sentences of direct, constructive feedback.",
  "strengths": ["short phrase", "short phrase"],
  "improvements": ["short phrase", "short phrase"]
}

Rules:
- "score" is an integer from 0 to 100.
- Judge substance over polish: specificity, relevance, and evidence.
- Keep strengths and improvements to 1-3 items each, a few words per item."#;

/// Closing-feedback prompt template, sent after the final answer.
/// Replace: {mode_description}, {target_role}, {history}, {overall_score}
pub const FINAL_FEEDBACK_TEMPLATE: &str = r#"The mock interview below has ended. You conducted {mode_description} for a {target_role} candidate. Their overall score is {overall_score}/100.

Full transcript with per-answer scores:
{history}

Write a short closing assessment (4-6 sentences, plain text): overall impression, the candidate's strongest pattern, and the single most valuable thing to work on."#;

/// Renders the running history as `Qn` / `An (score)` pairs for prompts.
pub fn format_history(questions: &[QuestionTurn], answers: &[AnswerTurn]) -> String {
    let mut out = String::new();
    for (i, q) in questions.iter().enumerate() {
        out.push_str(&format!("Q{}: {}\n", i + 1, q.question));
        if let Some(a) = answers.get(i) {
            out.push_str(&format!("A{} (score {}): {}\n", i + 1, a.score, a.answer));
        }
    }
    out
}

/// Renders optional candidate context as a prompt block, or an empty string.
pub fn format_candidate_context(context: Option<&super::engine::CandidateContext>) -> String {
    let Some(ctx) = context else {
        return String::new();
    };

    let mut lines = Vec::new();
    if let Some(headline) = &ctx.headline {
        lines.push(format!("Headline: {headline}"));
    }
    if !ctx.skills.is_empty() {
        lines.push(format!("Skills: {}", ctx.skills.join(", ")));
    }
    if let Some(years) = ctx.years_experience {
        lines.push(format!("Years of experience: {years}"));
    }
    if let Some(excerpt) = &ctx.resume_excerpt {
        lines.push(format!("Resume excerpt:\n{excerpt}"));
    }

    if lines.is_empty() {
        String::new()
    } else {
        format!("\nCandidate background:\n{}\n", lines.join("\n"))
    }
}
