//! Deterministic fallback content used when the AI backend is unavailable.
//!
//! These tables are static, read-only, and loaded once at compile time —
//! never regenerated per request. The engine makes a single generation
//! attempt and then draws from here; there is no retry loop.

use super::mode::InterviewMode;

/// Score assigned by the neutral fallback evaluation.
pub const NEUTRAL_SCORE: u32 = 75;

/// First question per mode when generation fails at session start.
/// Deterministic for a given (mode, target_role).
pub fn first_question(mode: InterviewMode, target_role: &str) -> String {
    match mode {
        InterviewMode::Hr => format!(
            "Tell me about yourself and what draws you to the {target_role} role."
        ),
        InterviewMode::Technical => format!(
            "Walk me through a recent project most relevant to a {target_role} position. \
             What was your specific contribution?"
        ),
        InterviewMode::Behavioral => {
            "Tell me about a time you faced a significant challenge at work. \
             How did you handle it, and what was the outcome?"
                .to_string()
        }
    }
}

const HR_QUESTIONS: &[&str] = &[
    "Why are you looking to leave your current position?",
    "What are your salary expectations for this role?",
    "Where do you see yourself in five years?",
    "What kind of work environment helps you do your best work?",
    "What questions do you have about the team or the company?",
];

const TECHNICAL_QUESTIONS: &[&str] = &[
    "How would you design a system that must stay available while a core dependency is down?",
    "Describe a production bug you diagnosed recently. How did you narrow it down?",
    "What trade-offs do you weigh when choosing between consistency and availability?",
    "How do you approach testing a change you are not fully confident in?",
    "Tell me about a performance problem you solved. How did you measure the improvement?",
    "How do you keep a codebase maintainable as the team grows?",
];

const BEHAVIORAL_QUESTIONS: &[&str] = &[
    "Describe a time you disagreed with a teammate. How did you resolve it?",
    "Tell me about a project that failed. What did you take away from it?",
    "Give me an example of a time you had to deliver under a tight deadline.",
    "Tell me about a time you had to influence a decision without authority.",
];

fn bank(mode: InterviewMode) -> &'static [&'static str] {
    match mode {
        InterviewMode::Hr => HR_QUESTIONS,
        InterviewMode::Technical => TECHNICAL_QUESTIONS,
        InterviewMode::Behavioral => BEHAVIORAL_QUESTIONS,
    }
}

/// Fallback follow-up question for the question at `question_index`
/// (0-based position in the session's question sequence). The index wraps
/// around the bank so repeated fallbacks cycle instead of running out when
/// the bank is shorter than the session's question total.
pub fn next_question(mode: InterviewMode, question_index: usize) -> String {
    let bank = bank(mode);
    bank[question_index % bank.len()].to_string()
}

/// Neutral evaluation when answer scoring fails: encouraging, mid-range,
/// identical every time.
pub fn neutral_evaluation() -> super::engine::AnswerEvaluation {
    super::engine::AnswerEvaluation {
        score: NEUTRAL_SCORE,
        feedback: "Solid answer. You addressed the question directly; adding a concrete \
                   example with measurable results would make it stronger."
            .to_string(),
        strengths: vec![
            "Clear and structured response".to_string(),
            "Stayed relevant to the question".to_string(),
        ],
        improvements: vec![
            "Back up claims with specific examples".to_string(),
            "Quantify results where possible".to_string(),
        ],
    }
}

/// Templated closing summary when final-feedback generation fails.
pub fn final_summary(mode: InterviewMode, overall_score: u32) -> String {
    format!(
        "You completed the {} interview with an overall score of {}/100. \
         You answered every question and kept your responses on topic. To improve, \
         practice structuring answers around concrete situations and measurable \
         outcomes, and review the per-question feedback for specifics.",
        mode.as_str(),
        overall_score
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_question_is_deterministic() {
        let a = first_question(InterviewMode::Hr, "Engineer");
        let b = first_question(InterviewMode::Hr, "Engineer");
        assert_eq!(a, b);
        assert!(a.contains("Engineer"));
    }

    #[test]
    fn test_behavioral_bank_cycles_at_length_four() {
        assert_eq!(BEHAVIORAL_QUESTIONS.len(), 4);
        // 5th question of a behavioral session (0-based index 4) wraps to the
        // first bank entry rather than erroring.
        assert_eq!(
            next_question(InterviewMode::Behavioral, 4),
            BEHAVIORAL_QUESTIONS[0]
        );
        assert_eq!(
            next_question(InterviewMode::Behavioral, 1),
            BEHAVIORAL_QUESTIONS[1]
        );
    }

    #[test]
    fn test_next_question_covers_all_modes_without_panic() {
        for mode in [
            InterviewMode::Hr,
            InterviewMode::Technical,
            InterviewMode::Behavioral,
        ] {
            for i in 0..mode.total_questions() {
                assert!(!next_question(mode, i).is_empty());
            }
        }
    }

    #[test]
    fn test_neutral_evaluation_is_fixed_mid_range() {
        let eval = neutral_evaluation();
        assert_eq!(eval.score, 75);
        assert_eq!(eval.strengths.len(), 2);
        assert_eq!(eval.improvements.len(), 2);
    }

    #[test]
    fn test_final_summary_embeds_score_and_mode() {
        let summary = final_summary(InterviewMode::Technical, 78);
        assert!(summary.contains("78"));
        assert!(summary.contains("technical"));
    }
}
