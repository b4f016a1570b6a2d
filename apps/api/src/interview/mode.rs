use serde::{Deserialize, Serialize};

/// Interview flavor. Fixed at session creation; determines the question
/// count and the tone of generated questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InterviewMode {
    Hr,
    Technical,
    Behavioral,
}

impl InterviewMode {
    /// Total questions a session of this mode asks before completing.
    pub fn total_questions(&self) -> usize {
        match self {
            InterviewMode::Hr => 6,
            InterviewMode::Technical => 8,
            InterviewMode::Behavioral => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewMode::Hr => "hr",
            InterviewMode::Technical => "technical",
            InterviewMode::Behavioral => "behavioral",
        }
    }

    /// Interviewer persona description fed into question-generation prompts.
    pub fn description(&self) -> &'static str {
        match self {
            InterviewMode::Hr => {
                "an HR screening interview covering motivation, culture fit, \
                 salary expectations, and career goals"
            }
            InterviewMode::Technical => {
                "a technical interview probing hands-on skills, system design \
                 reasoning, debugging approach, and depth in the candidate's stack"
            }
            InterviewMode::Behavioral => {
                "a behavioral interview using STAR-style questions about past \
                 situations, conflict, leadership, and failure"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_questions_per_mode() {
        assert_eq!(InterviewMode::Hr.total_questions(), 6);
        assert_eq!(InterviewMode::Technical.total_questions(), 8);
        assert_eq!(InterviewMode::Behavioral.total_questions(), 5);
    }

    #[test]
    fn test_mode_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&InterviewMode::Technical).unwrap(),
            r#""technical""#
        );
        let mode: InterviewMode = serde_json::from_str(r#""hr""#).unwrap();
        assert_eq!(mode, InterviewMode::Hr);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result = serde_json::from_str::<InterviewMode>(r#""casual""#);
        assert!(result.is_err());
    }
}
