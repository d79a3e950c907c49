use serde::{Deserialize, Serialize};

/// Request body for quiz generation.
#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    /// CEFR level, A1..C2. Defaults to empty so a missing field fails the
    /// level check instead of the body parse.
    #[serde(default)]
    pub level: String,
}

/// One generated question. The capitalized keys are part of the prompt
/// contract and the frontend consumes them as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    #[serde(rename = "Choice")]
    pub choice: QuizChoices,
    #[serde(rename = "Correct")]
    pub correct: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct QuizChoices {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_question_round_trips_the_capitalized_keys() {
        let raw = r#"{
            "question": "Pick the correct article: __ apple",
            "Choice": {"A": "an", "B": "a", "C": "the", "D": "no article"},
            "Correct": "A"
        }"#;
        let q: QuizQuestion = serde_json::from_str(raw).unwrap();
        assert_eq!(q.choice.a, "an");
        assert_eq!(q.correct, "A");

        let out = serde_json::to_string(&q).unwrap();
        assert!(out.contains("\"Choice\""));
        assert!(out.contains("\"Correct\""));
        assert!(out.contains("\"A\":\"an\""));
    }
}
