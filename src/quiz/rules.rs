//! Question catalog and the (question, answer) -> category rule table.

use super::Category;
use serde::Serialize;
use std::collections::HashMap;

/// One answer option and the category it scores for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRule {
    pub text: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// Options in presentation order
    pub options: Vec<AnswerRule>,
}

/// Public view of a question without the scoring key.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView<'a> {
    pub id: &'a str,
    pub text: &'a str,
    pub options: Vec<&'a str>,
}

/// Immutable rule table. The question list doubles as the quiz catalog, so
/// every listed option is one the scorer recognizes.
#[derive(Debug, Clone)]
pub struct RuleTable {
    questions: Vec<Question>,
    index: HashMap<String, HashMap<String, Category>>,
}

impl RuleTable {
    pub fn new(questions: Vec<Question>) -> Self {
        let index = questions
            .iter()
            .map(|q| {
                let options = q
                    .options
                    .iter()
                    .map(|o| (o.text.clone(), o.category))
                    .collect();
                (q.id.clone(), options)
            })
            .collect();
        Self { questions, index }
    }

    /// The eight-question table with descriptive answer text.
    pub fn canonical() -> Self {
        use Category::{Dreamer, Explorer, Strategist, Thinker};

        let rows: [(&str, &str, [(&str, Category); 4]); 8] = [
            (
                "q1",
                "When faced with a problem, how do you usually respond?",
                [
                    ("Analyze it logically", Thinker),
                    ("Look for creative alternatives", Explorer),
                    ("Ask others for input", Dreamer),
                    ("Trust my intuition", Strategist),
                ],
            ),
            (
                "q2",
                "Which statement best describes you at work or school?",
                [
                    ("I like structure and clear plans", Strategist),
                    ("I thrive in spontaneous environments", Explorer),
                    ("I enjoy leading and organizing", Thinker),
                    ("I prefer exploring and experimenting", Dreamer),
                ],
            ),
            (
                "q3",
                "How do you make important decisions?",
                [
                    ("Data-driven", Thinker),
                    ("Gut feeling", Strategist),
                    ("Discussing with people", Dreamer),
                    ("Visualizing future outcomes", Explorer),
                ],
            ),
            (
                "q4",
                "What motivates you the most?",
                [
                    ("Achieving goals efficiently", Thinker),
                    ("Discovering new ideas", Explorer),
                    ("Inspiring others", Dreamer),
                    ("Turning dreams into reality", Strategist),
                ],
            ),
            (
                "q5",
                "Which describes your communication style?",
                [
                    ("Clear and factual", Thinker),
                    ("Empathetic and expressive", Dreamer),
                    ("Strategic and persuasive", Strategist),
                    ("Casual and flexible", Explorer),
                ],
            ),
            (
                "q6",
                "When working in a team, you are...",
                [
                    ("The planner", Strategist),
                    ("The creative thinker", Explorer),
                    ("The motivator", Dreamer),
                    ("The problem solver", Thinker),
                ],
            ),
            (
                "q7",
                "How do you handle unexpected changes?",
                [
                    ("Stay calm and adapt", Strategist),
                    ("Think of a new creative route", Explorer),
                    ("Reassess the plan carefully", Thinker),
                    ("Take a break to rethink", Dreamer),
                ],
            ),
            (
                "q8",
                "Which best describes your focus in life?",
                [
                    ("Growth and mastery", Thinker),
                    ("Freedom and creativity", Explorer),
                    ("Stability and clarity", Strategist),
                    ("Impact and innovation", Dreamer),
                ],
            ),
        ];

        let questions = rows
            .into_iter()
            .map(|(id, text, options)| Question {
                id: id.to_string(),
                text: text.to_string(),
                options: options
                    .into_iter()
                    .map(|(text, category)| AnswerRule {
                        text: text.to_string(),
                        category,
                    })
                    .collect(),
            })
            .collect();

        Self::new(questions)
    }

    /// Exact-match lookup; `None` for unknown questions or answers.
    pub fn category_for(&self, question: &str, answer: &str) -> Option<Category> {
        self.index.get(question)?.get(answer).copied()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn views(&self) -> Vec<QuestionView<'_>> {
        self.questions
            .iter()
            .map(|q| QuestionView {
                id: &q.id,
                text: &q.text,
                options: q.options.iter().map(|o| o.text.as_str()).collect(),
            })
            .collect()
    }
}
