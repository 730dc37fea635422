//! ASAP / ASAP++ rubric definitions

use super::PromptRubric;

const SOURCE_DEPENDENT: [&str; 4] = ["content", "prompt_adherence", "language", "narrativity"];

const WRITING_TRAITS: [&str; 5] = [
    "content",
    "organization",
    "word_choice",
    "sentence_fluency",
    "conventions",
];

pub(super) fn prompts() -> Vec<PromptRubric> {
    vec![
        PromptRubric::new(1, (2, 12), (1, 6), &WRITING_TRAITS),
        PromptRubric::new(2, (1, 6), (1, 6), &WRITING_TRAITS),
        PromptRubric::new(3, (0, 3), (0, 3), &SOURCE_DEPENDENT),
        PromptRubric::new(4, (0, 3), (0, 3), &SOURCE_DEPENDENT),
        PromptRubric::new(5, (0, 4), (0, 4), &SOURCE_DEPENDENT),
        PromptRubric::new(6, (0, 4), (0, 4), &SOURCE_DEPENDENT),
        PromptRubric::new(7, (0, 30), (0, 6), &["content", "organization", "conventions"]),
        PromptRubric::new(8, (0, 60), (2, 12), &WRITING_TRAITS),
    ]
}
