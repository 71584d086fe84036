// Assessment LLM prompt templates.
// All prompts for the assessment module are defined here.

pub const ANALYSIS_PROMPT: &str = r#"You are an expert personality assessor based on the Big Five and MBTI models. Given the following candidate answer, analyze it carefully and provide ONLY a strict JSON object with the following structure:

{
  "BigFive": {
    "Openness": <number between 0-100>,
    "Conscientiousness": <number between 0-100>,
    "Extraversion": <number between 0-100>,
    "Agreeableness": <number between 0-100>,
    "Neuroticism": <number between 0-100>
  },
  "MBTI": {
    "Introversion": <number between 0-100>,
    "Extraversion": <number between 0-100>,
    "Sensing": <number between 0-100>,
    "Intuition": <number between 0-100>,
    "Thinking": <number between 0-100>,
    "Feeling": <number between 0-100>,
    "Judging": <number between 0-100>,
    "Perceiving": <number between 0-100>
  }
}

IMPORTANT RULES:
- Respond with only valid JSON, no explanations, no markdown, no comments.
- Ensure all keys are present, even if you estimate or default.
- If uncertain, provide your best estimate (no nulls).

Candidate Answer:
"{answer}""#;

pub const NEXT_QUESTION_PROMPT: &str = "Given the candidate's past responses: '{context}', \
generate the next best behavioral question to assess traits like leadership, teamwork, or conflict resolution. \
Respond ONLY with the question text, no explanations.";

/// Separator between past answers in the next-question context.
pub const ANSWER_SEPARATOR: &str = " | ";
