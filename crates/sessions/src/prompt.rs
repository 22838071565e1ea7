//! Built-in prompts and the fixed markers wrapped around outbound messages.

/// Summary system prompt used when a channel never configured its own.
pub const DEFAULT_PROMPT: &str = concat!(
    "**Your objective**: Summarize the provided texts.\n",
    "**Input**: Several parts of an online meeting transcript will be sent one at a time. ",
    "They are all related to the same meeting.\n",
    "**Output**: Generate a concise summary (2-3 sentences) for the latest chunk of the transcript provided. ",
    "Focus on the content of the discussion (e.g. What was the meeting about? What key points did a participant make? What were the reactions of others?). ",
    "The summary must be mainly in **Chinese Simplified** (a few English words are tolerated). ",
    "When a participant's name is included, prepend an '@' right before it, and leave spaces before the '@' and after the name (e.g. 'name' -> ' @name ').",
);

/// System role for the end-of-session evaluation.
pub const EVALUATOR_ROLE: &str = "You are a meeting evaluator.";

/// Instruction sent after the full transcript at session end.
pub const FINAL_EVAL_PROMPT: &str = concat!(
    "This is the end of the transcript! Please critically comment on each participant's person and performance ",
    "during this meeting based on the entire conversation history above. ",
    "Each comment should be around 2-3 sentences, in a new line. ",
    "The output should only include the participants' names and corresponding comments. ",
    "The comments must be presented in **Chinese Simplified**.",
    "When a participant's name is included, prepend an '@' right before it, and leave spaces before the '@' and after the name (e.g. 'name' -> ' @name ').",
);

pub const INTERVAL_SUMMARY_MARKER: &str = "**⏱️ Interval Summary**:\n";
pub const EVALUATION_MARKER: &str = "**📊 Participant Evaluation**:\n";

/// User message carrying one chunk to summarize.
pub fn chunk_request(chunk: &str) -> String {
    format!("Transcript Chunk:\n{chunk}")
}

/// User message carrying the full transcript to evaluate.
pub fn transcript_request(transcript: &str) -> String {
    format!("Here is the complete transcript of the meeting:\n{transcript}")
}

pub fn interval_summary(summary: &str) -> String {
    format!("{INTERVAL_SUMMARY_MARKER}{summary}")
}

pub fn evaluation(text: &str) -> String {
    format!("{EVALUATION_MARKER}{text}")
}

/// Opening banner posted to the output channel, dated `MM/DD/YYYY`.
pub fn session_banner(date: chrono::NaiveDate) -> String {
    format!("# Summary: {}", date.format("%m/%d/%Y"))
}
