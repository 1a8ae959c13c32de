//! 提示词构建
//!
//! 云端和本地共用同一套提示词，区别只在上下文截断长度。

/// 云端模型上下文截断长度（字符）
pub const CLOUD_CONTEXT_LIMIT: usize = 50_000;
/// 本地模型上下文截断长度（字符）
pub const LOCAL_CONTEXT_LIMIT: usize = 8_000;

/// 按字符数截断，保证落在字符边界上
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 题目切分提示词
pub fn segment_prompt(question_bank_text: &str) -> String {
    format!(
        r#"You are an expert educational content analyzer.
I have a raw text dump from a Question Bank document.
Your goal is to extract individual questions from this text.

Rules:
1. Ignore headers, footers, page numbers, or instructional text (e.g., "Answer all questions").
2. Extract only the question text.
3. If a question has sub-parts (a, b, c), try to keep them together as one question entry unless they are clearly distinct problems.
4. Return ONLY a JSON array of strings. No other text or explanation.
5. Format: ["question 1", "question 2", "question 3"]

Raw Text:
{}

JSON Array:"#,
        question_bank_text
    )
}

/// 解题提示词
///
/// `context_limit` 为上下文截断长度，见 [`CLOUD_CONTEXT_LIMIT`] / [`LOCAL_CONTEXT_LIMIT`]
pub fn answer_prompt(question: &str, context_notes: &str, context_limit: usize) -> String {
    format!(
        r#"You are an intelligent academic tutor.

Task: Answer the following question comprehensively using the provided Source Notes.

Source Notes:
{}

Question:
{}

Instructions:
1. Answer clearly and concisely.
2. Use the source notes as the primary truth.
3. If the answer is not in the notes, use your general knowledge but mention that it was not explicitly found in the notes.
4. Format with clear paragraphs or bullet points if necessary.
5. Do NOT output Markdown formatting (like **bold**) excessively, as this will go into a plain Word doc. Keep it clean.
6. Provide a direct answer without repeating the question.

Answer:"#,
        truncate_chars(context_notes, context_limit),
        question
    )
}
