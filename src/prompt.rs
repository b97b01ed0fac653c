//! Prompt assembly.
//!
//! The user prompt concatenates, in fixed order: the formatted conversation
//! history, the retrieved document context in rank order, a fixed instruction
//! block, and the literal question. The instruction block deliberately
//! duplicates the orchestrator's memory gate: even when stale history
//! survives the heuristic, the generator is told to ignore it for unrelated
//! questions. Both safety nets are kept as independent contracts.

use crate::models::ScoredChunk;

/// Separator between rendered chunks.
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// Fixed sentence the model must use when the documents lack the answer.
pub const NOT_FOUND_SENTENCE: &str = "I could not find that information in the documents.";

/// Fixed sentence for questions unrelated to the corpus.
pub const OFF_TOPIC_SENTENCE: &str =
    "That question is not related to the provided documents.";

/// Persona, style, and grounding rules handed to the generator unchanged on
/// every call.
pub const SYSTEM_PROMPT: &str = "\
You are a senior data analyst and assistant. Your mission is to read the \
provided documents and answer the user's questions in a clear, organized, \
and complete way.

RESPONSE GUIDELINES:
1. VISUAL STRUCTURE:
   - Use **bold** to highlight key concepts, names, and dates.
   - Use bullet lists to group related information.
   - Use short paragraphs for readability.

2. CRITICAL RULES:
   1. **Answer ONLY from the documents provided in the context.**
   2. **If the information is NOT in the documents, say exactly: \"I could not find that information in the documents.\"**
   3. **NEVER invent information or make assumptions.**
   4. **Be direct and concise. Avoid repetition.**
   5. **If the question makes no sense for these documents, say: \"That question is not related to the provided documents.\"**

3. CONTENT:
   - Answer only from the documents, synthesizing across sections when needed.

4. TONE:
   - Professional, objective, and helpful.";

/// Render retrieved chunks with their source labels, preserving rank order.
pub fn render_context(chunks: &[ScoredChunk]) -> String {
    if chunks.is_empty() {
        return "(no matching documents)".to_string();
    }

    chunks
        .iter()
        .map(|sc| format!("[Source: {}]\n{}", sc.chunk.meta.source, sc.chunk.content))
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}

/// Assemble the full user prompt: history, context, instructions, question.
pub fn build_user_prompt(history: &str, context: &str, question: &str) -> String {
    format!(
        "=== CONVERSATION HISTORY ===\n\
         {history}\n\n\
         === DOCUMENT CONTEXT ===\n\
         {context}\n\n\
         === CRITICAL INSTRUCTIONS ===\n\
         1. **TOPIC-CHANGE DETECTION:**\n\
         \x20  - If the current question is NOT related to the history (for example, it changes the subject entirely), IGNORE the history and answer ONLY from the documents.\n\
         2. **USE OF HISTORY:**\n\
         \x20  - Use the history ONLY when the question explicitly refers to something said before (words like \"this\", \"that\", \"they\", \"you said\").\n\
         3. **PRIORITY:**\n\
         \x20  - ALWAYS answer from the DOCUMENTS, not from inference.\n\
         \x20  - If the information is NOT in the documents, say exactly: \"{not_found}\"\n\
         \x20  - NEVER invent information or repeat earlier answers when they are not relevant.\n\
         4. **CLARITY:**\n\
         \x20  - Be direct and concise. Do not repeat information unless asked.\n\n\
         === CURRENT QUESTION ===\n\
         {question}\n\n\
         Answer objectively, based ONLY on the information in the documents.",
        history = history,
        context = context,
        not_found = NOT_FOUND_SENTENCE,
        question = question,
    )
}
