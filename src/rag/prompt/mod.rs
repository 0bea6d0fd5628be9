// Prompt assembly for grounded answers


/// Instruction block placed ahead of the retrieved context
pub const SYSTEM_PROMPT: &str = "
You are an AI assistant.
Answer only from the given context.
If answer is not found, say \"Not available\".
";

/// Separator between retrieved chunks in the context block
pub const CONTEXT_SEPARATOR: &str = "\n";

/// Join retrieved chunk texts into one context block, nearest first
#[inline]
pub fn join_context<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Build the prompt sent to the generator.
///
/// The layout is the instruction block, then the context, then the question,
/// each under its own heading. Nothing is truncated.
#[inline]
pub fn build_prompt(context: &str, question: &str) -> String {
    format!("\n{SYSTEM_PROMPT}\n\nContext:\n{context}\n\nQuestion:\n{question}\n\nAnswer:\n")
}
