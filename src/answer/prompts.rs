/// Header that opens the suggestion section of a generated answer.
pub const SUGGESTIONS_HEADER: &str = "**Related Documentation Search Suggestions:**";

/// Marker that starts every suggestion line.
pub const BULLET: &str = "• ";

pub const QUESTION_INSTRUCTIONS: &str = r#"Provide a direct, factual response to the above query. Focus on answering the question directly without unnecessary security assessments or risk analysis. If asked for a list, provide a clear list. If asked for information, provide the information directly.

At the end, suggest 3-5 specific search terms that would help find related documentation. Format these as:

**Related Documentation Search Suggestions:**
• [search term 1]
• [search term 2]
• [search term 3]"#;

pub const ARTICLE_INSTRUCTIONS: &str = r#"Summarize the article above for an internal knowledge base. Give a short executive summary, the key findings as a bulleted list, and any compliance or security considerations a reader should be aware of.

At the end, suggest 3-5 specific search terms that would help find related documentation. Format these as:

**Related Documentation Search Suggestions:**
• [search term 1]
• [search term 2]
• [search term 3]"#;

/// Article text sent to the model is capped at this many chars.
pub const MAX_ARTICLE_CHARS: usize = 12_000;

/// The user's text verbatim, followed by the fixed answer instructions.
pub fn question_prompt(input: &str) -> String {
    format!("{}\n\n{}", input, QUESTION_INSTRUCTIONS)
}

pub fn article_prompt(title: &str, source: &str, content: &str) -> String {
    let body: String = content.chars().take(MAX_ARTICLE_CHARS).collect();
    format!(
        "Title: {}\nSource: {}\n\n{}\n\n{}",
        title, source, body, ARTICLE_INSTRUCTIONS
    )
}
