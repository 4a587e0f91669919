//! Reasoning-block removal applied to model replies before parsing.
//!
//! Some models prepend `<think>...</think>` (or `<thinking>`) reasoning to
//! their answer. Left in place, its lines would be scanned as shopping-list
//! text, so the generator separates it out first.

const TAG_VARIANTS: [(&str, &str); 2] = [("<think>", "</think>"), ("<thinking>", "</thinking>")];

/// Split a reply into `(reasoning, answer)`.
///
/// All complete blocks of both tag variants are collected (joined with a
/// blank line) and removed. An unclosed opening tag swallows the rest of
/// the text. The answer keeps its inner line structure; only the outer
/// whitespace is trimmed.
///
/// # Examples
///
/// ```
/// use shopping_list::output_parser::extract_thinking;
///
/// let (thinking, answer) = extract_thinking("<think>dairy first</think>\nDairy:\n- Milk");
/// assert_eq!(thinking.as_deref(), Some("dairy first"));
/// assert_eq!(answer, "Dairy:\n- Milk");
/// ```
pub fn extract_thinking(text: &str) -> (Option<String>, String) {
    let mut blocks = Vec::new();
    let mut answer = text.to_string();

    for (open, close) in TAG_VARIANTS {
        answer = take_tag_variant(&answer, open, close, &mut blocks);
    }

    let thinking = blocks
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>();
    let thinking = (!thinking.is_empty()).then(|| thinking.join("\n\n"));

    (thinking, answer.trim().to_string())
}

/// Strip all `<think>` / `<thinking>` blocks, discarding their content.
///
/// ```
/// use shopping_list::output_parser::strip_think_tags;
///
/// assert_eq!(strip_think_tags("<think>hmm</think>Produce:"), "Produce:");
/// assert_eq!(strip_think_tags("<think>never closed"), "");
/// ```
pub fn strip_think_tags(text: &str) -> String {
    extract_thinking(text).1
}

fn take_tag_variant(text: &str, open: &str, close: &str, blocks: &mut Vec<String>) -> String {
    let mut result = text.to_string();
    while let Some(start) = result.find(open) {
        let body_start = start + open.len();
        if let Some(end_offset) = result[body_start..].find(close) {
            let body_end = body_start + end_offset;
            blocks.push(result[body_start..body_end].to_string());
            result = format!("{}{}", &result[..start], &result[body_end + close.len()..]);
        } else {
            // No closing tag: everything after the open tag is reasoning.
            blocks.push(result[body_start..].to_string());
            result.truncate(start);
            break;
        }
    }
    result
}
