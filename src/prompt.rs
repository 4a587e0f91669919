use std::collections::HashMap;

/// System instructions sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that organizes shopping lists. \
Create a structured shopping list based on the recipe description, grouping items by category \
(e.g., Produce, Meat, Dairy, etc.).";

/// User prompt; `{input}` is replaced by the meal description.
pub const USER_PROMPT_TEMPLATE: &str =
    "Create a shopping list organized by categories for this recipe: {input}";

/// Sentinel that should never appear in real templates.
const ESCAPE_SENTINEL: &str = "\x00LBRACE\x00";
/// Sentinel for escaped closing brace.
const ESCAPE_SENTINEL_CLOSE: &str = "\x00RBRACE\x00";

/// Build a prompt string with variable substitution.
///
/// Replaces `{key}` placeholders with values from `vars` and `{input}` with
/// `input`. Use `{{` / `}}` for literal braces.
///
/// # Example
///
/// ```
/// use shopping_list::prompt::{render, USER_PROMPT_TEMPLATE};
/// use std::collections::HashMap;
///
/// let prompt = render(USER_PROMPT_TEMPLATE, "chili for four", &HashMap::new());
/// assert!(prompt.ends_with("for this recipe: chili for four"));
/// ```
pub fn render(template: &str, input: &str, vars: &HashMap<String, String>) -> String {
    let mut rendered = template
        .replace("{{", ESCAPE_SENTINEL)
        .replace("}}", ESCAPE_SENTINEL_CLOSE);

    for (key, value) in vars {
        rendered = rendered.replace(&format!("{{{}}}", key), value);
    }
    // Input last, so braces inside the user's text are never treated as placeholders.
    rendered = rendered.replace("{input}", input);

    rendered
        .replace(ESCAPE_SENTINEL, "{")
        .replace(ESCAPE_SENTINEL_CLOSE, "}")
}

/// First `max_chars` characters of `text`, with `...` appended if cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
