//! Categorized shopping-list extraction from free-form model replies.
//!
//! The reply has no guaranteed format. A single scan over its lines picks
//! out headers (`Produce:`), list items (`- Tomatoes`, `• Milk`, `2. Cumin`)
//! and bare continuation lines under an open header. Anything else is
//! dropped. When nothing structured survives, every non-blank line is kept
//! under one catch-all category so the caller never loses the text.

use crate::diagnostics::{ParseDiagnostics, ParseOutcome};
use crate::types::{ShoppingList, ShoppingListCategory};

/// Label of the catch-all category produced when no header carried items.
pub const FALLBACK_CATEGORY: &str = "Items";

/// How a single trimmed, non-blank line is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Ends with `:`. Holds the label without the trailing colon (may be empty).
    Header(&'a str),
    /// Bullet or numbered item. Holds the text after the marker, trimmed.
    ListItem(&'a str),
    /// Anything else.
    Text {
        /// Lines containing a colon are never accepted as continuation text.
        has_colon: bool,
    },
}

/// Classify an already-trimmed line.
///
/// The trailing-colon check runs first, so `"- Produce:"` is a header.
///
/// # Examples
///
/// ```
/// use shopping_list::output_parser::{classify_line, LineKind};
///
/// assert_eq!(classify_line("Dairy:"), LineKind::Header("Dairy"));
/// assert_eq!(classify_line("• Milk"), LineKind::ListItem("Milk"));
/// assert_eq!(classify_line("12. Cumin"), LineKind::ListItem("Cumin"));
/// assert_eq!(classify_line("Ratio: 2"), LineKind::Text { has_colon: true });
/// ```
pub fn classify_line(trimmed: &str) -> LineKind<'_> {
    if let Some(label) = trimmed.strip_suffix(':') {
        return LineKind::Header(label);
    }
    if let Some(rest) = strip_list_marker(trimmed) {
        return LineKind::ListItem(rest);
    }
    LineKind::Text {
        has_colon: trimmed.contains(':'),
    }
}

/// Strip a leading `-`, `•`, `*` or `<digits>.` marker.
///
/// The marker must be followed by at least one whitespace character.
fn strip_list_marker(line: &str) -> Option<&str> {
    let rest = match line.strip_prefix(|c: char| matches!(c, '-' | '\u{2022}' | '*')) {
        Some(rest) => rest,
        None => {
            let after_digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
            if after_digits.len() == line.len() {
                return None;
            }
            after_digits.strip_prefix('.')?
        }
    };

    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

/// Parse a model reply into categorized items.
///
/// Total over all inputs: blank input gives an empty list, input without
/// usable headers gives a single [`FALLBACK_CATEGORY`] record.
///
/// # Examples
///
/// ```
/// use shopping_list::output_parser::parse_shopping_list;
///
/// let list = parse_shopping_list("Produce:\n- Tomatoes\n- Onions\nDairy:\n- Milk");
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.categories()[0].category, "Produce");
/// assert_eq!(list.categories()[1].items, vec!["Milk"]);
/// ```
pub fn parse_shopping_list(response: &str) -> ShoppingList {
    parse_shopping_list_with_diagnostics(response).0
}

/// Same as [`parse_shopping_list`], also reporting what the scan did.
pub fn parse_shopping_list_with_diagnostics(response: &str) -> (ShoppingList, ParseDiagnostics) {
    let mut scan = Scan::default();

    for line in response.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        scan.diag.lines_scanned += 1;

        match classify_line(trimmed) {
            LineKind::Header(label) => {
                scan.close();
                // An empty label leaves no category open.
                scan.current = (!label.is_empty()).then(|| label.to_string());
            }
            LineKind::ListItem(item) => scan.items.push(item.to_string()),
            LineKind::Text { has_colon: false } if scan.current.is_some() => {
                scan.items.push(trimmed.to_string());
            }
            LineKind::Text { .. } => scan.diag.lines_dropped += 1,
        }
    }
    scan.close();

    let Scan {
        mut output,
        mut diag,
        ..
    } = scan;

    if !output.is_empty() {
        diag.outcome = ParseOutcome::Structured;
    } else if let Some(fallback) = fallback_category(response) {
        output.push(fallback);
        diag.outcome = ParseOutcome::Fallback;
    } else {
        diag.outcome = ParseOutcome::Empty;
    }

    (output, diag)
}

/// Every non-blank line, trimmed, under [`FALLBACK_CATEGORY`].
///
/// `None` when the input is blank.
fn fallback_category(response: &str) -> Option<ShoppingListCategory> {
    let items: Vec<String> = response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    ShoppingListCategory::new(FALLBACK_CATEGORY, items)
}

/// Working state of one parse call.
#[derive(Default)]
struct Scan {
    output: ShoppingList,
    current: Option<String>,
    items: Vec<String>,
    diag: ParseDiagnostics,
}

impl Scan {
    /// Emit the open category if it has items, then reset.
    fn close(&mut self) {
        let items = std::mem::take(&mut self.items);
        match self.current.take() {
            Some(label) => match ShoppingListCategory::new(label, items) {
                Some(category) => self.output.push(category),
                None => self.diag.headers_discarded += 1,
            },
            None => self.diag.orphaned_items += items.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(label: &str, items: &[&str]) -> ShoppingListCategory {
        ShoppingListCategory {
            category: label.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    // ── classify_line ──

    #[test]
    fn header_wins_over_bullet() {
        assert_eq!(classify_line("- Produce:"), LineKind::Header("- Produce"));
    }

    #[test]
    fn header_strips_only_last_colon() {
        assert_eq!(classify_line("Notes::"), LineKind::Header("Notes:"));
        assert_eq!(classify_line(":"), LineKind::Header(""));
    }

    #[test]
    fn bullets_need_whitespace() {
        assert_eq!(classify_line("- Milk"), LineKind::ListItem("Milk"));
        assert_eq!(classify_line("* Eggs"), LineKind::ListItem("Eggs"));
        assert_eq!(classify_line("•\tButter"), LineKind::ListItem("Butter"));
        assert_eq!(classify_line("-Milk"), LineKind::Text { has_colon: false });
        assert_eq!(classify_line("**Bold**"), LineKind::Text { has_colon: false });
    }

    #[test]
    fn numbered_markers() {
        assert_eq!(classify_line("1. Cumin"), LineKind::ListItem("Cumin"));
        assert_eq!(classify_line("10.   Paprika"), LineKind::ListItem("Paprika"));
        assert_eq!(classify_line("1.5 cups rice"), LineKind::Text { has_colon: false });
        assert_eq!(classify_line("2) Salt"), LineKind::Text { has_colon: false });
        assert_eq!(classify_line(". Salt"), LineKind::Text { has_colon: false });
    }

    #[test]
    fn list_item_keeps_inner_colon() {
        assert_eq!(
            classify_line("- Ratio: 2 tomatoes"),
            LineKind::ListItem("Ratio: 2 tomatoes")
        );
    }

    // ── parse_shopping_list ──

    #[test]
    fn headers_and_bullets() {
        let input = "Produce:\n- Tomatoes\n- Onions\nDairy:\n- Milk\n- Cheese";
        let list = parse_shopping_list(input);
        assert_eq!(
            list.into_inner(),
            vec![
                cat("Produce", &["Tomatoes", "Onions"]),
                cat("Dairy", &["Milk", "Cheese"]),
            ]
        );
    }

    #[test]
    fn numbered_list() {
        let list = parse_shopping_list("Spices:\n1. Cumin\n2. Turmeric");
        assert_eq!(list.into_inner(), vec![cat("Spices", &["Cumin", "Turmeric"])]);
    }

    #[test]
    fn empty_category_is_discarded() {
        let (list, diag) = parse_shopping_list_with_diagnostics("Produce:\nDairy:\n- Milk");
        assert_eq!(list.into_inner(), vec![cat("Dairy", &["Milk"])]);
        assert_eq!(diag.headers_discarded, 1);
    }

    #[test]
    fn continuation_lines() {
        let list = parse_shopping_list("Produce:\nTomatoes\nOnions");
        assert_eq!(list.into_inner(), vec![cat("Produce", &["Tomatoes", "Onions"])]);
    }

    #[test]
    fn colon_line_in_body_is_dropped() {
        let (list, diag) = parse_shopping_list_with_diagnostics("Produce:\nRatio: 2 tomatoes");
        // The only header ends up empty, so the fallback takes over with the
        // header line itself as an item.
        assert_eq!(
            list.into_inner(),
            vec![cat(FALLBACK_CATEGORY, &["Produce:", "Ratio: 2 tomatoes"])]
        );
        assert_eq!(diag.lines_dropped, 1);
        assert_eq!(diag.outcome, ParseOutcome::Fallback);
    }

    #[test]
    fn colon_line_dropped_next_to_real_items() {
        let list = parse_shopping_list("Produce:\nRatio: 2 tomatoes\n- Basil");
        assert_eq!(list.into_inner(), vec![cat("Produce", &["Basil"])]);
    }

    #[test]
    fn duplicate_labels_are_not_merged() {
        let list = parse_shopping_list("Dairy:\n- Milk\nProduce:\n- Kale\nDairy:\n- Butter");
        assert_eq!(
            list.into_inner(),
            vec![
                cat("Dairy", &["Milk"]),
                cat("Produce", &["Kale"]),
                cat("Dairy", &["Butter"]),
            ]
        );
    }

    #[test]
    fn items_before_first_header_are_cleared_by_it() {
        // Items seen while no category is open are reset when the first
        // header opens; they do not attach to it.
        let (list, diag) =
            parse_shopping_list_with_diagnostics("- Salt\n- Pepper\nProduce:\n- Tomatoes");
        assert_eq!(list.into_inner(), vec![cat("Produce", &["Tomatoes"])]);
        assert_eq!(diag.orphaned_items, 2);
    }

    #[test]
    fn items_without_any_header_fall_back() {
        let list = parse_shopping_list("- Salt\n- Pepper");
        assert_eq!(list.into_inner(), vec![cat(FALLBACK_CATEGORY, &["- Salt", "- Pepper"])]);
    }

    #[test]
    fn bare_colon_header_closes_without_opening() {
        let list = parse_shopping_list("Dairy:\n- Milk\n:\nloose text\n- Eggs");
        assert_eq!(list.into_inner(), vec![cat("Dairy", &["Milk"])]);
    }

    #[test]
    fn text_before_any_header_is_dropped() {
        let (list, diag) = parse_shopping_list_with_diagnostics(
            "Here is your shopping list\nProduce:\n- Lettuce",
        );
        assert_eq!(list.into_inner(), vec![cat("Produce", &["Lettuce"])]);
        assert_eq!(diag.lines_dropped, 1);
    }

    #[test]
    fn preamble_ending_in_colon_is_a_discarded_header() {
        let list = parse_shopping_list(
            "Here's a shopping list for your recipe:\n\nProduce:\n- Garlic\n\nMeat:\n- Chicken thighs",
        );
        assert_eq!(
            list.into_inner(),
            vec![cat("Produce", &["Garlic"]), cat("Meat", &["Chicken thighs"])]
        );
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(parse_shopping_list("").is_empty());
        assert!(parse_shopping_list("   \n  \n").is_empty());
        let (_, diag) = parse_shopping_list_with_diagnostics("\t\r\n");
        assert_eq!(diag.outcome, ParseOutcome::Empty);
    }

    #[test]
    fn fallback_keeps_every_non_blank_line_trimmed() {
        let list = parse_shopping_list("  eggs \n\nflour\n  sugar: 200g ");
        assert_eq!(
            list.into_inner(),
            vec![cat(FALLBACK_CATEGORY, &["eggs", "flour", "sugar: 200g"])]
        );
    }

    #[test]
    fn crlf_line_endings() {
        let list = parse_shopping_list("Produce:\r\n- Tomatoes\r\n- Onions\r\n");
        assert_eq!(list.into_inner(), vec![cat("Produce", &["Tomatoes", "Onions"])]);
    }

    #[test]
    fn indented_markdown_reply() {
        let input = "\
Shopping list:

**Produce:**
  - 2 avocados
  - 1 lime

Dairy:
  • Sour cream
  3. Cheddar";
        let list = parse_shopping_list(input);
        // "**Produce:**" does not end with a colon and is dropped, so its
        // bullets land under the preamble header.
        assert_eq!(
            list.into_inner(),
            vec![
                cat("Shopping list", &["2 avocados", "1 lime"]),
                cat("Dairy", &["Sour cream", "Cheddar"]),
            ]
        );
    }

    #[test]
    fn unicode_text_is_preserved() {
        let list = parse_shopping_list("Épicerie:\n- Crème fraîche\n- 鶏肉");
        assert_eq!(
            list.into_inner(),
            vec![cat("Épicerie", &["Crème fraîche", "鶏肉"])]
        );
    }
}
