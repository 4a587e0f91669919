//! # Model Reply Parser
//!
//! Turns an unstructured completion into a categorized
//! [`ShoppingList`](crate::types::ShoppingList). Nothing here can fail:
//! unexpected text is absorbed by the fallback rules instead of surfacing
//! as an error.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`parse_shopping_list`] | Reply text → ordered categories |
//! | [`parse_shopping_list_with_diagnostics`] | Same, plus what the scan did |
//! | [`classify_line`] | Header / list item / text decision for one line |
//! | [`extract_thinking`] | Split `<think>` reasoning from the answer |
//! | [`strip_think_tags`] | Drop `<think>` reasoning |

pub mod extract;
pub mod shopping_list;

pub use extract::{extract_thinking, strip_think_tags};
pub use shopping_list::{
    classify_line, parse_shopping_list, parse_shopping_list_with_diagnostics, LineKind,
    FALLBACK_CATEGORY,
};
