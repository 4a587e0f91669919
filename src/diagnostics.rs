//! Parse diagnostics and telemetry for shopping-list parsing.
//!
//! [`ParseDiagnostics`] records what happened while a model reply was turned
//! into a [`ShoppingList`](crate::types::ShoppingList): whether structured
//! headers were found or the fallback record was used, how much of the text
//! was thrown away, and how many transport retries the upstream call needed.

/// Which branch of the parser produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseOutcome {
    /// At least one header with items was found.
    Structured,
    /// No structured category survived; every non-blank line went into the
    /// single catch-all category.
    Fallback,
    /// The input was blank. Nothing was produced.
    #[default]
    Empty,
}

impl ParseOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseOutcome::Structured => "structured",
            ParseOutcome::Fallback => "fallback",
            ParseOutcome::Empty => "empty",
        }
    }
}

/// Records what happened during shopping-list parsing.
///
/// # Example
///
/// ```
/// use shopping_list::output_parser::parse_shopping_list_with_diagnostics;
/// use shopping_list::diagnostics::ParseOutcome;
///
/// let (list, diag) = parse_shopping_list_with_diagnostics("Produce:\nDairy:\n- Milk");
/// assert_eq!(list.len(), 1);
/// assert_eq!(diag.outcome, ParseOutcome::Structured);
/// assert_eq!(diag.headers_discarded, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    pub outcome: ParseOutcome,

    /// Non-blank lines examined by the scan.
    pub lines_scanned: usize,

    /// Headers closed without any items.
    pub headers_discarded: usize,

    /// Lines that were neither header, list item nor accepted continuation text.
    pub lines_dropped: usize,

    /// List items collected while no category was open and then cleared.
    pub orphaned_items: usize,

    /// Whether `<think>` blocks were removed before parsing.
    pub thinking_stripped: bool,

    /// Number of transport retries (429, 5xx) before the request succeeded.
    pub transport_retries: u32,

    /// Total time spent in backoff delays (milliseconds).
    pub backoff_total_ms: u64,
}

impl ParseDiagnostics {
    /// Quick check: did the reply contain recognizable structure?
    pub fn is_structured(&self) -> bool {
        self.outcome == ParseOutcome::Structured
    }

    pub fn used_fallback(&self) -> bool {
        self.outcome == ParseOutcome::Fallback
    }
}
