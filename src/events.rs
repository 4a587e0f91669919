//! Event system for generation lifecycle hooks.
//!
//! Optional, non-intrusive observation of a generation call. Implement
//! [`EventHandler`] to drive progress indicators or collect telemetry;
//! plain logging goes through the `log` facade regardless.

use std::sync::Arc;

use crate::diagnostics::ParseOutcome;
use crate::types::RecipeId;

/// Events emitted while a shopping list is generated and stored.
#[derive(Debug, Clone)]
pub enum Event {
    /// A generation call has started.
    GenerationStart {
        /// Model the request is sent to.
        model: String,
        /// First characters of the description.
        preview: String,
    },
    /// A transport-level retry due to HTTP error.
    TransportRetry {
        /// The retry attempt number (1-indexed).
        attempt: u32,
        /// Delay before this retry attempt in milliseconds.
        delay_ms: u64,
        /// Reason for the retry (error description).
        reason: String,
    },
    /// The model reply was parsed.
    Parsed {
        outcome: ParseOutcome,
        categories: usize,
        items: usize,
    },
    /// The generated list was persisted.
    Stored { recipe_id: RecipeId },
    /// The generation call has finished.
    GenerationEnd {
        /// Whether it succeeded.
        ok: bool,
    },
}

/// Handler for generation lifecycle events.
///
/// # Example
///
/// ```
/// use shopping_list::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         if let Event::Parsed { categories, items, .. } = event {
///             println!("{} categories, {} items", categories, items);
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_fn_handler_receives_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: Option<Arc<dyn EventHandler>> =
            Some(Arc::new(FnEventHandler(move |event: Event| {
                sink.lock().unwrap().push(format!("{:?}", event));
            })));

        emit(&handler, Event::GenerationEnd { ok: true });
        emit(&None, Event::GenerationEnd { ok: false });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("ok: true"));
    }
}
