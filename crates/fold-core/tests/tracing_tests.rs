#![forbid(unsafe_code)]

//! Tracing span instrumentation tests.
//!
//! Spans enabled:
//!   cargo test -p fold-core --features tracing --test tracing_tests
//!
//! Without the feature only the zero-overhead check runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[cfg(feature = "tracing")]
use fold_core::{decode, reconcile};
use fold_core::{build, decode_or_default, encode};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
}

#[derive(Clone, Default)]
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl Capture {
    fn span_names(&self) -> Vec<String> {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    #[allow(dead_code)]
    fn span(&self, name: &str) -> Option<CapturedSpan> {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .into_iter()
            .find(|(name, _)| name == "message")
            .map(|(_, value)| value)
            .unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
        });
    }
}

fn with_capture<F: FnOnce()>(f: F) -> Capture {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture
}

// ============================================================================
// Tests
// ============================================================================

#[test]
#[cfg(feature = "tracing")]
fn spans_cover_every_stage() {
    let capture = with_capture(|| {
        let fields = [("hp", Some("Stats")), ("name", None)];
        let old = decode("[Stats{1,hp}]").unwrap();
        let tree = reconcile(&old, build(fields));
        let _ = encode(&tree);
    });

    let names = capture.span_names();
    for expected in ["tree_decode", "tree_build", "tree_reconcile", "tree_encode"] {
        assert!(
            names.iter().any(|n| n == expected),
            "missing span {expected}, got {names:?}"
        );
    }
}

#[test]
#[cfg(feature = "tracing")]
fn decode_span_records_length() {
    let capture = with_capture(|| {
        let _ = decode("[A{0}]");
    });
    let span = capture.span("tree_decode").expect("decode span");
    assert_eq!(span.fields.get("len").map(String::as_str), Some("6"));
}

#[test]
#[cfg(feature = "tracing")]
fn corrupt_text_logs_warning() {
    let capture = with_capture(|| {
        let tree = decode_or_default("[A{1,");
        assert!(tree.is_empty());
    });
    let events = capture.events();
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::WARN && e.message.contains("corrupt")),
        "expected a corruption warning, got {events:?}"
    );
}

#[test]
fn zero_overhead_without_feature() {
    let capture = with_capture(|| {
        let tree = build([("x", Some("A"))]);
        let _ = decode_or_default(&encode(&tree));
    });
    if cfg!(feature = "tracing") {
        assert!(!capture.span_names().is_empty());
    } else {
        assert!(capture.span_names().is_empty());
        assert!(capture.events().is_empty());
    }
}
