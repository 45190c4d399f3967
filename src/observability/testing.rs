//! Span capture for unit tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// One span as it was opened.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub fields: HashMap<String, String>,
}

/// Layer that remembers every span created while it is installed.
#[derive(Clone, Default)]
pub struct SpanRecorder {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
}

impl SpanRecorder {
    /// Install as the thread's default subscriber until the guard drops.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let recorder = Self::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (recorder, guard)
    }

    pub fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The only span called `name`; panics if there are none or several.
    pub fn single(&self, name: &str) -> CapturedSpan {
        let matching: Vec<_> = self.spans().into_iter().filter(|s| s.name == name).collect();
        assert_eq!(matching.len(), 1, "expected one `{name}` span, got {matching:?}");
        matching.into_iter().next().unwrap_or_else(|| unreachable!())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.spans().iter().map(|s| s.name).collect()
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S> Layer<S> for SpanRecorder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, ctx: Context<'_, S>) {
        let parent = if attrs.is_root() {
            None
        } else if let Some(id) = attrs.parent() {
            ctx.span(id).map(|s| s.name())
        } else {
            ctx.lookup_current().map(|s| s.name())
        };

        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));

        self.spans
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(CapturedSpan {
                name: attrs.metadata().name(),
                parent,
                fields,
            });
    }
}
