// tests/common/mod.rs
// Shared helpers: a tracing layer that records warn/error events.
#![allow(dead_code)]

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Captured {
    pub level: Level,
    pub target: String,
    pub source: Option<String>,
    pub attempt: Option<u64>,
}

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Captured>>>);

impl EventLog {
    pub fn all(&self) -> Vec<Captured> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.all().iter().filter(|e| e.level == level).count()
    }

    pub fn count_for(&self, level: Level, source: &str) -> usize {
        self.all()
            .iter()
            .filter(|e| e.level == level && e.source.as_deref() == Some(source))
            .count()
    }

    /// Install as the thread-local default; events are captured until the guard drops.
    /// Use with the (default) current-thread `#[tokio::test]` runtime.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }
}

#[derive(Default)]
struct FieldGrab {
    source: Option<String>,
    attempt: Option<u64>,
}

impl Visit for FieldGrab {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "attempt" {
            self.attempt = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "source" {
            self.source = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        // `source = %name` arrives here, formatted through Display.
        if field.name() == "source" {
            self.source = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > Level::WARN {
            // INFO/DEBUG/TRACE are noise for these assertions.
            return;
        }
        let mut grab = FieldGrab::default();
        event.record(&mut grab);
        self.0.lock().unwrap().push(Captured {
            level: *meta.level(),
            target: meta.target().to_string(),
            source: grab.source,
            attempt: grab.attempt,
        });
    }
}
