//! Console and exception capture
//!
//! Listens to the page's console API calls and uncaught exceptions for
//! the whole run. Messages are echoed live so a reader can line them up
//! with the check that provoked them, and recorded so the harness can
//! fail the run when the page reports an error.

use std::sync::Arc;

use chromiumoxide::cdp::js_protocol::runtime::{
    ConsoleApiCalledType, EventConsoleApiCalled, EventExceptionThrown, ExceptionDetails,
    RemoteObject,
};
use chromiumoxide::Page;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::error::SmokeResult;

/// How serious a captured event is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PageSeverity {
    Info,
    Warning,
    /// Fails the run: a console error, a failed assertion, or an uncaught
    /// exception
    Error,
}

/// One captured console message or exception
#[derive(Debug, Clone)]
pub struct PageEvent {
    pub severity: PageSeverity,
    pub message: String,
}

/// Totals over everything captured so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventTotals {
    pub messages: usize,
    pub warnings: usize,
    pub errors: usize,
}

/// Collects page events for the lifetime of a session
pub struct PageEventLog {
    events: Arc<Mutex<Vec<PageEvent>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl PageEventLog {
    /// Subscribe to console and exception events on the page
    pub async fn attach(page: &Page) -> SmokeResult<Self> {
        let events = Arc::new(Mutex::new(Vec::new()));

        let mut console = page.event_listener::<EventConsoleApiCalled>().await?;
        let sink = events.clone();
        let console_task = tokio::spawn(async move {
            while let Some(event) = console.next().await {
                let message = render_args(&event.args);
                println!("📝 Console [{}]: {}", label_of(&event.r#type), message);
                sink.lock().push(PageEvent {
                    severity: severity_of(&event.r#type),
                    message,
                });
            }
        });

        let mut exceptions = page.event_listener::<EventExceptionThrown>().await?;
        let sink = events.clone();
        let exception_task = tokio::spawn(async move {
            while let Some(event) = exceptions.next().await {
                let message = render_exception(&event.exception_details);
                println!("❌ Page Error: {}", message);
                sink.lock().push(PageEvent {
                    severity: PageSeverity::Error,
                    message,
                });
            }
        });

        Ok(Self {
            events,
            tasks: vec![console_task, exception_task],
        })
    }

    /// Everything captured so far, in arrival order
    pub fn snapshot(&self) -> Vec<PageEvent> {
        self.events.lock().clone()
    }

    /// The earliest run-ending event, if any
    pub fn first_fatal(&self) -> Option<PageEvent> {
        self.events
            .lock()
            .iter()
            .find(|e| e.severity == PageSeverity::Error)
            .cloned()
    }

    #[cfg(test)]
    pub(crate) fn seeded(events: Vec<PageEvent>) -> Self {
        Self {
            events: Arc::new(Mutex::new(events)),
            tasks: Vec::new(),
        }
    }

    pub fn totals(&self) -> EventTotals {
        let events = self.events.lock();
        EventTotals {
            messages: events.len(),
            warnings: events
                .iter()
                .filter(|e| e.severity == PageSeverity::Warning)
                .count(),
            errors: events
                .iter()
                .filter(|e| e.severity == PageSeverity::Error)
                .count(),
        }
    }
}

impl Drop for PageEventLog {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn severity_of(kind: &ConsoleApiCalledType) -> PageSeverity {
    match kind {
        ConsoleApiCalledType::Error | ConsoleApiCalledType::Assert => PageSeverity::Error,
        ConsoleApiCalledType::Warning => PageSeverity::Warning,
        _ => PageSeverity::Info,
    }
}

fn label_of(kind: &ConsoleApiCalledType) -> &'static str {
    match kind {
        ConsoleApiCalledType::Log => "log",
        ConsoleApiCalledType::Debug => "debug",
        ConsoleApiCalledType::Info => "info",
        ConsoleApiCalledType::Warning => "warning",
        ConsoleApiCalledType::Error => "error",
        ConsoleApiCalledType::Assert => "assert",
        _ => "console",
    }
}

/// Join console arguments the way the page would have shown them
fn render_args(args: &[RemoteObject]) -> String {
    args.iter()
        .map(|arg| {
            if let Some(value) = &arg.value {
                match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                }
            } else if let Some(description) = &arg.description {
                description.clone()
            } else {
                "<object>".to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_exception(details: &ExceptionDetails) -> String {
    if let Some(exception) = &details.exception {
        if let Some(description) = &exception.description {
            return description.clone();
        }
    }
    details.text.clone()
}
