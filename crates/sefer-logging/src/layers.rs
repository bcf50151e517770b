//! Custom tracing layers for Sefer
//!
//! [`SessionContextLayer`] tags spans with the active session, and
//! [`jsonl_layer`] builds the JSON formatter shared by console and file output.

use tracing::{Subscriber, span};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::{Format, Json, JsonFields};
use tracing_subscriber::{
    layer::{Context, Layer},
    registry::LookupSpan,
};

use crate::config::JsonlConfig;
use crate::context::{SessionContextData, SessionContextGuard};

/// Layer that attaches session context to new spans
///
/// Spans created while a [`SessionContextGuard`] is alive carry a
/// [`SessionExtension`] that later layers can read.
#[derive(Debug, Default)]
pub struct SessionContextLayer;

impl SessionContextLayer {
    pub fn new() -> Self {
        Self
    }
}

/// Extension data stored on spans
#[derive(Debug, Clone)]
pub struct SessionExtension {
    pub data: SessionContextData,
}

impl<S> Layer<S> for SessionContextLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if let Some(data) = SessionContextGuard::current() {
            span.extensions_mut().insert(SessionExtension { data });
        }
    }
}

/// JSONL formatting layer writing to `writer`
pub fn jsonl_layer<S, W>(
    writer: W,
    config: &JsonlConfig,
) -> tracing_subscriber::fmt::Layer<S, JsonFields, Format<Json>, W>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(config.include_spans)
        .flatten_event(config.flatten_events)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread_info)
        .with_thread_names(config.include_thread_info)
        .with_writer(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;
    use uuid::Uuid;

    /// Records the session id found on each new span
    struct Probe(Arc<Mutex<Vec<Option<Uuid>>>>);

    impl<S> Layer<S> for Probe
    where
        S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    {
        fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
            let span = ctx.span(id).unwrap();
            let session = span
                .extensions()
                .get::<SessionExtension>()
                .map(|ext| ext.data.session_id);
            self.0.lock().unwrap().push(session);
        }
    }

    #[test]
    fn test_spans_carry_session() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry()
            .with(SessionContextLayer::new())
            .with(Probe(seen.clone()));

        let session = Uuid::new_v4();
        tracing::subscriber::with_default(subscriber, || {
            let _outside = tracing::info_span!("before");
            let _guard = SessionContextGuard::with_session_id(session);
            let _inside = tracing::info_span!("during");
        });

        assert_eq!(*seen.lock().unwrap(), vec![None, Some(session)]);
    }

    #[test]
    fn test_jsonl_layer_writes_json_lines() {
        let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
        let sink = buffer.clone();
        let writer = move || BufferWriter(sink.clone());
        let subscriber = tracing_subscriber::registry().with(jsonl_layer(
            writer,
            &JsonlConfig {
                include_location: false,
                ..JsonlConfig::default()
            },
        ));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(rows = 3, "Catalog built");
        });

        let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.lines().next().unwrap()).unwrap();
        assert_eq!(line["message"], "Catalog built");
        assert_eq!(line["rows"], 3);
        assert!(line.get("filename").is_none());
    }

    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
