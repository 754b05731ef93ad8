//! Output layers the subscriber builder composes
//!
//! Picker attribution travels as ordinary span fields (see
//! [`PickerContext::span`](crate::PickerContext::span)), so both layers
//! print it without any extra bookkeeping.

use tracing::Subscriber;
use tracing_subscriber::{Layer, fmt::MakeWriter, registry::LookupSpan};

use crate::config::JsonlConfig;

/// A type-erased layer over subscriber `S`
pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Human-readable console layer
pub fn pretty_console_layer<S>(ansi: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .boxed()
}

/// JSONL layer writing to `writer`
///
/// Event fields sit at the top level; the current span and its fields sit
/// under `span`.
pub fn jsonl_layer<S, W>(writer: W, config: &JsonlConfig) -> BoxedLayer<S>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(config.span_list)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_writer(writer)
        .boxed()
}
