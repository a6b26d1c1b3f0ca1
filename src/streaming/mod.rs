pub mod parser;
pub mod sse;

pub use parser::EventLineParser;
pub use sse::SseEventGenerator;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt::Display;
use std::io;

struct DrainState<S> {
    upstream: S,
    parser: EventLineParser,
    pending: VecDeque<String>,
    exhausted: bool,
}

/// The backend body reduced to its payload fragments, in arrival order.
///
/// Upstream read errors are not distinguishable from EOF by design: the
/// fragment stream simply ends (after flushing any buffered trailing line),
/// and the caller finishes the reply normally.
fn payload_fragments<S, E>(upstream: S) -> impl Stream<Item = String> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin + 'static,
    E: Display + Send + 'static,
{
    let state = DrainState {
        upstream,
        parser: EventLineParser::new(),
        pending: VecDeque::new(),
        exhausted: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(fragment) = st.pending.pop_front() {
                return Some((fragment, st));
            }
            if st.exhausted {
                return None;
            }
            match st.upstream.next().await {
                Some(Ok(chunk)) => st.pending.extend(st.parser.feed(&chunk)),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "backend stream ended early");
                    st.exhausted = true;
                    st.pending.extend(st.parser.finish());
                }
                None => {
                    st.exhausted = true;
                    st.pending.extend(st.parser.finish());
                }
            }
        }
    })
}

/// Reframe the backend stream as client-facing SSE chunks.
///
/// Emits the role-announcement chunk first, then one content chunk per
/// payload fragment in arrival order, then the terminal chunk and the
/// literal `[DONE]` frame. Every yielded item is one flush, so fragment
/// boundaries reach the client exactly as the backend produced them.
pub fn reframe_stream<S, E>(
    upstream: S,
    model: String,
) -> impl Stream<Item = io::Result<Bytes>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin + 'static,
    E: Display + Send + 'static,
{
    let generator = SseEventGenerator::new(&model);

    let head = stream::iter([Bytes::from(generator.role_event())]);
    let tail = stream::iter([
        Bytes::from(generator.finish_event()),
        Bytes::from(SseEventGenerator::done_event()),
    ]);
    let deltas = payload_fragments(upstream)
        .map(move |fragment| Bytes::from(generator.content_event(&fragment)));

    head.chain(deltas).chain(tail).map(Ok::<Bytes, io::Error>)
}

/// Drain the backend stream into one consolidated content string, applying
/// the same fragment filtering as the streaming path and concatenating with
/// no separator.
pub async fn aggregate_content<S, E>(upstream: S) -> String
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin + 'static,
    E: Display + Send + 'static,
{
    payload_fragments(upstream)
        .collect::<Vec<String>>()
        .await
        .concat()
}
