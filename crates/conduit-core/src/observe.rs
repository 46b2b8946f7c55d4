use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use futures::StreamExt as _;
use tracing::{info, warn};

use crate::client::{MessageSource, MessageStream};
use crate::message::AgentMessage;

/// Error type observers may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Side-effecting callback invoked once per produced message.
///
/// Observers must not alter the messages they see. A failing observer is
/// logged as a warning and never interrupts the stream.
pub trait MessageObserver: Send + Sync {
    fn observe(&self, message: &AgentMessage) -> Result<(), BoxError>;
}

impl<F> MessageObserver for F
where
    F: Fn(&AgentMessage) -> Result<(), BoxError> + Send + Sync,
{
    fn observe(&self, message: &AgentMessage) -> Result<(), BoxError> {
        self(message)
    }
}

/// Built-in observer that logs each message as pretty-printed JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonLogObserver;

impl MessageObserver for JsonLogObserver {
    fn observe(&self, message: &AgentMessage) -> Result<(), BoxError> {
        let rendered = serde_json::to_string_pretty(message.as_value())?;
        info!("received message: {rendered}");
        Ok(())
    }
}

/// Streaming session wrapped with an optional message observer.
///
/// Every capability of the inner session other than [`MessageSource`] stays
/// fully usable through `Deref`/`DerefMut` and operates on the inner session
/// itself, so a method reached through the wrapper behaves exactly as it
/// would on the unwrapped session. [`ObservedSession::into_inner`] unwraps
/// the session entirely for callers that want the raw object back.
///
/// Only the message stream is intercepted, and only when an observer is
/// installed: without one, [`MessageSource::messages`] hands back the inner
/// session's own stream untouched.
pub struct ObservedSession<S> {
    inner: S,
    observer: Option<Arc<dyn MessageObserver>>,
}

impl<S> ObservedSession<S> {
    pub(crate) fn new(inner: S, observer: Option<Arc<dyn MessageObserver>>) -> Self {
        Self { inner, observer }
    }

    /// Returns the wrapped session, discarding the observer.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// True when a message observer is installed.
    pub fn is_observed(&self) -> bool {
        self.observer.is_some()
    }
}

impl<S> Deref for ObservedSession<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> DerefMut for ObservedSession<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: fmt::Debug> fmt::Debug for ObservedSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedSession")
            .field("inner", &self.inner)
            .field("observed", &self.is_observed())
            .finish()
    }
}

impl<S: MessageSource> MessageSource for ObservedSession<S> {
    fn messages(&mut self) -> MessageStream {
        let stream = self.inner.messages();
        let Some(observer) = self.observer.clone() else {
            return stream;
        };
        Box::pin(stream.inspect(move |item| {
            if let Ok(message) = item
                && let Err(error) = observer.observe(message)
            {
                warn!(%error, "message observer failed; continuing stream");
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;
    use futures::{StreamExt as _, stream};
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Thin address of a boxed stream, for referential-equality checks.
    fn stream_addr(stream: &MessageStream) -> usize {
        std::ptr::from_ref(&**stream).cast::<()>() as usize
    }

    struct StubSession {
        items: Vec<Result<AgentMessage, ClientError>>,
        counter: u32,
        last_stream_addr: Arc<Mutex<Option<usize>>>,
    }

    impl StubSession {
        fn new(items: Vec<Result<AgentMessage, ClientError>>) -> Self {
            Self {
                items,
                counter: 0,
                last_stream_addr: Arc::new(Mutex::new(None)),
            }
        }

        fn bump(&mut self, by: u32) -> u32 {
            self.counter += by;
            self.counter
        }

        async fn label(&self, name: &str) -> String {
            format!("session:{name}")
        }
    }

    impl MessageSource for StubSession {
        fn messages(&mut self) -> MessageStream {
            let stream: MessageStream = Box::pin(stream::iter(std::mem::take(&mut self.items)));
            *self.last_stream_addr.lock().unwrap() = Some(stream_addr(&stream));
            stream
        }
    }

    fn tagged(tag: &str, seq: u64) -> AgentMessage {
        AgentMessage::from(json!({ "type": tag, "seq": seq }))
    }

    struct RecordingObserver {
        seen: Mutex<Vec<AgentMessage>>,
    }

    impl MessageObserver for RecordingObserver {
        fn observe(&self, message: &AgentMessage) -> Result<(), BoxError> {
            self.seen.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct FailingObserver {
        calls: AtomicUsize,
    }

    impl MessageObserver for FailingObserver {
        fn observe(&self, _message: &AgentMessage) -> Result<(), BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err("observer always fails".into())
        }
    }

    #[tokio::test]
    async fn capabilities_reach_the_inner_session_through_the_wrapper() {
        let mut session = ObservedSession::new(StubSession::new(Vec::new()), None);
        assert_eq!(session.bump(2), 2);
        assert_eq!(session.bump(3), 5);
        assert_eq!(session.label("x").await, "session:x");
        // The same state is visible after unwrapping.
        assert_eq!(session.into_inner().counter, 5);
    }

    #[tokio::test]
    async fn without_observer_the_inner_stream_is_returned_untouched() {
        let stub = StubSession::new(vec![Ok(tagged("assistant", 1))]);
        let addr_handle = Arc::clone(&stub.last_stream_addr);
        let mut session = ObservedSession::new(stub, None);

        let stream = session.messages();
        let inner_addr = addr_handle.lock().unwrap().expect("stream taken");
        assert_eq!(
            stream_addr(&stream),
            inner_addr,
            "expected referential pass-through"
        );
    }

    #[tokio::test]
    async fn items_are_observed_and_yielded_in_order() {
        let messages = vec![tagged("system", 1), tagged("assistant", 2), tagged("result", 3)];
        let stub = StubSession::new(messages.iter().cloned().map(Ok).collect());
        let observer = Arc::new(RecordingObserver {
            seen: Mutex::new(Vec::new()),
        });
        let mut session = ObservedSession::new(stub, Some(observer.clone()));

        let yielded: Vec<AgentMessage> = session
            .messages()
            .map(|item| item.expect("no errors in this stream"))
            .collect()
            .await;

        assert_eq!(yielded, messages);
        assert_eq!(*observer.seen.lock().unwrap(), messages);
    }

    #[tokio::test]
    async fn failing_observer_never_interrupts_delivery() {
        let messages = vec![tagged("assistant", 1), tagged("assistant", 2), tagged("result", 3)];
        let stub = StubSession::new(messages.iter().cloned().map(Ok).collect());
        let observer = Arc::new(FailingObserver {
            calls: AtomicUsize::new(0),
        });
        let mut session = ObservedSession::new(stub, Some(observer.clone()));

        let yielded: Vec<AgentMessage> = session
            .messages()
            .map(|item| item.expect("observer failures must not become stream errors"))
            .collect()
            .await;

        assert_eq!(yielded, messages, "items must arrive unaltered and complete");
        assert_eq!(observer.calls.load(Ordering::SeqCst), messages.len());
    }

    #[tokio::test]
    async fn underlying_stream_errors_propagate_unchanged() {
        let failure = ClientError::transport("stub", "connection reset");
        let stub = StubSession::new(vec![Ok(tagged("assistant", 1)), Err(failure.clone())]);
        let observer = Arc::new(RecordingObserver {
            seen: Mutex::new(Vec::new()),
        });
        let mut session = ObservedSession::new(stub, Some(observer.clone()));

        let items: Vec<Result<AgentMessage, ClientError>> = session.messages().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(items[1], Err(failure));
        // Only the Ok item was shown to the observer.
        assert_eq!(observer.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn early_drop_stops_consumption_without_draining() {
        let messages = vec![tagged("assistant", 1), tagged("assistant", 2), tagged("result", 3)];
        let stub = StubSession::new(messages.iter().cloned().map(Ok).collect());
        let observer = Arc::new(RecordingObserver {
            seen: Mutex::new(Vec::new()),
        });
        let mut session = ObservedSession::new(stub, Some(observer.clone()));

        {
            let mut stream = session.messages();
            let first = stream.next().await.expect("first item").expect("ok");
            assert_eq!(first, messages[0]);
            // Consumer walks away here; the stream is dropped with items left.
        }

        assert_eq!(observer.seen.lock().unwrap().len(), 1);
    }
}
