use parking_lot::Mutex;

use super::{EngineTransport, LineHandler, TransportError, TransportEvent};

/// Produces the engine's answer lines for one client line.
pub type Responder = Box<dyn FnMut(&str) -> Vec<String> + Send>;

#[derive(Default)]
struct MemoryInner {
    handler: Option<LineHandler>,
    sent: Vec<String>,
    responder: Option<Responder>,
    fail_posts: bool,
    opened: usize,
}

/// In-process transport.
///
/// Records every line the client writes. Inbound lines come from `emit`, or
/// from an optional responder that answers each outbound line synchronously.
#[derive(Default)]
pub struct MemoryTransport {
    inner: Mutex<MemoryInner>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that answers each outbound line with `responder(line)`.
    #[must_use]
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: FnMut(&str) -> Vec<String> + Send + 'static,
    {
        let transport = Self::new();
        transport.inner.lock().responder = Some(Box::new(responder));
        transport
    }

    /// Every line written so far, oldest first.
    #[must_use]
    pub fn sent_lines(&self) -> Vec<String> {
        self.inner.lock().sent.clone()
    }

    /// Number of times `open` has been called.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.inner.lock().opened
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.lock().handler.is_some()
    }

    /// Make subsequent `post_line` calls fail.
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().fail_posts = failing;
    }

    /// Deliver one engine line to the client. Returns false if nothing is listening.
    pub fn emit(&self, line: &str) -> bool {
        self.deliver(TransportEvent::Line(line.to_string()))
    }

    /// Simulate the engine going away.
    pub fn disconnect(&self, reason: &str) -> bool {
        let delivered = self.deliver(TransportEvent::Closed {
            reason: reason.to_string(),
        });
        self.inner.lock().handler = None;
        delivered
    }

    fn deliver(&self, event: TransportEvent) -> bool {
        // The handler runs without our lock held so it may post lines back.
        let handler = self.inner.lock().handler.clone();
        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

impl EngineTransport for MemoryTransport {
    fn open(&self, handler: LineHandler) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        inner.handler = Some(handler);
        inner.opened += 1;
        Ok(())
    }

    fn post_line(&self, line: &str) -> Result<(), TransportError> {
        let replies = {
            let mut inner = self.inner.lock();
            if inner.handler.is_none() {
                return Err(TransportError::NotOpen);
            }
            if inner.fail_posts {
                return Err(TransportError::Io {
                    reason: "write rejected".to_string(),
                });
            }
            inner.sent.push(line.to_string());
            match inner.responder.as_mut() {
                Some(responder) => responder(line),
                None => Vec::new(),
            }
        };

        for reply in replies {
            self.emit(&reply);
        }
        Ok(())
    }

    fn close(&self) {
        self.inner.lock().handler = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_post_before_open_fails() {
        let transport = MemoryTransport::new();
        assert_eq!(transport.post_line("uci"), Err(TransportError::NotOpen));
        assert!(!transport.emit("uciok"));
    }

    #[test]
    fn test_responder_replies_are_delivered_in_order() {
        let transport = MemoryTransport::with_responder(|line| {
            if line == "uci" {
                vec!["id name fake".to_string(), "uciok".to_string()]
            } else {
                Vec::new()
            }
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        transport
            .open(Arc::new(move |event| sink.lock().push(event)))
            .unwrap();

        transport.post_line("uci").unwrap();
        transport.post_line("ucinewgame").unwrap();

        assert_eq!(transport.sent_lines(), vec!["uci", "ucinewgame"]);
        assert_eq!(
            *seen.lock(),
            vec![
                TransportEvent::Line("id name fake".to_string()),
                TransportEvent::Line("uciok".to_string()),
            ]
        );
    }

    #[test]
    fn test_disconnect_closes() {
        let transport = MemoryTransport::new();
        transport.open(Arc::new(|_| {})).unwrap();
        assert!(transport.disconnect("gone"));
        assert!(!transport.is_open());
        assert_eq!(transport.post_line("stop"), Err(TransportError::NotOpen));
    }
}
