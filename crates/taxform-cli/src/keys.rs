//! Key presses from the terminal, read by a single background thread.
//!
//! Every prompt in a process goes through the same [`KeyReader`], so a read
//! that one prompt gave up on is handed to the next prompt instead of
//! racing a second reader for the same key.

use console::{Key, Term};
use std::io;
use std::sync::mpsc as std_mpsc;
use tokio::sync::mpsc;

pub struct KeyReader {
    channel: Option<(std_mpsc::Sender<()>, mpsc::UnboundedReceiver<io::Result<Key>>)>,
    /// A read was requested and its key has not been taken yet
    pending: bool,
}

impl KeyReader {
    /// Reader on stdout's terminal; never yields a key when stdout is not a TTY
    pub fn terminal() -> Self {
        let term = Term::stdout();
        if !term.is_term() {
            return Self::detached();
        }
        Self::spawn(move || term.read_key())
    }

    /// Reader that never yields a key
    pub fn detached() -> Self {
        Self {
            channel: None,
            pending: false,
        }
    }

    /// Start the reader thread. `read` blocks until one key is pressed and is
    /// only called when a key has been asked for.
    pub fn spawn<F>(mut read: F) -> Self
    where
        F: FnMut() -> io::Result<Key> + Send + 'static,
    {
        let (request_tx, request_rx) = std_mpsc::channel::<()>();
        let (key_tx, key_rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            for () in request_rx {
                if key_tx.send(read()).is_err() {
                    break;
                }
            }
        });

        Self {
            channel: Some((request_tx, key_rx)),
            pending: false,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.channel.is_some()
    }

    /// Wait for the next key press.
    ///
    /// Cancel-safe: when the returned future is dropped, the read it started
    /// stays pending and its key goes to the next call.
    pub async fn next_key(&mut self) -> io::Result<Key> {
        let Some((requests, keys)) = &mut self.channel else {
            return std::future::pending().await;
        };

        if !self.pending {
            requests.send(()).map_err(|_| reader_stopped())?;
            self.pending = true;
        }
        let key = keys.recv().await;
        self.pending = false;
        key.unwrap_or_else(|| Err(reader_stopped()))
    }
}

fn reader_stopped() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "key reader stopped")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn scripted() -> (KeyReader, std_mpsc::Sender<Key>, Arc<AtomicUsize>) {
        let (press_tx, press_rx) = std_mpsc::channel::<Key>();
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = reads.clone();
        let reader = KeyReader::spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            press_rx
                .recv()
                .map_err(|e| io::Error::new(io::ErrorKind::UnexpectedEof, e))
        });
        (reader, press_tx, reads)
    }

    #[tokio::test]
    async fn test_abandoned_read_goes_to_next_prompt() {
        let (mut keys, press, reads) = scripted();

        // First prompt gives up before anything is pressed
        let first = tokio::time::timeout(Duration::from_millis(50), keys.next_key()).await;
        assert!(first.is_err());

        press.send(Key::Enter).unwrap();
        let key = keys.next_key().await.unwrap();

        assert_eq!(key, Key::Enter);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_keys_are_read_only_on_request() {
        let (mut keys, press, reads) = scripted();

        press.send(Key::Char('a')).unwrap();
        press.send(Key::Char('b')).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(reads.load(Ordering::SeqCst), 0);

        assert_eq!(keys.next_key().await.unwrap(), Key::Char('a'));
        assert_eq!(keys.next_key().await.unwrap(), Key::Char('b'));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_detached_reader_never_yields() {
        let mut keys = KeyReader::detached();

        assert!(!keys.is_interactive());
        let key = tokio::time::timeout(Duration::from_millis(50), keys.next_key()).await;
        assert!(key.is_err());
    }

    #[tokio::test]
    async fn test_read_error_is_reported() {
        let (mut keys, press, _) = scripted();
        drop(press);

        let err = keys.next_key().await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
