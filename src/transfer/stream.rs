//! Bridges async socket reads to the blocking upload writer.
//!
//! The session task pushes chunks into a bounded channel; the upload runs on
//! the blocking pool and pulls them through [`ChannelReader`]. At most
//! `capacity` chunks are buffered at any time.

use std::io::{self, Read};
use tokio::sync::mpsc;

pub type ChunkSender = mpsc::Sender<io::Result<Vec<u8>>>;

/// `std::io::Read` over a channel of byte chunks. Must only be read from a
/// blocking context.
pub struct ChannelReader {
    rx: mpsc::Receiver<io::Result<Vec<u8>>>,
    current: Vec<u8>,
    pos: usize,
}

/// Creates a bounded chunk channel.
pub fn chunk_channel(capacity: usize) -> (ChunkSender, ChannelReader) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let reader = ChannelReader {
        rx,
        current: Vec::new(),
        pos: 0,
    };
    (tx, reader)
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.current.len() {
            match self.rx.blocking_recv() {
                Some(Ok(chunk)) => {
                    self.current = chunk;
                    self.pos = 0;
                }
                Some(Err(e)) => return Err(e),
                // Sender dropped: end of stream
                None => return Ok(0),
            }
        }

        let available = &self.current[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn reassembles_chunks_in_order() {
        let (tx, mut reader) = chunk_channel(2);

        let producer = thread::spawn(move || {
            for chunk in [b"hel".to_vec(), Vec::new(), b"lo ".to_vec(), b"world".to_vec()] {
                tx.blocking_send(Ok(chunk)).unwrap();
            }
        });

        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        producer.join().unwrap();

        assert_eq!(out, "hello world");
    }

    #[test]
    fn propagates_sender_errors() {
        let (tx, mut reader) = chunk_channel(1);

        thread::spawn(move || {
            tx.blocking_send(Ok(b"ab".to_vec())).unwrap();
            tx.blocking_send(Err(io::Error::new(io::ErrorKind::UnexpectedEof, "short")))
                .unwrap();
        });

        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
