//! The payload byte container and its stream views.
//!
//! [`PayloadBuffer`] owns the primary byte content of a message. Streaming
//! access goes through [`PayloadReader`] (a finite read view over the
//! current bytes) and [`PayloadWriter`] (a staging buffer that swaps into
//! the message's payload slot atomically on close, so partial writes are
//! never observable).

use super::ContentEncoding;
use super::ids::MessageId;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Cursor, Read, Write};

/// A mutable byte container holding a message's primary content.
///
/// An empty payload is valid; the buffer itself is always present.
///
/// # Examples
///
/// ```
/// use dunnage::message::domain::{ContentEncoding, PayloadBuffer};
///
/// let payload = PayloadBuffer::from_bytes(b"hello".to_vec());
/// assert_eq!(payload.decode(ContentEncoding::Utf8), "hello");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadBuffer {
    bytes: Vec<u8>,
}

impl PayloadBuffer {
    /// Creates an empty payload.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Creates a payload from owned bytes.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the buffer, returning the owned bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Replaces the payload bytes.
    pub fn set_bytes(&mut self, bytes: Vec<u8>) {
        self.bytes = bytes;
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Discards the payload bytes.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Returns a finite read view over the current bytes.
    ///
    /// Each call returns a fresh view positioned at the start, so reads
    /// are restartable by re-acquisition.
    #[must_use]
    pub fn reader(&self) -> PayloadReader<'_> {
        PayloadReader {
            cursor: Cursor::new(&self.bytes),
        }
    }

    /// Decodes the payload bytes as text under the given encoding.
    #[must_use]
    pub fn decode(&self, encoding: ContentEncoding) -> String {
        encoding.decode(&self.bytes)
    }
}

impl From<Vec<u8>> for PayloadBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&[u8]> for PayloadBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes.to_vec())
    }
}

/// A finite, read-only stream view over a message payload.
///
/// Obtained from [`PayloadBuffer::reader`] or
/// [`Message::open_input_stream`](super::Message::open_input_stream).
#[derive(Debug)]
pub struct PayloadReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl Read for PayloadReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl BufRead for PayloadReader<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.cursor.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.cursor.consume(amt);
    }
}

/// A staging output stream over a message payload.
///
/// Writes accumulate in a private buffer and only become the message's
/// payload when [`PayloadWriter::close`](Self::close) commits them; until
/// then the previous payload remains observable. Dropping the writer
/// without closing discards the staged bytes and leaves the message's
/// output-stream guard held (a leak, not a correctness hazard); the guard
/// can be recovered with
/// [`Message::release_output_stream`](super::Message::release_output_stream).
#[derive(Debug)]
pub struct PayloadWriter {
    staging: Vec<u8>,
    owner: MessageId,
}

impl PayloadWriter {
    pub(crate) const fn open(owner: MessageId) -> Self {
        Self {
            staging: Vec::new(),
            owner,
        }
    }

    /// Returns the identifier of the message this writer was opened on.
    #[must_use]
    pub const fn owner(&self) -> MessageId {
        self.owner
    }

    /// Returns the number of bytes staged so far.
    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.staging.len()
    }

    /// Closes the stream, atomically replacing the message's payload with
    /// the staged bytes and releasing the output-stream guard.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidArgument`] if `message` is not the
    /// message this writer was opened on, or if the guard was already
    /// released.
    ///
    /// [`MessageError::InvalidArgument`]: crate::message::error::MessageError::InvalidArgument
    pub fn close(
        self,
        message: &mut super::Message,
    ) -> Result<(), crate::message::error::MessageError> {
        message.complete_output_stream(self.owner, Some(self.staging))
    }

    /// Closes the stream without committing, discarding the staged bytes
    /// and releasing the output-stream guard. The previous payload is
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidArgument`] under the same conditions
    /// as [`close`](Self::close).
    ///
    /// [`MessageError::InvalidArgument`]: crate::message::error::MessageError::InvalidArgument
    pub fn abort(
        self,
        message: &mut super::Message,
    ) -> Result<(), crate::message::error::MessageError> {
        message.complete_output_stream(self.owner, None)
    }
}

impl Write for PayloadWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.staging.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
