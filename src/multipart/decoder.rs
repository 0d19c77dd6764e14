//! Streaming `multipart/form-data` decoder.
//!
//! # Design Decisions
//! - Works on a byte buffer; payloads are never decoded as text
//! - A delimiter is `CRLF--boundary` and only counts when followed by `--`
//!   or optional whitespace and CRLF; any other occurrence is payload data
//! - The body start is treated as a line start by seeding the buffer with CRLF
//! - Pull based: payload bytes are handed out as soon as they cannot be part
//!   of a delimiter, so memory stays around one transport chunk
//!
//! ```text
//! Preamble ──delimiter──▶ Headers ──blank line──▶ Body ──delimiter──▶ Headers ...
//!                                                   └──close delimiter──▶ Done
//! ```

use bytes::{Buf, Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use memchr::memmem;

use crate::error::ShareError;
use crate::multipart::headers::PartHeaders;

/// Upper bound on a single part's header block.
const MAX_HEADER_BLOCK: usize = 16 * 1024;

/// Upper bound on whitespace allowed between a boundary and its CRLF.
const MAX_DELIMITER_PADDING: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Preamble,
    Headers,
    Body,
    Done,
}

enum Scan {
    /// A delimiter starts at `at`; the following section starts at `next`.
    Delimiter { at: usize, next: usize, last: bool },
    /// No complete delimiter yet; bytes before `safe` can never be part of one.
    Pending { safe: usize },
}

enum Tail {
    Close,
    Line(usize),
    Incomplete,
    Invalid,
}

/// Pull-based decoder over a body stream.
///
/// Call [`next_part`](Self::next_part) to advance to the next part, then
/// [`read_chunk`](Self::read_chunk) or [`payload`](Self::payload) to pull its
/// bytes. Unread payload is skipped by the next `next_part` call.
pub struct MultipartDecoder<S> {
    body: S,
    buf: BytesMut,
    delimiter: memmem::Finder<'static>,
    state: State,
    eof: bool,
}

impl<S, E> MultipartDecoder<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    pub fn new(body: S, boundary: &str) -> Self {
        let mut delimiter = Vec::with_capacity(boundary.len() + 4);
        delimiter.extend_from_slice(b"\r\n--");
        delimiter.extend_from_slice(boundary.as_bytes());

        let mut buf = BytesMut::with_capacity(8 * 1024);
        buf.extend_from_slice(b"\r\n");

        Self {
            body,
            buf,
            delimiter: memmem::Finder::new(&delimiter).into_owned(),
            state: State::Preamble,
            eof: false,
        }
    }

    /// Advance to the next part and return its headers, or `None` after the
    /// close delimiter.
    pub async fn next_part(&mut self) -> Result<Option<PartHeaders>, ShareError> {
        loop {
            match self.state {
                State::Preamble => self.skip_preamble().await?,
                State::Body => while self.read_chunk().await?.is_some() {},
                State::Headers => return self.read_headers().await.map(Some),
                State::Done => return Ok(None),
            }
        }
    }

    /// Next chunk of the current part's payload, or `None` at its end.
    pub async fn read_chunk(&mut self) -> Result<Option<Bytes>, ShareError> {
        loop {
            if self.state != State::Body {
                return Ok(None);
            }

            match self.scan() {
                Scan::Delimiter { at, next, last } => {
                    if at > 0 {
                        return Ok(Some(self.buf.split_to(at).freeze()));
                    }
                    self.buf.advance(next);
                    self.state = if last { State::Done } else { State::Headers };
                    return Ok(None);
                }
                Scan::Pending { safe } => {
                    if safe > 0 {
                        return Ok(Some(self.buf.split_to(safe).freeze()));
                    }
                    if !self.fill().await? {
                        return Err(ShareError::malformed("body ended before the closing boundary"));
                    }
                }
            }
        }
    }

    /// The current part's payload as a stream of chunks.
    pub fn payload(&mut self) -> impl Stream<Item = Result<Bytes, ShareError>> + '_ {
        futures_util::stream::try_unfold(self, |decoder| async move {
            let chunk = decoder.read_chunk().await?;
            Ok::<_, ShareError>(chunk.map(|chunk| (chunk, decoder)))
        })
    }

    async fn skip_preamble(&mut self) -> Result<(), ShareError> {
        loop {
            match self.scan() {
                Scan::Delimiter { next, last, .. } => {
                    self.buf.advance(next);
                    self.state = if last { State::Done } else { State::Headers };
                    return Ok(());
                }
                Scan::Pending { safe } => {
                    self.buf.advance(safe);
                    if !self.fill().await? {
                        return Err(ShareError::malformed("boundary delimiter not found in body"));
                    }
                }
            }
        }
    }

    /// The buffer starts at the CRLF ending the delimiter line.
    async fn read_headers(&mut self) -> Result<PartHeaders, ShareError> {
        loop {
            if let Some(end) = memmem::find(&self.buf, b"\r\n\r\n") {
                if end > MAX_HEADER_BLOCK {
                    return Err(ShareError::malformed("part headers too large"));
                }
                let block: &[u8] = if end >= 2 { &self.buf[2..end] } else { &[] };
                let headers = PartHeaders::parse(block)?;
                self.buf.advance(end + 4);
                self.state = State::Body;
                return Ok(headers);
            }

            if self.buf.len() > MAX_HEADER_BLOCK {
                return Err(ShareError::malformed("part headers too large"));
            }
            if !self.fill().await? {
                return Err(ShareError::malformed("body ended inside part headers"));
            }
        }
    }

    fn scan(&self) -> Scan {
        let delimiter_len = self.delimiter.needle().len();
        let mut from = 0;

        while let Some(offset) = self.delimiter.find(&self.buf[from..]) {
            let at = from + offset;
            let after = at + delimiter_len;
            match classify_tail(&self.buf[after..]) {
                Tail::Close => return Scan::Delimiter { at, next: after + 2, last: true },
                Tail::Line(padding) => {
                    return Scan::Delimiter { at, next: after + padding, last: false }
                }
                Tail::Incomplete => return Scan::Pending { safe: at },
                Tail::Invalid => from = at + 1,
            }
        }

        Scan::Pending {
            safe: self.buf.len().saturating_sub(delimiter_len - 1),
        }
    }

    /// Pull one more transport chunk. Returns false at end of body.
    async fn fill(&mut self) -> Result<bool, ShareError> {
        if self.eof {
            return Ok(false);
        }
        match self.body.next().await {
            Some(Ok(chunk)) => {
                self.buf.extend_from_slice(&chunk);
                Ok(true)
            }
            Some(Err(e)) => Err(ShareError::malformed(format!("request body interrupted: {e}"))),
            None => {
                self.eof = true;
                Ok(false)
            }
        }
    }
}

/// Classify the bytes following a `CRLF--boundary` match.
fn classify_tail(rest: &[u8]) -> Tail {
    if rest.len() < 2 {
        return Tail::Incomplete;
    }
    if rest.starts_with(b"--") {
        return Tail::Close;
    }

    let padding = rest
        .iter()
        .take_while(|b| **b == b' ' || **b == b'\t')
        .count();
    if padding > MAX_DELIMITER_PADDING {
        return Tail::Invalid;
    }

    match &rest[padding..] {
        [b'\r', b'\n', ..] => Tail::Line(padding),
        [] | [b'\r'] => Tail::Incomplete,
        _ => Tail::Invalid,
    }
}
