//! Article framing helpers.
//!
//! [Splitter] tears an RFC-822 style message into header and body;
//! [Chopper] strips the boundary newline the body stream starts with.

use std::io::{Result, Write};

/// A writer that splits a message into Head and Body.
///
/// The boundary is the first `\n\n` or `\n\r`, found by sliding each byte
/// through a 16-bit shift register. The algorithm assumes every `\r` is
/// followed by an `\n`.
///
/// Note that the body starts with a newline (`"\n"` or `"\r\n"`)!
pub struct Splitter<H: Write, B: Write> {
    /// Receives the header block.
    pub head: H,

    /// Receives the body, beginning with the boundary newline.
    pub body: B,

    shift: u8,
    to_body: bool,
}

impl<H: Write, B: Write> Splitter<H, B> {
    /// Construct a splitter over the two destination writers.
    pub fn new(head: H, body: B) -> Self {
        Self {
            head,
            body,
            shift: 0,
            to_body: false,
        }
    }
}

impl<H: Write, B: Write> Write for Splitter<H, B> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.to_body {
            return self.body.write(buf);
        }
        let mut shift = self.shift as u16;
        for (i, &b) in buf.iter().enumerate() {
            shift = (shift << 8) | b as u16;
            match shift {
                0x0a0a | 0x0a0d => {
                    self.to_body = true;
                    self.head.write_all(&buf[..i])?;
                    self.body.write_all(&buf[i..])?;
                    return Ok(buf.len());
                }
                _ => {}
            }
        }
        self.shift = (shift & 0xff) as u8;
        self.head.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.head.flush()?;
        self.body.flush()
    }
}

/// A writer that chops off the first leading `"\r\n"` or `"\n"`.
pub struct Chopper<W: Write> {
    /// Receives everything after the chopped newline.
    pub rest: W,

    consumed: bool,
}

impl<W: Write> Chopper<W> {
    /// Construct a chopper over the destination writer.
    pub fn new(rest: W) -> Self {
        Self {
            rest,
            consumed: false,
        }
    }
}

impl<W: Write> Write for Chopper<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.consumed {
            return self.rest.write(buf);
        }
        let mut m = buf.len();
        for (i, &b) in buf.iter().enumerate() {
            if b == b'\r' {
                continue;
            }
            m = i;
            if b == b'\n' {
                m += 1;
            }
            self.consumed = true;
            break;
        }
        self.rest.write_all(&buf[m..])?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.rest.flush()
    }
}

/// The body proper: `body` with its leading `\r`s and one `\n` dropped.
pub fn chopped(body: &[u8]) -> &[u8] {
    let mut i = 0;
    while i < body.len() && body[i] == b'\r' {
        i += 1;
    }
    if i < body.len() && body[i] == b'\n' {
        i += 1;
    }
    &body[i..]
}

/// Count the newline-terminated lines of a body.
pub fn count_lines(body: &[u8]) -> i64 {
    body.iter().filter(|&&b| b == b'\n').count() as i64
}
