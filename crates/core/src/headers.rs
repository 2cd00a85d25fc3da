//! Header parsing and stamping for the posting pipeline.
//!
//! The parser is fold-aware and case-insensitive. Stamping optionally
//! rewrites the header block on its way into the spool: a Message-ID is
//! injected when the article has none, and a Path segment is prepended.

use newsspool_api::{NsError, NsResult};
use bytes::Bytes;
use std::sync::Arc;

/// A pluggable header rewriter.
pub trait Stamper: 'static + Send + Sync + std::fmt::Debug {
    /// A Message-ID to inject when neither the article nor the client
    /// supplied one.
    fn message_id(&self) -> Option<Bytes>;

    /// A Path segment to prepend to the Path header.
    fn path_segment(&self) -> Option<Bytes>;
}

/// Trait-object version of [Stamper].
pub type DynStamper = Arc<dyn Stamper>;

/// A stamper that never rewrites anything.
#[derive(Debug, Default)]
pub struct NoopStamper;

impl Stamper for NoopStamper {
    fn message_id(&self) -> Option<Bytes> {
        None
    }

    fn path_segment(&self) -> Option<Bytes> {
        None
    }
}

/// The parsed, possibly rewritten header block of one article.
#[derive(Debug, Clone, Default)]
pub struct HeaderInfo {
    /// The Subject header.
    pub subject: Bytes,

    /// The From header.
    pub from: Bytes,

    /// The Date header.
    pub date: Bytes,

    /// The canonical Message-ID, after stamping.
    pub message_id: Bytes,

    /// The Newsgroups header.
    pub newsgroups: Bytes,

    /// The References header.
    pub references: Bytes,

    /// The rewritten header block as it goes into the spool. Ends with
    /// the final header line's newline; the body boundary is not part of
    /// it.
    pub raw: Bytes,
}

struct RawHeader {
    name_lower: Vec<u8>,
    value: Vec<u8>,
    raw: Vec<u8>,
}

fn trim(v: &[u8]) -> &[u8] {
    let mut s = 0;
    let mut e = v.len();
    while s < e && (v[s] == b' ' || v[s] == b'\t') {
        s += 1;
    }
    while e > s && matches!(v[e - 1], b' ' | b'\t' | b'\r' | b'\n') {
        e -= 1;
    }
    &v[s..e]
}

fn parse_block(head: &[u8]) -> NsResult<Vec<RawHeader>> {
    let mut out: Vec<RawHeader> = Vec::new();
    let mut rest = head;
    while !rest.is_empty() {
        let (line, tail) = match rest.iter().position(|&b| b == b'\n') {
            Some(i) => (&rest[..i + 1], &rest[i + 1..]),
            None => (rest, &[][..]),
        };
        rest = tail;
        if line == b"\n" || line == b"\r\n" {
            continue;
        }
        if line[0] == b' ' || line[0] == b'\t' {
            // folded continuation of the previous header
            let Some(prev) = out.last_mut() else {
                return Err(NsError::other("header starts with a fold"));
            };
            prev.value.push(b' ');
            prev.value.extend_from_slice(trim(line));
            prev.raw.extend_from_slice(line);
            continue;
        }
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            return Err(NsError::other("header line without a colon"));
        };
        if colon == 0 {
            return Err(NsError::other("header line without a name"));
        }
        out.push(RawHeader {
            name_lower: line[..colon].to_ascii_lowercase(),
            value: trim(&line[colon + 1..]).to_vec(),
            raw: line.to_vec(),
        });
    }
    Ok(out)
}

fn line_ending(head: &[u8]) -> &'static [u8] {
    if head.windows(2).any(|w| w == b"\r\n") {
        b"\r\n"
    } else {
        b"\n"
    }
}

/// Parse a header block and apply stamping.
///
/// `suggested_id` is the client-suggested message-id and may be empty.
/// The produced [HeaderInfo::message_id] is empty only when the article,
/// the client, and the stamper all failed to supply one; the caller
/// rejects that case.
pub fn parse_and_process(
    suggested_id: &[u8],
    stamper: &dyn Stamper,
    head: &[u8],
) -> NsResult<HeaderInfo> {
    let headers = parse_block(head)?;
    let eol = line_ending(head);

    let find = |name: &[u8]| {
        headers
            .iter()
            .find(|h| h.name_lower == name)
            .map(|h| Bytes::copy_from_slice(&h.value))
            .unwrap_or_default()
    };

    let mut message_id = find(b"message-id");
    let mut injected_id = None;
    if message_id.is_empty() {
        let inject = if suggested_id.is_empty() {
            stamper.message_id()
        } else {
            Some(Bytes::copy_from_slice(suggested_id))
        };
        if let Some(id) = inject {
            message_id = id.clone();
            injected_id = Some(id);
        }
    }

    let path_segment = stamper.path_segment();
    let mut raw = Vec::with_capacity(head.len() + 64);
    let mut had_path = false;
    for h in &headers {
        if h.name_lower == b"path" {
            had_path = true;
            if let Some(seg) = &path_segment {
                raw.extend_from_slice(b"Path: ");
                raw.extend_from_slice(seg);
                raw.push(b'!');
                raw.extend_from_slice(&h.value);
                raw.extend_from_slice(eol);
                continue;
            }
        }
        raw.extend_from_slice(&h.raw);
    }
    if let Some(seg) = &path_segment {
        if !had_path {
            raw.extend_from_slice(b"Path: ");
            raw.extend_from_slice(seg);
            raw.extend_from_slice(eol);
        }
    }
    if let Some(id) = &injected_id {
        raw.extend_from_slice(b"Message-ID: ");
        raw.extend_from_slice(id);
        raw.extend_from_slice(eol);
    }

    Ok(HeaderInfo {
        subject: find(b"subject"),
        from: find(b"from"),
        date: find(b"date"),
        message_id,
        newsgroups: find(b"newsgroups"),
        references: find(b"references"),
        raw: raw.into(),
    })
}

/// Split a Newsgroups header into group names.
pub fn split_newsgroups(
    newsgroups: &[u8],
) -> Vec<newsspool_api::GroupName> {
    newsgroups
        .split(|&b| b == b',')
        .map(trim)
        .filter(|g| !g.is_empty())
        .map(|g| Bytes::copy_from_slice(g).into())
        .collect()
}
