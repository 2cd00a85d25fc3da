//! Article fixtures.

use bytes::Bytes;
use newsspool_api::{ArticleMd, OverviewElement, Timestamp, Token};

/// Assemble an article from header pairs and a body, CRLF-framed.
pub fn article(headers: &[(&str, &str)], body: &str) -> Bytes {
    let mut out = Vec::new();
    for (name, value) in headers {
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body.as_bytes());
    out.into()
}

/// A minimal article posted to the given groups.
pub fn simple_article(msgid: &str, newsgroups: &str, body: &str) -> Bytes {
    article(
        &[
            ("Newsgroups", newsgroups),
            ("Message-ID", msgid),
            ("Subject", "test"),
            ("From", "poster@example.com"),
            ("Date", "Mon, 1 Jan 2024 00:00:00 GMT"),
        ],
        body,
    )
}

/// Article metadata with a fixed arrival and no expiry.
pub fn md_at(arrival_secs: i64) -> ArticleMd {
    ArticleMd {
        arrival: Timestamp::from_unix_secs(arrival_secs),
        expires: None,
    }
}

/// Article metadata with a fixed arrival and expiry.
pub fn md_expiring(arrival_secs: i64, expires_secs: i64) -> ArticleMd {
    ArticleMd {
        arrival: Timestamp::from_unix_secs(arrival_secs),
        expires: Some(Timestamp::from_unix_secs(expires_secs)),
    }
}

/// A token with a recognizable payload.
pub fn token(class: u8, fill: u8) -> Token {
    let mut t = Token::zeroed();
    t.set_class(class);
    for b in t.payload_mut() {
        *b = fill;
    }
    t
}

/// An overview element with recognizable fields.
pub fn ove(msgid: &str) -> OverviewElement {
    OverviewElement {
        num: 0,
        subject: Bytes::from_static(b"test subject"),
        from: Bytes::from_static(b"poster@example.com"),
        date: Bytes::from_static(b"Mon, 1 Jan 2024 00:00:00 GMT"),
        msg_id: Bytes::copy_from_slice(msgid.as_bytes()),
        refs: Bytes::new(),
        size: 512,
        lines: 4,
    }
}
