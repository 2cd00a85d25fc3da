//! Article metadata types shared by the stores.

use crate::{GroupName, MessageId, Timestamp};
use bytes::Bytes;

/// Metadata established at post-time and passed by value to every store
/// writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleMd {
    /// When the article arrived.
    pub arrival: Timestamp,

    /// When the article should expire, if ever.
    pub expires: Option<Timestamp>,
}

impl ArticleMd {
    /// Metadata for an article arriving now, with no expiry.
    pub fn arriving_now() -> Self {
        Self {
            arrival: Timestamp::now(),
            expires: None,
        }
    }
}

/// One overview line: the per-group metadata of one article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverviewElement {
    /// The article number within the group.
    pub num: i64,

    /// The Subject header.
    pub subject: Bytes,

    /// The From header.
    pub from: Bytes,

    /// The Date header.
    pub date: Bytes,

    /// The Message-ID header.
    pub msg_id: Bytes,

    /// The References header.
    pub refs: Bytes,

    /// The size of the article in bytes.
    pub size: i64,

    /// The number of body lines.
    pub lines: i64,
}

/// The per-group watermarks stored under the group sentinel key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStat {
    /// Non-decreasing counter of issued article numbers.
    pub count: i64,

    /// Low watermark. At most the smallest live article number.
    pub low: i64,

    /// High watermark. At least the largest live article number.
    pub high: i64,
}

/// One (group, number) pair an article is filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiElement {
    /// The newsgroup.
    pub group: GroupName,

    /// The article number within that group.
    pub num: i64,
}

/// One step of the reverse-index expiry walk.
///
/// The expiry cursor emits every [RiHistory::Group] for an article
/// strictly before its single [RiHistory::Article] terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiHistory {
    /// Expire one (group, number) filing of the article.
    Group {
        /// The newsgroup.
        group: GroupName,
        /// The article number within that group.
        num: i64,
    },

    /// Expire the article itself.
    Article {
        /// The article's message-id.
        message_id: MessageId,
    },
}

/// One group as listed by the group catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupElement {
    /// The newsgroup.
    pub group: GroupName,

    /// The posting-status character, e.g. b'y' or b'm'.
    pub status: u8,

    /// The one-line description, when listing descriptions.
    pub description: Bytes,
}
