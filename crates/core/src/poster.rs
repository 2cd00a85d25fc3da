//! The posting coordinator.
//!
//! One accepted article is written across the storage manager, the
//! history store, the overview store (one entry per newsgroup), and the
//! reverse index, in the order that keeps the cross-index invariants: a
//! visible history entry always has its storage object, and a visible
//! overview entry has its reverse-index record committed in the same
//! logical write.

use crate::framing::{chopped, count_lines, Splitter};
use crate::headers::{self, DynStamper, NoopStamper};
use crate::storage_manager::StorageManager;
use newsspool_api::*;
use bytes::Bytes;
use std::io::Write;
use std::sync::Arc;


/// Why a post was refused. A refusal is policy, not failure; the
/// protocol front-end answers it with a permanent status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The article carries no message-id and none could be stamped on.
    NoMessageId,

    /// The Newsgroups header names no group.
    NoNewsgroups,

    /// An article with this message-id is already on file.
    Duplicate,
}

/// The outcome of a post that did not fail with an io error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// The article was stored and indexed.
    Accepted {
        /// The canonical message-id it was filed under.
        message_id: MessageId,

        /// The storage token it is addressable by.
        token: Token,
    },

    /// The article was refused by policy.
    Rejected(RejectReason),
}

/// The posting coordinator.
#[derive(Debug)]
pub struct Poster {
    stamper: DynStamper,
    storage: Arc<StorageManager>,
    overview: DynOverviewStore,
    history: DynHistoryStore,
    reverse_index: DynReverseIndex,
    default_expiry: Option<std::time::Duration>,
}

impl Poster {
    /// Construct a posting coordinator over the assembled stores.
    pub fn new(
        storage: Arc<StorageManager>,
        overview: DynOverviewStore,
        history: DynHistoryStore,
        reverse_index: DynReverseIndex,
        default_expiry: Option<std::time::Duration>,
    ) -> Self {
        Self {
            stamper: Arc::new(NoopStamper),
            storage,
            overview,
            history,
            reverse_index,
            default_expiry,
        }
    }

    /// Replace the header stamper.
    pub fn with_stamper(mut self, stamper: DynStamper) -> Self {
        self.stamper = stamper;
        self
    }

    fn article_md(&self) -> ArticleMd {
        let arrival = Timestamp::now();
        ArticleMd {
            arrival,
            expires: self.default_expiry.map(|d| arrival + d),
        }
    }

    /// Whether posting is possible at all.
    pub fn check_post(&self) -> bool {
        true
    }

    /// Whether an offered message-id is wanted.
    ///
    /// An id is unwanted once history knows it and the storage object
    /// behind the recorded token still exists.
    pub async fn check_post_id(&self, id: MessageId) -> (bool, bool) {
        let Ok(token) = self.history.his_lookup(id).await else {
            return (true, true);
        };
        match self.storage.retrieve(token, RetrieveLevel::Stat).await {
            Ok(_) => (false, true),
            Err(_) => (true, true),
        }
    }

    /// Accept one article: split, parse, stamp, store, index.
    ///
    /// `suggested_id` is the client-suggested message-id, possibly
    /// empty. A policy refusal comes back as
    /// [PostOutcome::Rejected]; an `Err` is a transient failure the
    /// front-end may ask the peer to retry.
    pub async fn perform_post(
        &self,
        suggested_id: &[u8],
        article: &[u8],
    ) -> NsResult<PostOutcome> {
        let mut head = Vec::new();
        let mut body = Vec::new();
        Splitter::new(&mut head, &mut body).write_all(article)?;

        let hi =
            headers::parse_and_process(suggested_id, &*self.stamper, &head)?;

        if hi.message_id.is_empty() {
            return Ok(PostOutcome::Rejected(RejectReason::NoMessageId));
        }
        let message_id = MessageId::from(hi.message_id.clone());

        let groups = headers::split_newsgroups(&hi.newsgroups);
        if groups.is_empty() {
            return Ok(PostOutcome::Rejected(RejectReason::NoNewsgroups));
        }

        // Between this check and the his_write below two concurrent
        // posts of the same id can both pass; the stores offer no
        // conditional put to close the window.
        if self.history.his_lookup(message_id.clone()).await.is_ok() {
            return Ok(PostOutcome::Rejected(RejectReason::Duplicate));
        }

        let size = (hi.raw.len() + body.len()) as i64;
        let class = self.storage.choose_class(&groups, size)?;

        let md = self.article_md();

        let mut data = Vec::with_capacity(hi.raw.len() + body.len());
        data.extend_from_slice(&hi.raw);
        data.extend_from_slice(&body);
        let token =
            self.storage.store(class, md, Bytes::from(data)).await?;

        self.history
            .his_write(message_id.clone(), md, token)
            .await?;

        let ove = OverviewElement {
            num: 0,
            subject: hi.subject,
            from: hi.from,
            date: hi.date,
            msg_id: hi.message_id,
            refs: hi.references,
            size,
            lines: count_lines(chopped(&body)),
        };

        let mut riw =
            self.reverse_index.ri_begin(message_id.clone()).await?;
        for (i, group) in groups.iter().enumerate() {
            let out = self
                .overview
                .group_write_ov(
                    group.clone(),
                    true,
                    md,
                    token,
                    ove.clone(),
                )
                .await?;
            let rie = RiElement {
                group: group.clone(),
                num: out.num,
            };
            if i == 0 {
                riw.ri_write(md, rie).await?;
            } else {
                riw.ri_write_more(md, rie).await?;
            }
        }
        riw.ri_commit().await?;

        Ok(PostOutcome::Accepted { message_id, token })
    }
}
