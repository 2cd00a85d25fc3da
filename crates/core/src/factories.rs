//! Factories for generating instances of newsspool modules.

use newsspool_api::*;

mod mem_overview_store;
pub use mem_overview_store::*;

mod ldb_overview_store;
pub use ldb_overview_store::*;

mod mem_history_store;
pub use mem_history_store::*;

mod ldb_history_store;
pub use ldb_history_store::*;

mod mem_reverse_index;
pub use mem_reverse_index::*;

mod ldb_reverse_index;
pub use ldb_reverse_index::*;

mod timehash_store;
pub use timehash_store::*;

mod mem_article_store;
pub use mem_article_store::*;

mod trad_catalog;
pub use trad_catalog::*;

/// Map an underlying store failure into the io error class.
pub(crate) fn store_err<E: std::error::Error + Send + Sync + 'static>(
    e: E,
) -> NsError {
    NsError::Io(DynInnerError::new(e))
}

/// An overview cursor over a snapshot of raw (key, record) pairs.
///
/// Decoding happens per step; records that fail to decode are skipped,
/// which keeps a range scan alive across isolated corruption.
pub(crate) struct SnapshotOvCursor {
    items: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
}

impl SnapshotOvCursor {
    pub(crate) fn new(items: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl OverviewCursor for SnapshotOvCursor {
    fn next(
        &mut self,
    ) -> BoxFut<'_, NsResult<Option<(Token, OverviewElement)>>> {
        Box::pin(async move {
            for (key, rec) in self.items.by_ref() {
                let Ok((tk, mut ove)) = crate::codec::explode_record(&rec)
                else {
                    continue;
                };
                ove.num = crate::codec::rec_id_to_num(&key);
                return Ok(Some((tk, ove)));
            }
            Ok(None)
        })
    }
}

/// A reverse-index cursor over a snapshot of (group, num) pairs.
pub(crate) struct SnapshotRiCursor {
    items: std::vec::IntoIter<RiElement>,
}

impl SnapshotRiCursor {
    pub(crate) fn new(items: Vec<RiElement>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl RiCursor for SnapshotRiCursor {
    fn next(&mut self) -> BoxFut<'_, NsResult<Option<RiElement>>> {
        Box::pin(async move { Ok(self.items.next()) })
    }
}

/// The expiry-walk state machine over a snapshot of expired articles.
///
/// For each (msgid, record blob) pair this emits every group line of the
/// blob, then the article terminator; an article with a missing or empty
/// blob still gets its terminator, so a later scan can finish a
/// partially torn-down article.
pub(crate) struct SnapshotRiExpiryCursor {
    items: std::vec::IntoIter<(MessageId, Option<Vec<u8>>)>,
    queue: std::collections::VecDeque<RiElement>,
    pending: Option<MessageId>,
}

impl SnapshotRiExpiryCursor {
    pub(crate) fn new(items: Vec<(MessageId, Option<Vec<u8>>)>) -> Self {
        Self {
            items: items.into_iter(),
            queue: Default::default(),
            pending: None,
        }
    }
}

impl RiExpiryCursor for SnapshotRiExpiryCursor {
    fn next(&mut self) -> BoxFut<'_, NsResult<Option<RiHistory>>> {
        Box::pin(async move {
            loop {
                if let Some(rie) = self.queue.pop_front() {
                    return Ok(Some(RiHistory::Group {
                        group: rie.group,
                        num: rie.num,
                    }));
                }
                if let Some(message_id) = self.pending.take() {
                    return Ok(Some(RiHistory::Article { message_id }));
                }
                let Some((message_id, blob)) = self.items.next() else {
                    return Ok(None);
                };
                if let Some(blob) = blob {
                    self.queue.extend(crate::codec::mdb_lines(&blob));
                }
                self.pending = Some(message_id);
            }
        })
    }
}
