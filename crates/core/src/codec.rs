//! On-disk record formats shared by the overview and reverse-index
//! backends.
//!
//! Both the in-memory and the durable backends speak exactly these byte
//! formats, so a spool written by one is readable by the other.

use newsspool_api::*;
use bytes::Bytes;

/// FNV-1a 64-bit hash.
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x1_0000_0000_01b3);
    }
    h
}

// ---- overview keys ----
//
// Entries live at `group ++ 0x00 ++ u64_be(num)`; the group sentinel at
// `group ++ 0xFF`. The 0xFF sentinel sorts after every entry of its
// group, and the 0x00 separator keeps a group's entries from colliding
// with entries of any prefix extension of the group name.

/// The sentinel key of a group.
pub fn gstat_id(grp: &[u8]) -> Vec<u8> {
    let mut rid = Vec::with_capacity(grp.len() + 1);
    rid.extend_from_slice(grp);
    rid.push(0xff);
    rid
}

/// The entry key of (group, num).
pub fn rec_id(grp: &[u8], num: i64) -> Vec<u8> {
    let mut rid = Vec::with_capacity(grp.len() + 9);
    rid.extend_from_slice(grp);
    rid.push(0x00);
    rid.extend_from_slice(&(num as u64).to_be_bytes());
    rid
}

/// Increment a key as a big-endian integer, producing the exclusive
/// upper bound of an inclusive range end.
pub fn rec_id_incr(rid: &mut [u8]) {
    for b in rid.iter_mut().rev() {
        *b = b.wrapping_add(1);
        if *b != 0 {
            return;
        }
    }
}

/// Recover the article number from an entry key.
pub fn rec_id_to_num(rid: &[u8]) -> i64 {
    if rid.len() < 8 {
        return 0;
    }
    let mut b = [0u8; 8];
    b.copy_from_slice(&rid[rid.len() - 8..]);
    u64::from_be_bytes(b) as i64
}

/// True when two entry keys belong to the same group.
pub fn rec_id_prefix_eq(rid1: &[u8], rid2: &[u8]) -> bool {
    if rid1.len() != rid2.len() {
        return false;
    }
    let Some(l) = rid1.len().checked_sub(8) else {
        return false;
    };
    rid1[..l] == rid2[..l]
}

// ---- overview records ----

fn tsplit(p: &[u8]) -> (&[u8], &[u8]) {
    match p.iter().position(|&b| b == b'\t') {
        Some(i) => (&p[..i], &p[i + 1..]),
        None => (p, &[]),
    }
}

/// Assemble an overview record:
/// `token ++ subject ++ TAB ++ from ++ TAB ++ date ++ TAB ++ msg-id ++
/// TAB ++ refs ++ TAB ++ u64_be(size) ++ u64_be(lines)`.
pub fn join_record(tk: &Token, ove: &OverviewElement) -> Vec<u8> {
    let mut rec = Vec::with_capacity(1 << 10);
    rec.extend_from_slice(tk.as_bytes());
    rec.extend_from_slice(&ove.subject);
    rec.push(b'\t');
    rec.extend_from_slice(&ove.from);
    rec.push(b'\t');
    rec.extend_from_slice(&ove.date);
    rec.push(b'\t');
    rec.extend_from_slice(&ove.msg_id);
    rec.push(b'\t');
    rec.extend_from_slice(&ove.refs);
    rec.push(b'\t');
    rec.extend_from_slice(&(ove.size as u64).to_be_bytes());
    rec.extend_from_slice(&(ove.lines as u64).to_be_bytes());
    rec
}

/// Split an overview record back into token and element.
///
/// The article number is not part of the record; the caller sets it from
/// the entry key. Fails [NsError::RecordShort] on truncation.
pub fn explode_record(rec: &[u8]) -> NsResult<(Token, OverviewElement)> {
    if rec.len() < TOKEN_LEN {
        return Err(NsError::RecordShort);
    }
    let tk = Token::from_bytes(&rec[..TOKEN_LEN])?;
    let rec = &rec[TOKEN_LEN..];
    let (subject, rec) = tsplit(rec);
    let (from, rec) = tsplit(rec);
    let (date, rec) = tsplit(rec);
    let (msg_id, rec) = tsplit(rec);
    let (refs, rec) = tsplit(rec);
    if rec.len() < 16 {
        return Err(NsError::RecordShort);
    }
    let size = u64::from_be_bytes(rec[..8].try_into().unwrap()) as i64;
    let lines = u64::from_be_bytes(rec[8..16].try_into().unwrap()) as i64;
    Ok((
        tk,
        OverviewElement {
            num: 0,
            subject: Bytes::copy_from_slice(subject),
            from: Bytes::copy_from_slice(from),
            date: Bytes::copy_from_slice(date),
            msg_id: Bytes::copy_from_slice(msg_id),
            refs: Bytes::copy_from_slice(refs),
            size,
            lines,
        },
    ))
}

/// Assemble a group sentinel record: three u64_be.
pub fn join_gstat(gs: GroupStat) -> [u8; 24] {
    let mut rec = [0u8; 24];
    rec[..8].copy_from_slice(&(gs.count as u64).to_be_bytes());
    rec[8..16].copy_from_slice(&(gs.low as u64).to_be_bytes());
    rec[16..].copy_from_slice(&(gs.high as u64).to_be_bytes());
    rec
}

/// Split a group sentinel record.
pub fn explode_gstat(rec: &[u8]) -> NsResult<GroupStat> {
    if rec.len() < 24 {
        return Err(NsError::RecordShort);
    }
    Ok(GroupStat {
        count: u64::from_be_bytes(rec[..8].try_into().unwrap()) as i64,
        low: u64::from_be_bytes(rec[8..16].try_into().unwrap()) as i64,
        high: u64::from_be_bytes(rec[16..24].try_into().unwrap()) as i64,
    })
}

// ---- reverse-index expiry keys ----

/// Width of the textual time prefix of an expiry key.
pub const EXPIRY_TIME_LEN: usize = 20;

/// Full width of an expiry key.
pub const EXPIRY_KEY_LEN: usize = EXPIRY_TIME_LEN + 8;

/// The expiry-queue key of (expiry-time, msgid): zero-padded decimal
/// nanoseconds, then the FNV-1a hash of the msgid.
///
/// The fixed-width decimal prefix makes ascending lexicographic order
/// equal chronological order; the hash suffix disambiguates simultaneous
/// expirations.
pub fn expiry_key(expires: Timestamp, msgid: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(EXPIRY_KEY_LEN);
    key.extend_from_slice(
        format!("{:020}", expires.as_nanos().max(0)).as_bytes(),
    );
    key.extend_from_slice(&fnv1a_64(msgid).to_be_bytes());
    key
}

/// The exclusive upper bound of an expiry scan at `now`.
pub fn expiry_scan_end(now: Timestamp) -> Vec<u8> {
    let mut key = Vec::with_capacity(EXPIRY_KEY_LEN);
    key.extend_from_slice(format!("{:020}", now.as_nanos().max(0)).as_bytes());
    key.extend_from_slice(&[0xff; 8]);
    key
}

// ---- reverse-index record blobs ----

/// Append one `"<group> <num>\n"` line to a reverse-index record blob.
pub fn mdb_push_line(buf: &mut Vec<u8>, rie: &RiElement) {
    buf.extend_from_slice(&rie.group);
    buf.push(b' ');
    buf.extend_from_slice(rie.num.to_string().as_bytes());
    buf.push(b'\n');
}

/// Iterator over the (group, num) lines of a reverse-index record blob.
///
/// Malformed lines are skipped; a blank line ends the blob.
pub struct MdbLines<'a> {
    rest: &'a [u8],
}

/// Parse a reverse-index record blob.
pub fn mdb_lines(blob: &[u8]) -> MdbLines<'_> {
    MdbLines { rest: blob }
}

impl Iterator for MdbLines<'_> {
    type Item = RiElement;

    fn next(&mut self) -> Option<RiElement> {
        loop {
            if self.rest.is_empty() {
                return None;
            }
            let (line, rest) =
                match self.rest.iter().position(|&b| b == b'\n') {
                    Some(i) => (&self.rest[..i], &self.rest[i + 1..]),
                    None => (self.rest, &[][..]),
                };
            self.rest = rest;
            let mut fields =
                line.split(|&b| b == b' ' || b == b'\t').filter(|f| !f.is_empty());
            let Some(group) = fields.next() else {
                // blank line ends the blob
                self.rest = &[];
                return None;
            };
            let Some(num) = fields.next() else { continue };
            if fields.next().is_some() {
                continue;
            }
            let Ok(num) = std::str::from_utf8(num)
                .map_err(|_| ())
                .and_then(|s| s.parse::<i64>().map_err(|_| ()))
            else {
                continue;
            };
            return Some(RiElement {
                group: Bytes::copy_from_slice(group).into(),
                num,
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fnv_fixtures() {
        // standard FNV-1a 64 test vectors
        assert_eq!(0xcbf2_9ce4_8422_2325, fnv1a_64(b""));
        assert_eq!(0xaf63_dc4c_8601_ec8c, fnv1a_64(b"a"));
        assert_eq!(0x8594_4171_f739_67e8, fnv1a_64(b"foobar"));
    }

    #[test]
    fn sentinel_sorts_after_every_entry() {
        let grp = b"comp.test";
        let sentinel = gstat_id(grp);
        assert!(rec_id(grp, 0) < sentinel);
        assert!(rec_id(grp, i64::MAX) < sentinel);
        assert!(rec_id(grp, -1) < sentinel);
    }

    #[test]
    fn prefix_groups_do_not_collide() {
        // an entry of "comp.test" never sorts into the entry range of
        // "comp.tes", even at the widest possible scan
        let start = rec_id(b"comp.tes", 0);
        let mut end = rec_id(b"comp.tes", u64::MAX as i64);
        rec_id_incr(&mut end);
        let other = rec_id(b"comp.test", 1);
        assert!(other > end || other < start);
        assert!(!rec_id_prefix_eq(&start, &other));
    }

    #[test]
    fn rec_id_round_trip() {
        let rid = rec_id(b"alt.bin", 42);
        assert_eq!(42, rec_id_to_num(&rid));
        assert!(rec_id_prefix_eq(&rid, &rec_id(b"alt.bin", 7)));
    }

    #[test]
    fn rec_id_incr_carries() {
        let mut rid = vec![0x00, 0xff, 0xff];
        rec_id_incr(&mut rid);
        assert_eq!(vec![0x01, 0x00, 0x00], rid);
    }

    fn sample_ove() -> OverviewElement {
        OverviewElement {
            num: 0,
            subject: Bytes::from_static(b"hi"),
            from: Bytes::from_static(b"a@example.com"),
            date: Bytes::from_static(b"Mon, 1 Jan 2024 00:00:00 GMT"),
            msg_id: Bytes::from_static(b"<a@x>"),
            refs: Bytes::from_static(b"<z@x>"),
            size: 1234,
            lines: 9,
        }
    }

    #[test]
    fn record_round_trip() {
        let mut tk = Token::zeroed();
        tk.set_class(3);
        tk.payload_mut()[0] = 0x7f;
        let ove = sample_ove();
        let rec = join_record(&tk, &ove);
        let (tk2, ove2) = explode_record(&rec).unwrap();
        assert_eq!(tk, tk2);
        assert_eq!(ove, ove2);
    }

    #[test]
    fn short_record_is_flagged() {
        assert!(matches!(
            explode_record(&[0u8; 10]),
            Err(NsError::RecordShort)
        ));
        // a full token but a truncated integer tail
        let mut rec = vec![0u8; TOKEN_LEN];
        rec.extend_from_slice(b"s\tf\td\tm\tr\t");
        rec.extend_from_slice(&[0u8; 8]);
        assert!(matches!(explode_record(&rec), Err(NsError::RecordShort)));
    }

    #[test]
    fn gstat_round_trip() {
        let gs = GroupStat {
            count: 7,
            low: 1,
            high: 7,
        };
        assert_eq!(gs, explode_gstat(&join_gstat(gs)).unwrap());
        assert!(matches!(explode_gstat(&[0; 23]), Err(NsError::RecordShort)));
    }

    #[test]
    fn expiry_keys_sort_chronologically() {
        let t1 = Timestamp::from_unix_secs(100);
        let t2 = Timestamp::from_unix_secs(100)
            + std::time::Duration::from_nanos(1);
        let t3 = Timestamp::from_unix_secs(101);
        let k1 = expiry_key(t1, b"<a@x>");
        let k2 = expiry_key(t2, b"<a@x>");
        let k3 = expiry_key(t3, b"<a@x>");
        assert!(k1 < k2);
        assert!(k2 < k3);
        // the scan end at t covers every key at or before t
        assert!(k1 < expiry_scan_end(t1));
        assert!(expiry_scan_end(t1) < k2);
    }

    #[test]
    fn simultaneous_expiry_keys_differ() {
        let t = Timestamp::from_unix_secs(100);
        assert_ne!(expiry_key(t, b"<a@x>"), expiry_key(t, b"<b@x>"));
    }

    #[test]
    fn mdb_blob_round_trip() {
        let mut buf = Vec::new();
        mdb_push_line(
            &mut buf,
            &RiElement {
                group: "comp.test".into(),
                num: 2,
            },
        );
        mdb_push_line(
            &mut buf,
            &RiElement {
                group: "alt.bin".into(),
                num: 1,
            },
        );
        let got: Vec<RiElement> = mdb_lines(&buf).collect();
        assert_eq!(2, got.len());
        assert_eq!(GroupName::from("comp.test"), got[0].group);
        assert_eq!(2, got[0].num);
        assert_eq!(GroupName::from("alt.bin"), got[1].group);
        assert_eq!(1, got[1].num);
    }

    #[test]
    fn mdb_malformed_lines_skip_and_blank_line_ends() {
        let blob = b"comp.test 2\njunk\nbad num\n\nalt.bin 1\n";
        let got: Vec<RiElement> = mdb_lines(blob).collect();
        // "junk" has one field, "bad num" fails the number parse, the
        // blank line ends the blob before alt.bin
        assert_eq!(1, got.len());
        assert_eq!(2, got[0].num);
    }
}
