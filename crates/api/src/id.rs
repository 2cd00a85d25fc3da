//! Types dealing with article and group identity.

macro_rules! imp_deref {
    ($i:ty, $t:ty) => {
        impl std::ops::Deref for $i {
            type Target = $t;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
    };
}

macro_rules! imp_from {
    ($a:ty, $b:ty, $i:ident => $e:expr) => {
        impl From<$b> for $a {
            fn from($i: $b) -> Self {
                $e
            }
        }
    };
}

/// Base identity type meant for newtyping.
/// You probably want [MessageId] or [GroupName].
///
/// In newsspool these bytes are the identity exactly as it appears on the
/// wire: a message-id including its angle brackets, or a newsgroup name,
/// without prefix or suffix.
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Id(#[serde(with = "crate::serde_bytes_text")] pub bytes::Bytes);

imp_deref!(Id, bytes::Bytes);
imp_from!(Id, bytes::Bytes, b => Id(b));

fn display(
    b: &bytes::Bytes,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    f.write_str(&String::from_utf8_lossy(b))
}

/// Identifies one article, globally, by its Message-ID header.
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(pub Id);

imp_deref!(MessageId, Id);
imp_from!(MessageId, bytes::Bytes, b => MessageId(Id(b)));
imp_from!(MessageId, Id, b => MessageId(b));

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        bytes::Bytes::copy_from_slice(s.as_bytes()).into()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        display(&self.0 .0, f)
    }
}

impl std::fmt::Debug for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        display(&self.0 .0, f)
    }
}

/// Identifies a newsgroup by name.
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct GroupName(pub Id);

imp_deref!(GroupName, Id);
imp_from!(GroupName, bytes::Bytes, b => GroupName(Id(b)));
imp_from!(GroupName, Id, b => GroupName(b));

impl From<&str> for GroupName {
    fn from(s: &str) -> Self {
        bytes::Bytes::copy_from_slice(s.as_bytes()).into()
    }
}

impl std::fmt::Display for GroupName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        display(&self.0 .0, f)
    }
}

impl std::fmt::Debug for GroupName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        display(&self.0 .0, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_is_text() {
        let m = MessageId::from("<a@x>");
        assert_eq!("<a@x>", m.to_string());
        assert_eq!("<a@x>", format!("{m:?}"));
        let g = GroupName::from("comp.test");
        assert_eq!("comp.test", g.to_string());
    }

    #[test]
    fn id_serde_round_trip() {
        let m = MessageId::from("<b@y>");
        let enc = serde_json::to_string(&m).unwrap();
        assert_eq!("\"<b@y>\"", enc);
        let dec: MessageId = serde_json::from_str(&enc).unwrap();
        assert_eq!(m, dec);
    }

    #[test]
    fn group_ordering_is_bytewise() {
        let a = GroupName::from("comp.test");
        let b = GroupName::from("comp.test.moderated");
        assert!(a < b);
    }
}
