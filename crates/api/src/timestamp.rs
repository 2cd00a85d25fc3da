/// Newsspool timestamp.
///
/// Internally i64 nanoseconds from unix epoch. Nanosecond resolution is
/// what the reverse-index expiry queue keys on, so it is the resolution
/// carried everywhere.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Construct a new timestamp of "now".
    pub fn now() -> Self {
        std::time::SystemTime::now().into()
    }

    /// Construct a timestamp from i64 nanoseconds since unix epoch.
    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Construct a timestamp from i64 seconds since unix epoch.
    pub fn from_unix_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1_000_000_000))
    }

    /// Get the i64 nanoseconds since unix epoch.
    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Get the i64 seconds since unix epoch, truncating.
    pub fn as_unix_secs(&self) -> i64 {
        self.0.div_euclid(1_000_000_000)
    }
}

impl std::ops::Add<std::time::Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: std::time::Duration) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs.as_nanos() as i64))
    }
}

impl std::ops::Sub<std::time::Duration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: std::time::Duration) -> Self::Output {
        Timestamp(self.0.saturating_sub(rhs.as_nanos() as i64))
    }
}

impl From<std::time::SystemTime> for Timestamp {
    fn from(t: std::time::SystemTime) -> Self {
        match t.duration_since(std::time::SystemTime::UNIX_EPOCH) {
            Ok(d) => Self(d.as_nanos() as i64),
            Err(e) => Self(-(e.duration().as_nanos() as i64)),
        }
    }
}

impl From<Timestamp> for std::time::SystemTime {
    fn from(t: Timestamp) -> Self {
        if t.0 >= 0 {
            std::time::SystemTime::UNIX_EPOCH
                + std::time::Duration::from_nanos(t.0 as u64)
        } else {
            std::time::SystemTime::UNIX_EPOCH
                - std::time::Duration::from_nanos(t.0.unsigned_abs())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unix_secs_round_trip() {
        let t = Timestamp::from_unix_secs(1_600_000_000);
        assert_eq!(1_600_000_000, t.as_unix_secs());
        assert_eq!(1_600_000_000_000_000_000, t.as_nanos());
    }

    #[test]
    fn duration_arithmetic() {
        let t = Timestamp::from_unix_secs(100);
        let u = t + std::time::Duration::from_secs(5);
        assert_eq!(105, u.as_unix_secs());
        let v = u - std::time::Duration::from_secs(10);
        assert_eq!(95, v.as_unix_secs());
    }

    #[test]
    fn system_time_round_trip() {
        let t = Timestamp::from_unix_secs(1_700_000_000);
        let st: std::time::SystemTime = t.into();
        let u: Timestamp = st.into();
        assert_eq!(t, u);
    }

    #[test]
    fn ordering_is_chronological() {
        assert!(Timestamp::from_nanos(1) < Timestamp::from_nanos(2));
        assert!(Timestamp::from_unix_secs(-1) < Timestamp::from_unix_secs(0));
    }
}
