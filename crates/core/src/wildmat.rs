//! Wildmat patterns over newsgroup names.
//!
//! A wildmat is a comma-separated list of glob patterns (`*` and `?`),
//! each optionally negated with a leading `!`. Patterns are tried in
//! order; the last one that matches decides acceptance.

/// A compiled wildmat.
#[derive(Debug, Clone)]
pub struct Wildmat {
    pats: Vec<(bool, Vec<u8>)>,
}

impl Wildmat {
    /// Compile a wildmat expression.
    pub fn parse(expr: &str) -> Wildmat {
        let pats = expr
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| match p.strip_prefix('!') {
                Some(rest) => (true, rest.as_bytes().to_vec()),
                None => (false, p.as_bytes().to_vec()),
            })
            .collect();
        Wildmat { pats }
    }

    /// Match a group name against the pattern list.
    pub fn matches(&self, name: &[u8]) -> bool {
        let mut out = false;
        for (negate, pat) in &self.pats {
            if glob_match(pat, name) {
                out = !negate;
            }
        }
        out
    }
}

/// Glob match with `*` (any run) and `?` (any one byte), iterative with
/// single-star backtracking.
fn glob_match(pat: &[u8], name: &[u8]) -> bool {
    let (mut p, mut n) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while n < name.len() {
        if p < pat.len() && (pat[p] == b'?' || pat[p] == name[n]) {
            p += 1;
            n += 1;
        } else if p < pat.len() && pat[p] == b'*' {
            star = Some((p, n));
            p += 1;
        } else if let Some((sp, sn)) = star {
            p = sp + 1;
            n = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }
    while p < pat.len() && pat[p] == b'*' {
        p += 1;
    }
    p == pat.len()
}
