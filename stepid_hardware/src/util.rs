/// Strip a trailing `\n` / `\r\n` (and any stray `\r`) from a raw line.
#[inline]
pub fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Split a command line into at most `N` whitespace-separated words.
///
/// Returns `None` when the line has more than `N` words.
pub fn split_words<const N: usize>(line: &str) -> Option<([&str; N], usize)> {
    let mut out = [""; N];
    let mut n = 0;
    for word in line.split_ascii_whitespace() {
        if n == N {
            return None;
        }
        out[n] = word;
        n += 1;
    }
    Some((out, n))
}
