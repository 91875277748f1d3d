//! Percent-decoding for query-string keys and values.

/// Decodes `%XX` escapes.
///
/// Malformed escapes are kept literally and invalid UTF-8 is replaced, so
/// decoding never fails.
#[must_use]
pub fn percent_decode(s: &str) -> String {
    decode(s, false)
}

/// Decodes `application/x-www-form-urlencoded` text: `%XX` escapes plus
/// `+` as a space.
#[must_use]
pub fn form_decode(s: &str) -> String {
    decode(s, true)
}

fn decode(s: &str, plus_as_space: bool) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
