//! Decoder for `KEY:VALUE,KEY:VALUE` telemetry records.
//!
//! Anything that does not decode is `None`: partial lines and noise are
//! normal on a live link and the capture loop just moves on.

/// Key carrying the device clock.
pub const TIME_KEY: &str = "T";

/// Time stamp plus the requested field, if the record carried it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub time: i64,
    pub value: Option<i64>,
}

/// Iterate `(key, value)` pairs of a record. Tokens without `:` are skipped.
pub fn fields(line: &str) -> impl Iterator<Item = (&str, &str)> {
    line.split(',').filter_map(|token| token.split_once(':'))
}

#[derive(Debug, Clone, Copy)]
pub struct TelemetryDecoder {
    field: &'static str,
}

impl TelemetryDecoder {
    /// Decoder extracting `T` and `field` (e.g. `"LM"`).
    pub const fn new(field: &'static str) -> Self {
        Self { field }
    }

    /// Decode one line.
    ///
    /// A record must contain both `,` and `:` and a parsable `T`. A present
    /// but unparsable requested field rejects the whole line; later
    /// duplicates of a key win.
    pub fn decode(&self, line: &str) -> Option<Reading> {
        if !(line.contains(',') && line.contains(':')) {
            return None;
        }
        let mut time = None;
        let mut value = None;
        for (key, raw) in fields(line) {
            if key == TIME_KEY {
                time = Some(parse_int(raw)?);
            } else if key == self.field {
                value = Some(parse_int(raw)?);
            }
        }
        Some(Reading { time: time?, value })
    }
}

#[inline]
fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const LM: TelemetryDecoder = TelemetryDecoder::new("LM");

    #[test]
    fn decodes_time_and_field() {
        assert_eq!(
            LM.decode("T:1200,LM:-35"),
            Some(Reading {
                time: 1200,
                value: Some(-35)
            })
        );
    }

    #[test]
    fn field_order_and_extra_keys_do_not_matter() {
        assert_eq!(
            LM.decode("RM:7,LM:42,T:10,V:3300"),
            Some(Reading {
                time: 10,
                value: Some(42)
            })
        );
    }

    #[test]
    fn missing_field_yields_time_only() {
        assert_eq!(
            LM.decode("T:10,RM:5"),
            Some(Reading {
                time: 10,
                value: None
            })
        );
    }

    #[test]
    fn value_whitespace_and_crlf_tolerated() {
        assert_eq!(
            LM.decode("T: 10,LM:5\r"),
            Some(Reading {
                time: 10,
                value: Some(5)
            })
        );
    }

    #[rstest]
    #[case("")]
    #[case("T:10")] // no comma: single-field records are not telemetry
    #[case("hello, world")] // no colon
    #[case("LM:5,RM:6")] // no time
    #[case("T:abc,LM:5")] // bad time
    #[case("T:10,LM:5x")] // bad requested field
    #[case("T:10:11,LM:5")]
    #[case("t:10,LM:5")] // keys are case sensitive
    fn rejects_noise(#[case] line: &str) {
        assert_eq!(LM.decode(line), None);
    }

    #[test]
    fn unrelated_garbage_values_are_ignored() {
        assert_eq!(
            LM.decode("T:10,X:??,LM:1"),
            Some(Reading {
                time: 10,
                value: Some(1)
            })
        );
    }
}
