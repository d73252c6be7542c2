//! Java string values and their modified UTF-8 encoding (JVMS 4.4.7)

use std::fmt;

/// A Java string as UTF-16 code units.
///
/// Unlike `String` this keeps unpaired surrogates, which Java string literals
/// may legally contain, so a decoded constant re-encodes to the same bytes.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JavaString {
    units: Vec<u16>,
}

impl JavaString {
    pub fn from_units(units: Vec<u16>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[u16] {
        &self.units
    }

    /// The value as a Rust string, or `None` when it holds unpaired surrogates.
    pub fn as_string(&self) -> Option<String> {
        String::from_utf16(&self.units).ok()
    }

    pub fn into_string(self) -> Result<String, Self> {
        String::from_utf16(&self.units).map_err(|_| self)
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }

    pub fn to_modified_utf8(&self) -> Vec<u8> {
        encode_units(self.units.iter().copied())
    }

    /// Decode modified UTF-8. Returns `None` on malformed sequences or a raw NUL byte.
    pub fn from_modified_utf8(bytes: &[u8]) -> Option<Self> {
        let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            let b0 = bytes[i];
            if b0 & 0x80 == 0 {
                if b0 == 0 {
                    return None;
                }
                units.push(b0 as u16);
                i += 1;
            } else if b0 & 0xe0 == 0xc0 {
                let b1 = *bytes.get(i + 1)?;
                if b1 & 0xc0 != 0x80 {
                    return None;
                }
                units.push((((b0 & 0x1f) as u16) << 6) | (b1 & 0x3f) as u16);
                i += 2;
            } else if b0 & 0xf0 == 0xe0 {
                let b1 = *bytes.get(i + 1)?;
                let b2 = *bytes.get(i + 2)?;
                if b1 & 0xc0 != 0x80 || b2 & 0xc0 != 0x80 {
                    return None;
                }
                units.push((((b0 & 0x0f) as u16) << 12) | (((b1 & 0x3f) as u16) << 6) | (b2 & 0x3f) as u16);
                i += 3;
            } else {
                return None;
            }
        }
        Some(Self { units })
    }
}

impl From<&str> for JavaString {
    fn from(value: &str) -> Self {
        Self { units: value.encode_utf16().collect() }
    }
}

impl From<String> for JavaString {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Debug for JavaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for decoded in char::decode_utf16(self.units.iter().copied()) {
            match decoded {
                Ok(c) => write!(f, "{}", c.escape_debug())?,
                Err(unpaired) => write!(f, "\\u{{{:x}}}", unpaired.unpaired_surrogate())?,
            }
        }
        f.write_str("\"")
    }
}

impl fmt::Display for JavaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Encode a string in the JVM's modified UTF-8: NUL takes two bytes and
/// supplementary characters are written as surrogate pairs.
pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    encode_units(value.encode_utf16())
}

fn encode_units(units: impl Iterator<Item = u16>) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in units {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | ((unit >> 6) & 0x1f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | ((unit >> 12) & 0x0f) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_nul_and_supplementary_characters() {
        let value = "a\u{0}\u{1F600}é";
        let encoded = encode_modified_utf8(value);
        // NUL is two bytes, the emoji is a surrogate pair of 3 bytes each
        assert_eq!(&encoded[1..3], &[0xc0, 0x80]);
        assert_eq!(encoded.len(), 1 + 2 + 6 + 2);
        let decoded = JavaString::from_modified_utf8(&encoded).unwrap();
        assert_eq!(decoded.as_string().as_deref(), Some(value));
    }

    #[test]
    fn rejects_raw_nul_and_truncation() {
        assert_eq!(JavaString::from_modified_utf8(&[0x61, 0x00]), None);
        assert_eq!(JavaString::from_modified_utf8(&[0xe0, 0x80]), None);
    }

    #[test]
    fn unpaired_surrogates_survive_a_round_trip() {
        let bytes = [b'x', 0xed, 0xa0, 0x80];
        let decoded = JavaString::from_modified_utf8(&bytes).unwrap();
        assert_eq!(decoded.units(), &[0x78, 0xd800]);
        assert_eq!(decoded.as_string(), None);
        assert_eq!(decoded.to_modified_utf8(), bytes);
        assert_eq!(format!("{decoded:?}"), "\"x\\u{d800}\"");
    }
}
