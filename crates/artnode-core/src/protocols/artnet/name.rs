use std::fmt;

use serde::{Deserialize, Serialize};

use super::layout;

/// Null-terminated text field with a fixed wire capacity (terminator included).
///
/// At most `CAP - 1` bytes are kept; longer input is truncated on a UTF-8
/// boundary, so the encoded field always ends with at least one NUL.
///
/// # Examples
/// ```
/// use artnode_core::protocols::artnet::ShortName;
///
/// let name = ShortName::new("a-very-long-node-name");
/// assert_eq!(name.to_string(), "a-very-long-node-");
/// assert_eq!(name.to_field()[17], 0);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FixedName<const CAP: usize> {
    bytes: [u8; CAP],
    len: usize,
}

pub type ShortName = FixedName<{ layout::SHORT_NAME_LEN }>;
pub type LongName = FixedName<{ layout::LONG_NAME_LEN }>;
pub type NodeReport = FixedName<{ layout::NODE_REPORT_LEN }>;

impl<const CAP: usize> FixedName<CAP> {
    pub fn new(text: &str) -> Self {
        let text = text.split('\0').next().unwrap_or_default();
        let mut end = text.len().min(CAP.saturating_sub(1));
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        Self::from_raw(&text.as_bytes()[..end])
    }

    /// Decode a wire field: bytes up to the first NUL, capped at `CAP - 1`.
    pub fn from_field(field: &[u8]) -> Self {
        let end = field
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(field.len())
            .min(CAP.saturating_sub(1));
        Self::from_raw(&field[..end])
    }

    fn from_raw(raw: &[u8]) -> Self {
        let mut bytes = [0u8; CAP];
        bytes[..raw.len()].copy_from_slice(raw);
        Self {
            bytes,
            len: raw.len(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Wire form, NUL-padded to the full capacity.
    pub fn to_field(&self) -> [u8; CAP] {
        self.bytes
    }
}

impl<const CAP: usize> Default for FixedName<CAP> {
    fn default() -> Self {
        Self::from_raw(&[])
    }
}

impl<const CAP: usize> fmt::Display for FixedName<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl<const CAP: usize> fmt::Debug for FixedName<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

impl<const CAP: usize> From<String> for FixedName<CAP> {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl<const CAP: usize> From<&str> for FixedName<CAP> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<const CAP: usize> From<FixedName<CAP>> for String {
    fn from(value: FixedName<CAP>) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{LongName, ShortName};

    #[test]
    fn truncates_to_capacity_minus_terminator() {
        let name = ShortName::new("0123456789abcdefghij");
        assert_eq!(name.as_bytes(), b"0123456789abcdefg");
        let field = name.to_field();
        assert_eq!(field.len(), 18);
        assert_eq!(field[17], 0);
    }

    #[test]
    fn truncation_keeps_utf8_boundary() {
        let name = ShortName::new("ééééééééé");
        assert_eq!(name.as_bytes().len(), 16);
        assert_eq!(name.to_string(), "éééééééé");
    }

    #[test]
    fn from_field_stops_at_first_nul() {
        let mut field = [0u8; 64];
        field[..5].copy_from_slice(b"stage");
        field[6] = b'x';
        assert_eq!(LongName::from_field(&field).to_string(), "stage");
    }

    #[test]
    fn unterminated_field_is_capped() {
        let field = [b'a'; 18];
        let name = ShortName::from_field(&field);
        assert_eq!(name.as_bytes().len(), 17);
    }

    #[test]
    fn empty_by_default() {
        assert!(ShortName::default().is_empty());
        assert!(ShortName::new("").is_empty());
    }
}
