use std::fmt;

const LEN: usize = 16usize;

/// Short capture-group name stored inline, so matches stay `Copy` and
/// allocation-free no matter how many group edges they carry.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(align(8))]
pub struct InlineString {
    data: [u8; LEN],
}

impl InlineString {
    pub fn new(s: &str) -> Self {
        assert!(
            s.len() <= LEN,
            "Group names must be at most {} bytes: {}",
            LEN,
            s
        );

        let mut data = [0u8; LEN];
        data[..s.len()].copy_from_slice(s.as_bytes());

        Self { data }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.data[..self.len()]).unwrap()
    }

    pub fn len(&self) -> usize {
        let mut len = 0;
        while len < LEN && self.data[len] != 0 {
            len += 1;
        }
        len
    }

    pub fn is_empty(&self) -> bool {
        self.data[0] == 0
    }
}

impl fmt::Debug for InlineString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.as_str())
    }
}

impl fmt::Display for InlineString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let s = InlineString::new("barcode");
        assert_eq!(s.as_str(), "barcode");
        assert_eq!(s.len(), 7);
        assert!(!s.is_empty());
        assert_eq!(s, InlineString::new("barcode"));
        assert_ne!(s, InlineString::new("umi"));
    }

    #[test]
    #[should_panic(expected = "at most")]
    fn too_long() {
        InlineString::new("a_very_long_group_name");
    }
}
