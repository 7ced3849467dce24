//! Cache Value Module
//!
//! Defines the sizing capability required of stored values and the
//! immutable byte buffer the cache node stores by default.

use std::fmt;
use std::sync::Arc;

// == Sized Value ==
/// A value whose byte length is charged against the cache budget.
///
/// `size()` must be stable for a given value: the store records it on insert
/// and subtracts the same figure on update or eviction.
pub trait SizedValue {
    /// Returns the accounted byte length of the value.
    fn size(&self) -> usize;
}

impl SizedValue for String {
    fn size(&self) -> usize {
        self.len()
    }
}

impl SizedValue for &'static str {
    fn size(&self) -> usize {
        self.len()
    }
}

impl SizedValue for Vec<u8> {
    fn size(&self) -> usize {
        self.len()
    }
}

// == Byte View ==
/// An immutable view over a byte buffer.
///
/// Clones share the underlying storage, so handing a value out of the cache
/// never copies the payload. The bytes cannot be mutated through a view.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    // == Constructor ==
    /// Creates a view by taking ownership of `bytes`.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    // == Length ==
    /// Returns the number of bytes in the view.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // == Byte Slice ==
    /// Returns a copy of the bytes that the caller is free to mutate.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Borrows the bytes without copying.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for ByteView {
    fn default() -> Self {
        Self::new(Vec::<u8>::new())
    }
}

impl SizedValue for ByteView {
    fn size(&self) -> usize {
        self.len()
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("len", &self.len())
            .field("bytes", &String::from_utf8_lossy(&self.bytes))
            .finish()
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for ByteView {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for ByteView {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_view_len_matches_size() {
        let view = ByteView::from("hello");
        assert_eq!(view.len(), 5);
        assert_eq!(view.size(), 5);
        assert!(!view.is_empty());
    }

    #[test]
    fn test_byte_view_empty() {
        let view = ByteView::default();
        assert!(view.is_empty());
        assert_eq!(view.size(), 0);
    }

    #[test]
    fn test_byte_slice_is_a_copy() {
        let view = ByteView::from("abc");
        let mut copy = view.byte_slice();
        copy[0] = b'z';

        assert_eq!(copy, b"zbc");
        assert_eq!(view.as_bytes(), b"abc");
    }

    #[test]
    fn test_clones_share_storage() {
        let view = ByteView::from(vec![1u8, 2, 3]);
        let clone = view.clone();

        assert_eq!(view, clone);
        assert_eq!(view.as_bytes().as_ptr(), clone.as_bytes().as_ptr());
    }

    #[test]
    fn test_display_is_lossy_utf8() {
        assert_eq!(ByteView::from("value").to_string(), "value");
        assert_eq!(ByteView::from(&[0xffu8, b'a'][..]).to_string(), "\u{fffd}a");
    }

    #[test]
    fn test_plain_values_are_sized() {
        assert_eq!("four".size(), 4);
        assert_eq!(String::from("twelve chars").size(), 12);
        assert_eq!(vec![0u8; 7].size(), 7);
    }
}
