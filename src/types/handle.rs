//! Handle type for DXF objects
//!
//! Handles are unique 64-bit identifiers for all persisted objects in a
//! document. In DXF they are rendered as upper-case hexadecimal strings.

use std::fmt;

/// A unique identifier for DXF objects
///
/// Handle 0 is reserved and means "no object" (e.g. the owner of a table head).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Handle(u64);

impl Handle {
    /// The null/invalid handle (0)
    pub const NULL: Handle = Handle(0);

    /// Create a new handle from a u64 value
    #[inline]
    pub const fn new(value: u64) -> Self {
        Handle(value)
    }

    /// Parse a DXF hex string ("1F", "  2a"); `None` for garbage.
    pub fn from_hex(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() || text.len() > 16 {
            return None;
        }
        u64::from_str_radix(text, 16).ok().map(Handle)
    }

    /// Get the raw u64 value
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Check if this is a null/invalid handle
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Check if this is a valid handle
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// DXF rendering: upper-case hex without prefix
    pub fn to_hex(&self) -> String {
        format!("{:X}", self.0)
    }
}

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Handle(value)
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:X}", self.0)
    }
}

impl fmt::UpperHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

/// Monotonic handle allocator owned by a document (`$HANDSEED`).
#[derive(Debug, Clone)]
pub struct HandleSeed {
    next: u64,
}

impl HandleSeed {
    /// Start allocating at `start` (values below 1 are bumped to 1).
    pub fn new(start: u64) -> Self {
        HandleSeed { next: start.max(1) }
    }

    /// Allocate the next unused handle
    pub fn allocate(&mut self) -> Handle {
        let handle = Handle::new(self.next);
        self.next += 1;
        handle
    }

    /// Peek at the next value without allocating
    pub fn peek(&self) -> Handle {
        Handle::new(self.next)
    }

    /// Make sure future allocations never collide with `used`.
    pub fn reserve(&mut self, used: Handle) {
        if used.value() >= self.next {
            self.next = used.value() + 1;
        }
    }
}

impl Default for HandleSeed {
    fn default() -> Self {
        HandleSeed::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        let null = Handle::NULL;
        assert!(null.is_null());
        assert!(!null.is_valid());
        assert_eq!(null.value(), 0);
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Handle::from_hex("1F"), Some(Handle::new(0x1F)));
        assert_eq!(Handle::from_hex(" 2a "), Some(Handle::new(0x2A)));
        assert_eq!(Handle::from_hex("ZZ"), None);
        assert_eq!(Handle::from_hex(""), None);
        assert_eq!(Handle::from_hex("11112222333344445"), None);
    }

    #[test]
    fn test_handle_display() {
        let handle = Handle::new(0xABCD);
        assert_eq!(handle.to_hex(), "ABCD");
        assert_eq!(format!("{}", handle), "#ABCD");
        assert_eq!(format!("{:X}", handle), "ABCD");
    }

    #[test]
    fn test_seed_allocation() {
        let mut seed = HandleSeed::new(0x10);
        assert_eq!(seed.allocate(), Handle::new(0x10));
        assert_eq!(seed.allocate(), Handle::new(0x11));
        seed.reserve(Handle::new(0x40));
        assert_eq!(seed.peek(), Handle::new(0x41));
        seed.reserve(Handle::new(0x20));
        assert_eq!(seed.allocate(), Handle::new(0x41));
    }
}
