//! Canonical cache keys for query subtrees.
//!
//! Operators describe themselves through [`SubtreeKey`]; a [`KeyWriter`]
//! turns that description into a string. Fields are length-prefixed and
//! children are bracketed, so two different subtrees cannot collapse into the
//! same key by shifting text between neighbouring fields.

use alloc::string::String;
use core::fmt::{self, Write};
use core::hash::Hasher;

/// A query subtree that can be serialized into a canonical cache key.
///
/// Implementations must write every field that influences the subtree's
/// result, in a fixed order. Equal subtrees must write equal keys.
pub trait SubtreeKey {
    /// Writes this subtree's canonical form.
    fn write_key(&self, writer: &mut KeyWriter);

    /// Returns this subtree's canonical key.
    fn cache_key(&self) -> String {
        let mut writer = KeyWriter::new();
        self.write_key(&mut writer);
        writer.finish()
    }
}

impl<T: SubtreeKey + ?Sized> SubtreeKey for &T {
    fn write_key(&self, writer: &mut KeyWriter) {
        (**self).write_key(writer);
    }
}

/// Builder for canonical subtree keys.
///
/// ```
/// use sift_query::KeyWriter;
///
/// let mut w = KeyWriter::new();
/// w.begin("SCAN").field("?s").field("<knows>").field("?o").end();
/// assert_eq!(w.finish(), "SCAN(2:?s7:<knows>2:?o)");
/// ```
#[derive(Clone, Debug, Default)]
pub struct KeyWriter {
    buf: String,
}

impl KeyWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a node. Tags name the operator kind and must not contain
    /// brackets or `:`.
    pub fn begin(&mut self, tag: &str) -> &mut Self {
        debug_assert!(
            !tag.contains(['(', ')', ':']),
            "tag {:?} contains a reserved character",
            tag
        );
        self.buf.push_str(tag);
        self.buf.push('(');
        self
    }

    /// Writes one length-prefixed text field.
    pub fn field(&mut self, text: &str) -> &mut Self {
        // Writing into a String cannot fail.
        let _ = write!(self.buf, "{}:", text.len());
        self.buf.push_str(text);
        self
    }

    /// Writes a field from anything displayable (numbers, values).
    pub fn display(&mut self, value: impl fmt::Display) -> &mut Self {
        let mut text = String::new();
        let _ = write!(text, "{}", value);
        self.field(&text)
    }

    /// Writes a child subtree in place.
    pub fn child<C: SubtreeKey + ?Sized>(&mut self, child: &C) -> &mut Self {
        child.write_key(self);
        self
    }

    /// Closes the node opened by the matching [`begin`](Self::begin).
    pub fn end(&mut self) -> &mut Self {
        self.buf.push(')');
        self
    }

    /// Returns the key written so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// FNV-1a hasher, used for short key fingerprints in log events.
struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::FNV_OFFSET,
        }
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= *byte as u64;
            self.state = self.state.wrapping_mul(Self::FNV_PRIME);
        }
    }
}

/// Stable 64-bit fingerprint of a cache key.
///
/// Keys can be long; events log the fingerprint instead of the full text.
/// Never used for lookups, the cache compares full keys.
pub fn key_fingerprint(key: &str) -> u64 {
    let mut hasher = FnvHasher::new();
    hasher.write(key.as_bytes());
    hasher.finish()
}
