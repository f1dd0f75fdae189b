/// Prefixes up to this many bytes are stored inline; longer ones spill to an
/// owned buffer.
pub(crate) const INLINE_PREFIX_LEN: usize = 8;

/// A compressed path prefix: the bytes shared by every descendant of an
/// inner node beyond its parent edge. The length field is the source of
/// truth; the inline array holds the bytes for short prefixes and the spill
/// buffer takes over past [`INLINE_PREFIX_LEN`].
#[derive(Clone, Debug)]
pub(crate) struct Prefix {
    len: usize,
    inline: [u8; INLINE_PREFIX_LEN],
    spill: Option<Box<[u8]>>,
}

impl Prefix {
    pub(crate) fn from_slice(src: &[u8]) -> Self {
        let mut inline = [0u8; INLINE_PREFIX_LEN];
        if src.len() <= INLINE_PREFIX_LEN {
            inline[..src.len()].copy_from_slice(src);
            Self {
                len: src.len(),
                inline,
                spill: None,
            }
        } else {
            Self {
                len: src.len(),
                inline,
                spill: Some(Box::from(src)),
            }
        }
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub(crate) fn at(&self, pos: usize) -> u8 {
        debug_assert!(pos < self.len);
        self.as_slice()[pos]
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        match &self.spill {
            Some(spill) => &spill[..self.len],
            None => &self.inline[..self.len],
        }
    }

    /// The first `length` bytes, as their own prefix.
    pub(crate) fn before(&self, length: usize) -> Self {
        assert!(length <= self.len);
        Self::from_slice(&self.as_slice()[..length])
    }

    /// Everything from `start` onwards, as its own prefix.
    pub(crate) fn after(&self, start: usize) -> Self {
        assert!(start <= self.len);
        Self::from_slice(&self.as_slice()[start..])
    }

    /// The number of leading prefix bytes equal to `key[depth..]`, stopping
    /// at the first mismatch or at the end of either.
    pub(crate) fn match_len(&self, key: &[u8], depth: usize) -> usize {
        let prefix = self.as_slice();
        let mut idx = 0;
        while idx < prefix.len() {
            if depth + idx >= key.len() || key[depth + idx] != prefix[idx] {
                break;
            }
            idx += 1;
        }
        idx
    }
}

impl PartialEq for Prefix {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Prefix {}
