//! Packed bit array of visited faces.

use crate::mesh::{FaceId, MeshIndex};

const WORD_BITS: usize = u64::BITS as usize;

/// One bit per face, set once the face has been entered by the front.
///
/// Sized from the face count when a run starts; bits are never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedSet {
    words: Vec<u64>,
    num_faces: usize,
    count: usize,
}

impl VisitedSet {
    /// Create an empty set for `num_faces` faces (`ceil(num_faces / 64)` words).
    pub fn new(num_faces: usize) -> Self {
        Self {
            words: vec![0; num_faces.div_ceil(WORD_BITS)],
            num_faces,
            count: 0,
        }
    }

    #[inline]
    fn slot(face: usize) -> (usize, u64) {
        (face / WORD_BITS, 1u64 << (face % WORD_BITS))
    }

    /// Mark a face visited. Returns `true` if it was already visited.
    ///
    /// Ids outside the mesh the set was sized for are never stored and
    /// report `true`, so callers never enter them.
    #[inline]
    pub fn test_and_set<I: MeshIndex>(&mut self, face: FaceId<I>) -> bool {
        if face.index() >= self.num_faces {
            return true;
        }
        let (word, mask) = Self::slot(face.index());
        let Some(bits) = self.words.get_mut(word) else {
            return true;
        };
        let was_set = *bits & mask != 0;
        if !was_set {
            *bits |= mask;
            self.count += 1;
        }
        was_set
    }

    /// Check whether a face has been visited. Out-of-range ids are unvisited.
    #[inline]
    pub fn contains<I: MeshIndex>(&self, face: FaceId<I>) -> bool {
        let (word, mask) = Self::slot(face.index());
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// Number of visited faces.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if no face has been visited.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of faces the set was sized for.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.num_faces
    }

    /// The packed words, face `i` at bit `i % 64` of word `i / 64`.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Iterate over visited faces in ascending order.
    pub fn iter<I: MeshIndex>(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(FaceId::new(wi * WORD_BITS + bit))
            })
        })
    }
}
