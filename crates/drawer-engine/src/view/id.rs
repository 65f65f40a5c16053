use core::fmt;

/// Handle to a view in a [`ViewTree`](super::ViewTree).
///
/// Contains a slot index and a generation counter so handles to destroyed
/// views are detected after the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ViewId {
    /// Raw slot index (diagnostics only).
    #[inline]
    pub const fn index(self) -> u32 {
        self.idx
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({}@gen{})", self.idx, self.generation)
    }
}
