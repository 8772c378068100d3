/// A position in a [`Params`](crate::Params) or [`Segments`](crate::Segments) view.
///
/// A cursor holds the byte offset at which an element starts, delimiter included,
/// or the offset right past the last element for the end cursor.
/// Cursors compare by offset.
///
/// An edit through a mutable view leaves cursors before the edited offset valid,
/// and invalidates every cursor at or after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(usize);

impl Cursor {
    pub(crate) fn new(offset: usize) -> Self {
        Self(offset)
    }

    /// Returns the byte offset of the cursor in the URI.
    #[must_use]
    pub fn offset(self) -> usize {
        self.0
    }
}
