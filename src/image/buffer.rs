//! Shared pixel buffers and the allocators that produce them.

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::util::{ImageError, ImageResult};

/// Alignment used by [`AlignedAllocator::default`].
pub const DEFAULT_ALIGNMENT: usize = 16;

/// A zero-initialized, heap-allocated block of bytes.
///
/// Blocks are only ever handled through [`DataSegment`], a reference-counted
/// handle shared by every image that views the block. The block itself does
/// not synchronize access to its bytes.
pub struct DataBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

/// Shared handle to a pixel buffer. The last handle frees the block.
pub type DataSegment = Arc<DataBlock>;

// SAFETY: the block owns its allocation exclusively and never hands out
// references into it; byte access goes through raw pointers, and keeping
// writers to overlapping views apart is the caller's responsibility.
unsafe impl Send for DataBlock {}
// SAFETY: see above.
unsafe impl Sync for DataBlock {}

impl DataBlock {
    /// Allocates `bytes` zeroed bytes aligned to `alignment`.
    pub fn allocate(bytes: usize, alignment: usize) -> ImageResult<Self> {
        let layout = Layout::from_size_align(bytes.max(1), alignment)
            .map_err(|_| ImageError::SizeOverflow)?;
        // SAFETY: `layout` has a nonzero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(ImageError::AllocationFailed { bytes })?;
        Ok(Self { ptr, layout })
    }

    /// Length of the block in bytes.
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Always false: blocks hold at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Alignment of the first byte.
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    /// Pointer to the first byte.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }
}

impl Drop for DataBlock {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed` with this exact layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl fmt::Debug for DataBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBlock")
            .field("len", &self.len())
            .field("alignment", &self.alignment())
            .finish()
    }
}

/// Source of pixel buffers for [`Image::forge`](crate::Image::forge).
pub trait Allocator: fmt::Debug + Send + Sync {
    /// Returns a zero-initialized block of at least `bytes` bytes.
    fn allocate(&self, bytes: usize) -> ImageResult<DataSegment>;
}

/// Allocator returning blocks with a fixed power-of-two alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlignedAllocator {
    alignment: usize,
}

impl AlignedAllocator {
    /// Creates an allocator; `alignment` must be a power of two.
    pub fn new(alignment: usize) -> ImageResult<Self> {
        if !alignment.is_power_of_two() {
            return Err(ImageError::ParameterOutOfRange(
                "alignment must be a power of two",
            ));
        }
        Ok(Self { alignment })
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }
}

impl Default for AlignedAllocator {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT,
        }
    }
}

impl Allocator for AlignedAllocator {
    fn allocate(&self, bytes: usize) -> ImageResult<DataSegment> {
        DataBlock::allocate(bytes, self.alignment).map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::{AlignedAllocator, Allocator, DataBlock};

    #[test]
    fn blocks_are_zeroed_and_aligned() {
        let allocator = AlignedAllocator::new(64).unwrap();
        let block = allocator.allocate(100).unwrap();
        assert_eq!(block.len(), 100);
        assert_eq!(block.as_ptr() as usize % 64, 0);
        for i in 0..block.len() {
            // SAFETY: `i` is within the block.
            assert_eq!(unsafe { *block.as_ptr().add(i) }, 0);
        }
    }

    #[test]
    fn rejects_bad_alignment() {
        assert!(AlignedAllocator::new(12).is_err());
        assert!(DataBlock::allocate(8, 3).is_err());
    }
}
