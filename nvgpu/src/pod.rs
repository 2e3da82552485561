//! Byte-level access to ABI parameter blocks.
//!
//! Intercepted ioctls hand the proxy an untyped payload. Handlers that need
//! to look inside it go through [`read_params`] / [`write_params`], which only
//! accept types marked [`Pod`].

use core::mem::size_of;
use core::ptr;

/// Plain-old-data ABI structs.
///
/// # Safety
/// Implementors must be `#[repr(C)]`, made only of integer fields (or arrays
/// and other `Pod` structs thereof), declare every padding byte as an explicit
/// field, and accept every bit pattern.
pub unsafe trait Pod: Copy + 'static {}

/// Decode a `P` from the front of `buf`. `None` if `buf` is too short.
pub fn read_params<P: Pod>(buf: &[u8]) -> Option<P> {
    if buf.len() < size_of::<P>() {
        return None;
    }
    // SAFETY: length checked above; `P: Pod` accepts any bit pattern.
    Some(unsafe { ptr::read_unaligned(buf.as_ptr().cast::<P>()) })
}

/// Encode `params` over the front of `buf`. Returns `false` if `buf` is too
/// short, leaving it untouched.
pub fn write_params<P: Pod>(buf: &mut [u8], params: &P) -> bool {
    if buf.len() < size_of::<P>() {
        return false;
    }
    // SAFETY: length checked above; `P: Pod` has no implicit padding, so every
    // byte written is initialised.
    unsafe { ptr::write_unaligned(buf.as_mut_ptr().cast::<P>(), *params) };
    true
}

macro_rules! impl_pod {
    ($($t:ty),* $(,)?) => {
        $( unsafe impl $crate::pod::Pod for $t {} )*
    };
}
pub(crate) use impl_pod;

unsafe impl Pod for u8 {}
unsafe impl Pod for u32 {}
unsafe impl Pod for u64 {}
unsafe impl Pod for i32 {}
unsafe impl<P: Pod, const N: usize> Pod for [P; N] {}
