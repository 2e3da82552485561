//! Driver ABI shared by the sandbox's GPU proxy.
//!
//! Everything in here is a mirror of the proprietary driver's own ABI for the
//! releases the proxy supports: ioctl numbers, nested control-command ids,
//! allocation-class ids and the `#[repr(C)]` parameter blocks whose sizes the
//! proxy checks before forwarding a request. No behaviour lives here.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod classes;
pub mod ctrl;
pub mod frontend;
pub mod ioctl;
pub mod pod;
pub mod uvm;

pub use pod::{read_params, write_params, Pod};

/// Client/object handle as seen by the resource manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Handle {
    pub val: u32,
}

/// `NV_OK`.
pub const NV_OK: u32 = 0x0000_0000;
pub const NV_ERR_INVALID_ADDRESS: u32 = 0x0000_001e;
pub const NV_ERR_INVALID_LIMIT: u32 = 0x0000_002e;
pub const NV_ERR_NOT_SUPPORTED: u32 = 0x0000_0056;

pod::impl_pod!(Handle);
