//! Frontend device (`/dev/nvidiactl`, `/dev/nvidia#`) ioctls.
//!
//! The frontend request number is `IOC_NR(cmd)`; see
//! `kernel-open/common/inc/nv-ioctl-numbers.h` and
//! `src/nvidia/arch/nvalloc/unix/include/nv_escape.h`.

use crate::ioctl::iowr;
use crate::pod::impl_pod;
use crate::Handle;

pub const NV_IOCTL_MAGIC: u32 = b'F' as u32;
pub const NV_IOCTL_BASE: u32 = 200;

/*──────────────────────────── nv-ioctl-numbers.h ────────────────────────*/

pub const NV_ESC_CARD_INFO: u32 = NV_IOCTL_BASE;
pub const NV_ESC_REGISTER_FD: u32 = NV_IOCTL_BASE + 1;
pub const NV_ESC_ALLOC_OS_EVENT: u32 = NV_IOCTL_BASE + 6;
pub const NV_ESC_FREE_OS_EVENT: u32 = NV_IOCTL_BASE + 7;
pub const NV_ESC_STATUS_CODE: u32 = NV_IOCTL_BASE + 9;
pub const NV_ESC_CHECK_VERSION_STR: u32 = NV_IOCTL_BASE + 10;
pub const NV_ESC_SYS_PARAMS: u32 = NV_IOCTL_BASE + 14;
pub const NV_ESC_NUMA_INFO: u32 = NV_IOCTL_BASE + 15;

/*──────────────────────────── nv_escape.h ───────────────────────────────*/

pub const NV_ESC_RM_ALLOC_MEMORY: u32 = 0x27;
pub const NV_ESC_RM_FREE: u32 = 0x29;
/// Generic control entry point; carries an [`Nvos54Parameters`].
pub const NV_ESC_RM_CONTROL: u32 = 0x2a;
/// Generic allocate entry point; carries an NVOS21 or NVOS64 block.
pub const NV_ESC_RM_ALLOC: u32 = 0x2b;
pub const NV_ESC_RM_DUP_OBJECT: u32 = 0x34;
pub const NV_ESC_RM_SHARE: u32 = 0x35;
pub const NV_ESC_RM_VID_HEAP_CONTROL: u32 = 0x4a;
pub const NV_ESC_RM_MAP_MEMORY: u32 = 0x4e;
pub const NV_ESC_RM_UNMAP_MEMORY: u32 = 0x4f;
pub const NV_ESC_RM_UPDATE_DEVICE_MAPPING_INFO: u32 = 0x5e;

/// Full request code for frontend escape `nr` with a `size`-byte payload.
pub const fn frontend_cmd(nr: u32, size: u32) -> u32 {
    iowr(NV_IOCTL_MAGIC, nr, size)
}

/*──────────────────────────── parameter blocks ──────────────────────────*/

/// `nv_ioctl_register_fd_t`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct IoctlRegisterFd {
    pub ctl_fd: i32,
}

/// `nv_ioctl_alloc_os_event_t`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct IoctlAllocOsEvent {
    pub h_client: Handle,
    pub h_device: Handle,
    pub fd: u32,
    pub status: u32,
}

/// `nv_ioctl_free_os_event_t`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct IoctlFreeOsEvent {
    pub h_client: Handle,
    pub h_device: Handle,
    pub fd: u32,
    pub status: u32,
}

/// `NVOS00_PARAMETERS` (`NV_ESC_RM_FREE`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nvos00Parameters {
    pub h_root: Handle,
    pub h_object_parent: Handle,
    pub h_object_old: Handle,
    pub status: u32,
}

/// `NVOS02_PARAMETERS` (`NV_ESC_RM_ALLOC_MEMORY`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nvos02Parameters {
    pub h_root: Handle,
    pub h_object_parent: Handle,
    pub h_object_new: Handle,
    pub h_class: u32,
    pub flags: u32,
    pub pad0: [u8; 4],
    pub p_memory: u64,
    pub limit: u64,
    pub status: u32,
    pub pad1: [u8; 4],
}

/// `nv_ioctl_nvos02_parameters_with_fd`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct IoctlNvos02ParametersWithFd {
    pub params: Nvos02Parameters,
    pub fd: i32,
    pub pad0: [u8; 4],
}

/// `NVOS21_PARAMETERS` as of R525.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nvos21Parameters {
    pub h_root: Handle,
    pub h_object_parent: Handle,
    pub h_object_new: Handle,
    pub h_class: u32,
    pub p_alloc_parms: u64,
    pub status: u32,
    pub pad0: [u8; 4],
}

/// `NVOS21_PARAMETERS` as of R535: `paramsSize` takes over the old padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nvos21ParametersR535 {
    pub h_root: Handle,
    pub h_object_parent: Handle,
    pub h_object_new: Handle,
    pub h_class: u32,
    pub p_alloc_parms: u64,
    pub params_size: u32,
    pub status: u32,
}

/// `NVOS64_PARAMETERS` as of R525.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nvos64Parameters {
    pub h_root: Handle,
    pub h_object_parent: Handle,
    pub h_object_new: Handle,
    pub h_class: u32,
    pub p_alloc_parms: u64,
    pub p_rights_requested: u64,
    pub flags: u32,
    pub status: u32,
}

/// `NVOS64_PARAMETERS` as of R535.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nvos64ParametersR535 {
    pub h_root: Handle,
    pub h_object_parent: Handle,
    pub h_object_new: Handle,
    pub h_class: u32,
    pub p_alloc_parms: u64,
    pub p_rights_requested: u64,
    pub params_size: u32,
    pub flags: u32,
    pub status: u32,
    pub pad0: [u8; 4],
}

/// `NVOS32_PARAMETERS` (`NV_ESC_RM_VID_HEAP_CONTROL`). The per-function
/// union is kept opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Nvos32Parameters {
    pub h_root: Handle,
    pub h_object_parent: Handle,
    pub function: u32,
    pub h_va_space: Handle,
    pub ivc_heap_number: i16,
    pub pad: [u8; 2],
    pub status: u32,
    pub total: u64,
    pub free: u64,
    pub data: [u8; 144],
}

impl Default for Nvos32Parameters {
    fn default() -> Self {
        Self {
            h_root: Handle::default(),
            h_object_parent: Handle::default(),
            function: 0,
            h_va_space: Handle::default(),
            ivc_heap_number: 0,
            pad: [0; 2],
            status: 0,
            total: 0,
            free: 0,
            data: [0; 144],
        }
    }
}

pub const NVOS32_FUNCTION_ALLOC_SIZE: u32 = 2;

/// `NVOS33_PARAMETERS` (`NV_ESC_RM_MAP_MEMORY`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nvos33Parameters {
    pub h_client: Handle,
    pub h_device: Handle,
    pub h_memory: Handle,
    pub pad0: [u8; 4],
    pub offset: u64,
    pub length: u64,
    pub p_linear_address: u64,
    pub status: u32,
    pub flags: u32,
}

/// `nv_ioctl_nvos33_parameters_with_fd`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct IoctlNvos33ParametersWithFd {
    pub params: Nvos33Parameters,
    pub fd: i32,
    pub pad0: [u8; 4],
}

/// `NVOS54_PARAMETERS` (`NV_ESC_RM_CONTROL`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nvos54Parameters {
    pub h_client: Handle,
    pub h_object: Handle,
    pub cmd: u32,
    pub flags: u32,
    pub params: u64,
    pub params_size: u32,
    pub status: u32,
}

pub const SIZEOF_NVOS21_PARAMETERS: usize = core::mem::size_of::<Nvos21Parameters>();
pub const SIZEOF_NVOS21_PARAMETERS_R535: usize = core::mem::size_of::<Nvos21ParametersR535>();
pub const SIZEOF_NVOS64_PARAMETERS: usize = core::mem::size_of::<Nvos64Parameters>();
pub const SIZEOF_NVOS64_PARAMETERS_R535: usize = core::mem::size_of::<Nvos64ParametersR535>();

impl_pod!(
    IoctlRegisterFd,
    IoctlAllocOsEvent,
    IoctlFreeOsEvent,
    Nvos00Parameters,
    Nvos02Parameters,
    IoctlNvos02ParametersWithFd,
    Nvos21Parameters,
    Nvos21ParametersR535,
    Nvos64Parameters,
    Nvos64ParametersR535,
    Nvos32Parameters,
    Nvos33Parameters,
    IoctlNvos33ParametersWithFd,
    Nvos54Parameters,
);
