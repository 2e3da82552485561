//! Companion device (`/dev/nvidia-uvm`) ioctls.
//!
//! UVM does not use `_IOC` encoding: the request code is the raw command
//! number from `kernel-open/nvidia-uvm/uvm_ioctl.h`.

use crate::pod::impl_pod;
use crate::Handle;

pub const UVM_INITIALIZE: u32 = 0x3000_0001;
pub const UVM_DEINITIALIZE: u32 = 0x3000_0002;
pub const UVM_CREATE_RANGE_GROUP: u32 = 23;
pub const UVM_DESTROY_RANGE_GROUP: u32 = 24;
pub const UVM_REGISTER_GPU_VASPACE: u32 = 25;
pub const UVM_UNREGISTER_GPU_VASPACE: u32 = 26;
pub const UVM_REGISTER_CHANNEL: u32 = 27;
pub const UVM_UNREGISTER_CHANNEL: u32 = 28;
pub const UVM_MAP_EXTERNAL_ALLOCATION: u32 = 33;
pub const UVM_FREE: u32 = 34;
pub const UVM_REGISTER_GPU: u32 = 37;
pub const UVM_UNREGISTER_GPU: u32 = 38;
pub const UVM_PAGEABLE_MEM_ACCESS: u32 = 39;
pub const UVM_MAP_DYNAMIC_PARALLELISM_REGION: u32 = 65;
pub const UVM_ALLOC_SEMAPHORE_POOL: u32 = 68;
pub const UVM_VALIDATE_VA_RANGE: u32 = 72;
pub const UVM_CREATE_EXTERNAL_RANGE: u32 = 73;
/// Added in R535.
pub const UVM_MM_INITIALIZE: u32 = 75;

pub const UVM_MAX_GPUS: usize = 32;

pub type NvUuid = [u8; 16];

/// Parameter blocks that carry a frontend control fd (`rmCtrlFd`) the proxy
/// must swap for the host-side fd before forwarding.
pub trait HasRmCtrlFd {
    fn rm_ctrl_fd(&self) -> i32;
    fn set_rm_ctrl_fd(&mut self, fd: i32);
}

macro_rules! has_rm_ctrl_fd {
    ($($t:ty),* $(,)?) => {
        $(
            impl HasRmCtrlFd for $t {
                fn rm_ctrl_fd(&self) -> i32 {
                    self.rm_ctrl_fd
                }
                fn set_rm_ctrl_fd(&mut self, fd: i32) {
                    self.rm_ctrl_fd = fd;
                }
            }
        )*
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmInitializeParams {
    pub flags: u64,
    pub rm_status: u32,
    pub pad0: [u8; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmCreateRangeGroupParams {
    pub range_group_id: u64,
    pub rm_status: u32,
    pub pad0: [u8; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmDestroyRangeGroupParams {
    pub range_group_id: u64,
    pub rm_status: u32,
    pub pad0: [u8; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmRegisterGpuVaspaceParams {
    pub gpu_uuid: NvUuid,
    pub rm_ctrl_fd: i32,
    pub h_client: Handle,
    pub h_va_space: Handle,
    pub rm_status: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmUnregisterGpuVaspaceParams {
    pub gpu_uuid: NvUuid,
    pub rm_status: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmRegisterChannelParams {
    pub gpu_uuid: NvUuid,
    pub rm_ctrl_fd: i32,
    pub h_client: Handle,
    pub h_channel: Handle,
    pub pad: [u8; 4],
    pub base: u64,
    pub length: u64,
    pub rm_status: u32,
    pub pad0: [u8; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmUnregisterChannelParams {
    pub gpu_uuid: NvUuid,
    pub h_client: Handle,
    pub h_channel: Handle,
    pub rm_status: u32,
}

/// `UvmGpuMappingAttributes`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmGpuMappingAttributes {
    pub gpu_uuid: NvUuid,
    pub gpu_mapping_type: u32,
    pub gpu_caching_type: u32,
    pub gpu_format_type: u32,
    pub gpu_element_bits: u32,
    pub gpu_compression_type: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct UvmMapExternalAllocationParams {
    pub base: u64,
    pub length: u64,
    pub offset: u64,
    pub per_gpu_attributes: [UvmGpuMappingAttributes; UVM_MAX_GPUS],
    pub gpu_attributes_count: u64,
    pub rm_ctrl_fd: i32,
    pub h_client: Handle,
    pub h_memory: Handle,
    pub rm_status: u32,
}

impl Default for UvmMapExternalAllocationParams {
    fn default() -> Self {
        Self {
            base: 0,
            length: 0,
            offset: 0,
            per_gpu_attributes: [UvmGpuMappingAttributes::default(); UVM_MAX_GPUS],
            gpu_attributes_count: 0,
            rm_ctrl_fd: 0,
            h_client: Handle::default(),
            h_memory: Handle::default(),
            rm_status: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmFreeParams {
    pub base: u64,
    pub rm_status: u32,
    pub pad0: [u8; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmRegisterGpuParams {
    pub gpu_uuid: NvUuid,
    pub numa_enabled: u8,
    pub pad: [u8; 3],
    pub numa_node_id: i32,
    pub rm_ctrl_fd: i32,
    pub h_client: Handle,
    pub h_smc_part_ref: Handle,
    pub rm_status: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmUnregisterGpuParams {
    pub gpu_uuid: NvUuid,
    pub rm_status: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmPageableMemAccessParams {
    pub pageable_mem_access: u8,
    pub pad: [u8; 3],
    pub rm_status: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmMapDynamicParallelismRegionParams {
    pub base: u64,
    pub length: u64,
    pub gpu_uuid: NvUuid,
    pub rm_status: u32,
    pub pad: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct UvmAllocSemaphorePoolParams {
    pub base: u64,
    pub length: u64,
    pub per_gpu_attributes: [UvmGpuMappingAttributes; UVM_MAX_GPUS],
    pub gpu_attributes_count: u64,
    pub rm_status: u32,
    pub pad: [u8; 4],
}

impl Default for UvmAllocSemaphorePoolParams {
    fn default() -> Self {
        Self {
            base: 0,
            length: 0,
            per_gpu_attributes: [UvmGpuMappingAttributes::default(); UVM_MAX_GPUS],
            gpu_attributes_count: 0,
            rm_status: 0,
            pad: [0; 4],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmValidateVaRangeParams {
    pub base: u64,
    pub length: u64,
    pub rm_status: u32,
    pub pad: [u8; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmCreateExternalRangeParams {
    pub base: u64,
    pub length: u64,
    pub rm_status: u32,
    pub pad: [u8; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct UvmMmInitializeParams {
    pub uvm_fd: i32,
    pub status: u32,
}

has_rm_ctrl_fd!(
    UvmRegisterGpuVaspaceParams,
    UvmRegisterChannelParams,
    UvmMapExternalAllocationParams,
    UvmRegisterGpuParams,
);

impl_pod!(
    UvmInitializeParams,
    UvmCreateRangeGroupParams,
    UvmDestroyRangeGroupParams,
    UvmRegisterGpuVaspaceParams,
    UvmUnregisterGpuVaspaceParams,
    UvmRegisterChannelParams,
    UvmUnregisterChannelParams,
    UvmGpuMappingAttributes,
    UvmMapExternalAllocationParams,
    UvmFreeParams,
    UvmRegisterGpuParams,
    UvmUnregisterGpuParams,
    UvmPageableMemAccessParams,
    UvmMapDynamicParallelismRegionParams,
    UvmAllocSemaphorePoolParams,
    UvmValidateVaRangeParams,
    UvmCreateExternalRangeParams,
    UvmMmInitializeParams,
);
