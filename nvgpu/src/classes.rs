//! Object classes allocated through `NV_ESC_RM_ALLOC` (`hClass`), and the
//! allocation parameter block each one expects behind `pAllocParms`.

use crate::pod::impl_pod;
use crate::Handle;

pub const NV01_ROOT: u32 = 0x0000_0000;
pub const NV01_ROOT_NON_PRIV: u32 = 0x0000_0001;
pub const NV01_MEMORY_SYSTEM_OS_DESCRIPTOR: u32 = 0x0000_003e;
pub const NV01_ROOT_CLIENT: u32 = 0x0000_0041;
pub const NV01_EVENT_OS_EVENT: u32 = 0x0000_0079;
pub const NV01_DEVICE_0: u32 = 0x0000_0080;
pub const NV_MEMORY_FABRIC: u32 = 0x0000_00f8;
pub const NV20_SUBDEVICE_0: u32 = 0x0000_2080;
pub const NV50_THIRD_PARTY_P2P: u32 = 0x0000_503c;
pub const GT200_DEBUGGER: u32 = 0x0000_83de;
pub const FERMI_CONTEXT_SHARE_A: u32 = 0x0000_9067;
pub const GF100_SUBDEVICE_MASTER: u32 = 0x0000_90e6;
pub const FERMI_VASPACE_A: u32 = 0x0000_90f1;
pub const KEPLER_CHANNEL_GROUP_A: u32 = 0x0000_a06c;
pub const TURING_USERMODE_A: u32 = 0x0000_c461;
pub const TURING_CHANNEL_GPFIFO_A: u32 = 0x0000_c46f;
pub const TURING_DMA_COPY_A: u32 = 0x0000_c5b5;
pub const TURING_COMPUTE_A: u32 = 0x0000_c5c0;
pub const AMPERE_CHANNEL_GPFIFO_A: u32 = 0x0000_c56f;
pub const HOPPER_USERMODE_A: u32 = 0x0000_c661;
pub const AMPERE_DMA_COPY_A: u32 = 0x0000_c6b5;
pub const AMPERE_COMPUTE_A: u32 = 0x0000_c6c0;
pub const AMPERE_DMA_COPY_B: u32 = 0x0000_c7b5;
pub const AMPERE_COMPUTE_B: u32 = 0x0000_c7c0;
pub const HOPPER_DMA_COPY_A: u32 = 0x0000_c8b5;
pub const ADA_COMPUTE_A: u32 = 0x0000_c9c0;
/// Added in R535.
pub const NV_CONFIDENTIAL_COMPUTE: u32 = 0x0000_cb33;
pub const HOPPER_COMPUTE_A: u32 = 0x0000_cbc0;

/// `NV0005_ALLOC_PARAMETERS` (`NV01_EVENT_OS_EVENT`); `data` carries the
/// client's event fd.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nv0005AllocParameters {
    pub h_parent_client: Handle,
    pub h_src_resource: Handle,
    pub h_class: u32,
    pub notify_index: u32,
    pub data: u64,
}

/// `NV0080_ALLOC_PARAMETERS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nv0080AllocParameters {
    pub device_id: u32,
    pub h_client_share: Handle,
    pub h_target_client: Handle,
    pub h_target_device: Handle,
    pub flags: u32,
    pub pad0: [u8; 4],
    pub va_space_size: u64,
    pub va_start_internal: u64,
    pub va_limit_internal: u64,
    pub va_mode: u32,
    pub pad1: [u8; 4],
}

/// `NV2080_ALLOC_PARAMETERS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nv2080AllocParameters {
    pub sub_device_id: u32,
}

/// `NV503C_ALLOC_PARAMETERS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nv503cAllocParameters {
    pub flags: u32,
}

/// `NV83DE_ALLOC_PARAMETERS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nv83deAllocParameters {
    pub h_debugger_client_obsolete: Handle,
    pub h_app_client: Handle,
    pub h_class_3d_object: Handle,
}

/// `NV_CTXSHARE_ALLOCATION_PARAMETERS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct NvCtxshareAllocationParameters {
    pub h_va_space: Handle,
    pub flags: u32,
    pub subctx_id: u32,
}

/// `NV_VASPACE_ALLOCATION_PARAMETERS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct NvVaspaceAllocationParameters {
    pub index: u32,
    pub flags: u32,
    pub va_size: u64,
    pub va_start_internal: u64,
    pub va_limit_internal: u64,
    pub big_page_size: u32,
    pub pad0: [u8; 4],
    pub va_base: u64,
}

/// `NV_CHANNEL_GROUP_ALLOCATION_PARAMETERS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct NvChannelGroupAllocationParameters {
    pub h_object_error: Handle,
    pub h_object_ecc_error: Handle,
    pub h_va_space: Handle,
    pub engine_type: u32,
    pub b_is_calling_context_vgpu_plugin: u8,
    pub pad0: [u8; 3],
}

/// `NV_MEMORY_DESC_PARAMS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct NvMemoryDescParams {
    pub base: u64,
    pub size: u64,
    pub address_space: u32,
    pub cache_attrib: u32,
}

pub const NV_MAX_SUBDEVICES: usize = 8;

/// `NV_CHANNEL_ALLOC_PARAMS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct NvChannelAllocParams {
    pub h_object_error: Handle,
    pub h_object_buffer: Handle,
    pub gp_fifo_offset: u64,
    pub gp_fifo_entries: u32,
    pub flags: u32,
    pub h_context_share: Handle,
    pub h_va_space: Handle,
    pub h_userd_memory: [Handle; NV_MAX_SUBDEVICES],
    pub userd_offset: [u64; NV_MAX_SUBDEVICES],
    pub engine_type: u32,
    pub cid: u32,
    pub sub_device_id: u32,
    pub h_object_ecc_error: Handle,
    pub instance_mem: NvMemoryDescParams,
    pub userd_mem: NvMemoryDescParams,
    pub ramfc_mem: NvMemoryDescParams,
    pub mthdbuf_mem: NvMemoryDescParams,
    pub h_phys_channel_group: Handle,
    pub internal_flags: u32,
    pub error_notifier_mem: NvMemoryDescParams,
    pub ecc_error_notifier_mem: NvMemoryDescParams,
    pub process_id: u32,
    pub sub_process_id: u32,
}

/// `NVB0B5_ALLOCATION_PARAMETERS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nvb0b5AllocationParameters {
    pub version: u32,
    pub engine_type: u32,
}

/// `NV_GR_ALLOCATION_PARAMETERS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct NvGrAllocationParameters {
    pub version: u32,
    pub flags: u32,
    pub size: u32,
    pub caps: u32,
}

/// `NV_HOPPER_USERMODE_A_PARAMS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct NvHopperUsermodeAParams {
    pub b_bar1_mapping: u8,
    pub b_priv: u8,
}

/// `NV00F8_ALLOCATION_PARAMETERS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nv00f8AllocationParameters {
    pub alignment: u64,
    pub alloc_size: u64,
    pub page_size: u32,
    pub alloc_flags: u32,
    pub map_offset: u64,
    pub h_vid_mem: Handle,
    pub map_flags: u32,
}

/// `NV_CONFIDENTIAL_COMPUTE_ALLOC_PARAMS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct NvConfidentialComputeAllocParams {
    pub h_client: Handle,
}

impl_pod!(
    Nv0005AllocParameters,
    Nv0080AllocParameters,
    Nv2080AllocParameters,
    Nv503cAllocParameters,
    Nv83deAllocParameters,
    NvCtxshareAllocationParameters,
    NvVaspaceAllocationParameters,
    NvChannelGroupAllocationParameters,
    NvMemoryDescParams,
    NvChannelAllocParams,
    Nvb0b5AllocationParameters,
    NvGrAllocationParameters,
    NvHopperUsermodeAParams,
    Nv00f8AllocationParameters,
    NvConfidentialComputeAllocParams,
);
