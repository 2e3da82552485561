//! The maintained diff sequence. New releases are appended at the end; the
//! base moves with the support window.

use nvgpu::classes::*;
use nvgpu::ctrl::*;
use nvgpu::frontend::*;
use nvgpu::uvm::*;
use nvgpu::Handle;

use super::VersionDiff;
use crate::dispatch::*;
use crate::table::TableOverlay;
use crate::version::DriverVersion;

/// Earliest supported release. Its diff is a complete table.
pub const BASE_VERSION: DriverVersion = DriverVersion::new(525, 60, 13);

pub(super) fn diffs() -> Vec<VersionDiff> {
    vec![base(), r535_43_02()]
}

fn base() -> VersionDiff {
    VersionDiff {
        version: BASE_VERSION,
        handlers: TableOverlay::new()
            .frontend(&[
                (NV_ESC_CARD_INFO, handler!(frontend_ioctl_simple)),                     // nv_ioctl_card_info_t
                (NV_ESC_CHECK_VERSION_STR, handler!(frontend_ioctl_simple)),             // nv_rm_api_version_t
                (NV_ESC_SYS_PARAMS, handler!(frontend_ioctl_simple)),                    // nv_ioctl_sys_params_t
                (NV_ESC_RM_DUP_OBJECT, handler!(frontend_ioctl_simple)),                 // NVOS55_PARAMETERS
                (NV_ESC_RM_SHARE, handler!(frontend_ioctl_simple)),                      // NVOS57_PARAMETERS
                (NV_ESC_RM_UNMAP_MEMORY, handler!(frontend_ioctl_simple)),               // NVOS34_PARAMETERS
                (NV_ESC_RM_UPDATE_DEVICE_MAPPING_INFO, handler!(frontend_ioctl_simple)), // NVOS56_PARAMETERS
                (NV_ESC_REGISTER_FD, handler!(frontend_register_fd)),
                (NV_ESC_ALLOC_OS_EVENT, handler!(rm_alloc_os_event)),
                (NV_ESC_FREE_OS_EVENT, handler!(rm_free_os_event)),
                (NV_ESC_NUMA_INFO, handler!(rm_numa_info)),
                (NV_ESC_RM_ALLOC_MEMORY, handler!(rm_alloc_memory)),
                (NV_ESC_RM_FREE, handler!(rm_free)),
                (NV_ESC_RM_CONTROL, handler!(rm_control)),
                (NV_ESC_RM_ALLOC, handler!(rm_alloc::<R525>)),
                (NV_ESC_RM_VID_HEAP_CONTROL, handler!(rm_vid_heap_control)),
                (NV_ESC_RM_MAP_MEMORY, handler!(rm_map_memory)),
            ])
            .uvm(&[
                (UVM_INITIALIZE, handler!(uvm_initialize)),
                (UVM_DEINITIALIZE, handler!(uvm_ioctl_no_params)),
                (UVM_CREATE_RANGE_GROUP, handler!(uvm_ioctl_simple::<UvmCreateRangeGroupParams>)),
                (UVM_DESTROY_RANGE_GROUP, handler!(uvm_ioctl_simple::<UvmDestroyRangeGroupParams>)),
                (UVM_REGISTER_GPU_VASPACE, handler!(uvm_ioctl_has_rm_ctrl_fd::<UvmRegisterGpuVaspaceParams>)),
                (UVM_UNREGISTER_GPU_VASPACE, handler!(uvm_ioctl_simple::<UvmUnregisterGpuVaspaceParams>)),
                (UVM_REGISTER_CHANNEL, handler!(uvm_ioctl_has_rm_ctrl_fd::<UvmRegisterChannelParams>)),
                (UVM_UNREGISTER_CHANNEL, handler!(uvm_ioctl_simple::<UvmUnregisterChannelParams>)),
                (UVM_MAP_EXTERNAL_ALLOCATION, handler!(uvm_ioctl_has_rm_ctrl_fd::<UvmMapExternalAllocationParams>)),
                (UVM_FREE, handler!(uvm_ioctl_simple::<UvmFreeParams>)),
                (UVM_REGISTER_GPU, handler!(uvm_ioctl_has_rm_ctrl_fd::<UvmRegisterGpuParams>)),
                (UVM_UNREGISTER_GPU, handler!(uvm_ioctl_simple::<UvmUnregisterGpuParams>)),
                (UVM_PAGEABLE_MEM_ACCESS, handler!(uvm_ioctl_simple::<UvmPageableMemAccessParams>)),
                (UVM_MAP_DYNAMIC_PARALLELISM_REGION, handler!(uvm_ioctl_simple::<UvmMapDynamicParallelismRegionParams>)),
                (UVM_ALLOC_SEMAPHORE_POOL, handler!(uvm_ioctl_simple::<UvmAllocSemaphorePoolParams>)),
                (UVM_VALIDATE_VA_RANGE, handler!(uvm_ioctl_simple::<UvmValidateVaRangeParams>)),
                (UVM_CREATE_EXTERNAL_RANGE, handler!(uvm_ioctl_simple::<UvmCreateExternalRangeParams>)),
            ])
            .control_cmd(&[
                (NV0000_CTRL_CMD_CLIENT_GET_ADDR_SPACE_TYPE, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_CLIENT_SET_INHERITED_SHARE_POLICY, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_GPU_GET_ATTACHED_IDS, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_GPU_GET_ID_INFO, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_GPU_GET_ID_INFO_V2, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_GPU_GET_PROBED_IDS, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_GPU_ATTACH_IDS, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_GPU_DETACH_IDS, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_GPU_GET_PCI_INFO, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_GPU_QUERY_DRAIN_STATE, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_GPU_GET_MEMOP_ENABLE, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_SYNC_GPU_BOOST_GROUP_INFO, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_SYSTEM_GET_P2P_CAPS, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_SYSTEM_GET_FABRIC_STATUS, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_SYSTEM_GET_P2P_CAPS_MATRIX, handler!(rm_control_simple)),
                (NV0080_CTRL_CMD_FB_GET_CAPS_V2, handler!(rm_control_simple)),
                (NV0080_CTRL_CMD_GPU_GET_NUM_SUBDEVICES, handler!(rm_control_simple)),
                (NV0080_CTRL_CMD_GPU_QUERY_SW_STATE_PERSISTENCE, handler!(rm_control_simple)),
                (NV0080_CTRL_CMD_GPU_GET_VIRTUALIZATION_MODE, handler!(rm_control_simple)),
                (NV0080_CTRL_CMD_UNKNOWN_80028B, handler!(rm_control_simple)),
                (NV0080_CTRL_CMD_GPU_GET_CLASSLIST_V2, handler!(rm_control_simple)),
                (NV0080_CTRL_CMD_HOST_GET_CAPS_V2, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_BUS_GET_PCI_INFO, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_BUS_GET_PCI_BAR_INFO, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_BUS_GET_INFO_V2, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_BUS_GET_PCIE_SUPPORTED_GPU_ATOMICS, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_CE_GET_ALL_CAPS, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_FB_GET_INFO_V2, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_GET_INFO_V2, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_GET_NAME_STRING, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_GET_SHORT_NAME_STRING, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_GET_SIMULATION_INFO, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_QUERY_ECC_STATUS, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_QUERY_COMPUTE_MODE_RULES, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_ACQUIRE_COMPUTE_MODE_RESERVATION, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_RELEASE_COMPUTE_MODE_RESERVATION, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_GET_GID_INFO, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_GET_ENGINES_V2, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_GET_ACTIVE_PARTITION_IDS, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GPU_GET_COMPUTE_POLICY_CONFIG, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GET_GPU_FABRIC_PROBE_INFO, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GR_SET_CTXSW_PREEMPTION_MODE, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GR_GET_CTX_BUFFER_SIZE, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GR_GET_GLOBAL_SM_ORDER, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GR_GET_CAPS_V2, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GR_GET_GPC_MASK, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GR_GET_TPC_MASK, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_GSP_GET_FEATURES, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_MC_GET_ARCH_INFO, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_MC_SERVICE_INTERRUPTS, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_NVLINK_GET_NVLINK_STATUS, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_PERF_BOOST, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_RC_GET_WATCHDOG_INFO, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_RC_RELEASE_WATCHDOG_REQUESTS, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_RC_SOFT_DISABLE_WATCHDOG, handler!(rm_control_simple)),
                (NV2080_CTRL_CMD_TIMER_GET_GPU_CPU_TIME_CORRELATION_INFO, handler!(rm_control_simple)),
                (NV503C_CTRL_CMD_REGISTER_VA_SPACE, handler!(rm_control_simple)),
                (NV503C_CTRL_CMD_REGISTER_VIDMEM, handler!(rm_control_simple)),
                (NV503C_CTRL_CMD_UNREGISTER_VIDMEM, handler!(rm_control_simple)),
                (NV83DE_CTRL_CMD_DEBUG_SET_EXCEPTION_MASK, handler!(rm_control_simple)),
                (NV83DE_CTRL_CMD_DEBUG_READ_ALL_SM_ERROR_STATES, handler!(rm_control_simple)),
                (NV83DE_CTRL_CMD_DEBUG_CLEAR_ALL_SM_ERROR_STATES, handler!(rm_control_simple)),
                (NV906F_CTRL_CMD_RESET_CHANNEL, handler!(rm_control_simple)),
                (NV90E6_CTRL_CMD_MASTER_GET_VIRTUAL_FUNCTION_ERROR_CONT_INTR_MASK, handler!(rm_control_simple)),
                (NVC36F_CTRL_GET_CLASS_ENGINEID, handler!(rm_control_simple)),
                (NVC36F_CTRL_CMD_GPFIFO_GET_WORK_SUBMIT_TOKEN, handler!(rm_control_simple)),
                (NVA06C_CTRL_CMD_GPFIFO_SCHEDULE, handler!(rm_control_simple)),
                (NVA06C_CTRL_CMD_SET_TIMESLICE, handler!(rm_control_simple)),
                (NVA06C_CTRL_CMD_PREEMPT, handler!(rm_control_simple)),
                (NV0000_CTRL_CMD_SYSTEM_GET_BUILD_VERSION, handler!(ctrl_client_system_get_build_version)),
                (NV0080_CTRL_CMD_FIFO_GET_CHANNELLIST, handler!(ctrl_dev_fifo_get_channel_list)),
                (NV2080_CTRL_CMD_FIFO_DISABLE_CHANNELS, handler!(ctrl_subdev_fifo_disable_channels)),
                (NV2080_CTRL_CMD_GR_GET_INFO, handler!(ctrl_subdev_gr_get_info)),
            ])
            .allocation_class(&[
                (NV01_ROOT, handler!(rm_alloc_simple::<Handle>)),
                (NV01_ROOT_NON_PRIV, handler!(rm_alloc_simple::<Handle>)),
                (NV01_ROOT_CLIENT, handler!(rm_alloc_simple::<Handle>)),
                (NV01_EVENT_OS_EVENT, handler!(rm_alloc_event_os_event)),
                (NV01_DEVICE_0, handler!(rm_alloc_simple::<Nv0080AllocParameters>)),
                (NV20_SUBDEVICE_0, handler!(rm_alloc_simple::<Nv2080AllocParameters>)),
                (NV50_THIRD_PARTY_P2P, handler!(rm_alloc_simple::<Nv503cAllocParameters>)),
                (GT200_DEBUGGER, handler!(rm_alloc_simple::<Nv83deAllocParameters>)),
                (FERMI_CONTEXT_SHARE_A, handler!(rm_alloc_simple::<NvCtxshareAllocationParameters>)),
                (FERMI_VASPACE_A, handler!(rm_alloc_simple::<NvVaspaceAllocationParameters>)),
                (KEPLER_CHANNEL_GROUP_A, handler!(rm_alloc_simple::<NvChannelGroupAllocationParameters>)),
                (TURING_CHANNEL_GPFIFO_A, handler!(rm_alloc_simple::<NvChannelAllocParams>)),
                (AMPERE_CHANNEL_GPFIFO_A, handler!(rm_alloc_simple::<NvChannelAllocParams>)),
                (TURING_DMA_COPY_A, handler!(rm_alloc_simple::<Nvb0b5AllocationParameters>)),
                (AMPERE_DMA_COPY_A, handler!(rm_alloc_simple::<Nvb0b5AllocationParameters>)),
                (AMPERE_DMA_COPY_B, handler!(rm_alloc_simple::<Nvb0b5AllocationParameters>)),
                (HOPPER_DMA_COPY_A, handler!(rm_alloc_simple::<Nvb0b5AllocationParameters>)),
                (TURING_COMPUTE_A, handler!(rm_alloc_simple::<NvGrAllocationParameters>)),
                (AMPERE_COMPUTE_A, handler!(rm_alloc_simple::<NvGrAllocationParameters>)),
                (AMPERE_COMPUTE_B, handler!(rm_alloc_simple::<NvGrAllocationParameters>)),
                (ADA_COMPUTE_A, handler!(rm_alloc_simple::<NvGrAllocationParameters>)),
                (HOPPER_COMPUTE_A, handler!(rm_alloc_simple::<NvGrAllocationParameters>)),
                (HOPPER_USERMODE_A, handler!(rm_alloc_simple::<NvHopperUsermodeAParams>)),
                (GF100_SUBDEVICE_MASTER, handler!(rm_alloc_no_params)),
                (TURING_USERMODE_A, handler!(rm_alloc_no_params)),
                (NV_MEMORY_FABRIC, handler!(rm_alloc_simple::<Nv00f8AllocationParameters>)),
            ]),
    }
}

fn r535_43_02() -> VersionDiff {
    VersionDiff {
        version: DriverVersion::new(535, 43, 2),
        handlers: TableOverlay::new()
            .frontend(&[(NV_ESC_RM_ALLOC, handler!(rm_alloc::<R535>))])
            .uvm(&[(UVM_MM_INITIALIZE, handler!(uvm_mm_initialize))])
            .control_cmd(&[(NV_CONF_COMPUTE_CTRL_CMD_SYSTEM_GET_CAPABILITIES, handler!(rm_control_simple))])
            .allocation_class(&[(
                NV_CONFIDENTIAL_COMPUTE,
                handler!(rm_alloc_simple::<NvConfidentialComputeAllocParams>),
            )]),
    }
}
