//! Control commands nested inside `NV_ESC_RM_CONTROL`.
//!
//! The top two bytes of a command name the class, the third the category and
//! the fourth the message id, e.g. `0x800288` is class `0x0080`, category
//! `0x02` (GPU), message `0x88`.

use crate::pod::impl_pod;

/// Commands with this bit set are "legacy GSS" controls serviced by the GSP.
pub const RM_GSS_LEGACY_MASK: u32 = 0x0000_8000;

/*──────────────────────────── ctrl0000 ──────────────────────────────────*/

pub const NV0000_CTRL_CMD_CLIENT_GET_ADDR_SPACE_TYPE: u32 = 0xd01;
pub const NV0000_CTRL_CMD_CLIENT_SET_INHERITED_SHARE_POLICY: u32 = 0xd04;
pub const NV0000_CTRL_CMD_GPU_GET_ATTACHED_IDS: u32 = 0x201;
pub const NV0000_CTRL_CMD_GPU_GET_ID_INFO: u32 = 0x202;
pub const NV0000_CTRL_CMD_GPU_GET_ID_INFO_V2: u32 = 0x205;
pub const NV0000_CTRL_CMD_GPU_GET_PROBED_IDS: u32 = 0x214;
pub const NV0000_CTRL_CMD_GPU_ATTACH_IDS: u32 = 0x215;
pub const NV0000_CTRL_CMD_GPU_DETACH_IDS: u32 = 0x216;
pub const NV0000_CTRL_CMD_GPU_GET_PCI_INFO: u32 = 0x21b;
pub const NV0000_CTRL_CMD_GPU_QUERY_DRAIN_STATE: u32 = 0x279;
pub const NV0000_CTRL_CMD_GPU_GET_MEMOP_ENABLE: u32 = 0x27b;
pub const NV0000_CTRL_CMD_SYNC_GPU_BOOST_GROUP_INFO: u32 = 0xa04;
pub const NV0000_CTRL_CMD_SYSTEM_GET_BUILD_VERSION: u32 = 0x101;
pub const NV0000_CTRL_CMD_SYSTEM_GET_P2P_CAPS: u32 = 0x127;
pub const NV0000_CTRL_CMD_SYSTEM_GET_FABRIC_STATUS: u32 = 0x136;
pub const NV0000_CTRL_CMD_SYSTEM_GET_P2P_CAPS_MATRIX: u32 = 0x13a;

/*──────────────────────────── ctrl0080 ──────────────────────────────────*/

pub const NV0080_CTRL_CMD_FB_GET_CAPS_V2: u32 = 0x801307;
pub const NV0080_CTRL_CMD_FIFO_GET_CHANNELLIST: u32 = 0x80170d;
pub const NV0080_CTRL_CMD_GPU_GET_CLASSLIST: u32 = 0x800201;
pub const NV0080_CTRL_CMD_GPU_GET_NUM_SUBDEVICES: u32 = 0x800280;
pub const NV0080_CTRL_CMD_GPU_QUERY_SW_STATE_PERSISTENCE: u32 = 0x800288;
pub const NV0080_CTRL_CMD_GPU_GET_VIRTUALIZATION_MODE: u32 = 0x800289;
/// Undocumented; `paramsSize == 1`.
pub const NV0080_CTRL_CMD_UNKNOWN_80028B: u32 = 0x80028b;
pub const NV0080_CTRL_CMD_GPU_GET_CLASSLIST_V2: u32 = 0x800292;
pub const NV0080_CTRL_CMD_HOST_GET_CAPS_V2: u32 = 0x801402;

/*──────────────────────────── ctrl2080 ──────────────────────────────────*/

pub const NV2080_CTRL_CMD_BUS_GET_PCI_INFO: u32 = 0x20801801;
pub const NV2080_CTRL_CMD_BUS_GET_PCI_BAR_INFO: u32 = 0x20801803;
pub const NV2080_CTRL_CMD_BUS_GET_INFO_V2: u32 = 0x20801823;
pub const NV2080_CTRL_CMD_BUS_GET_PCIE_SUPPORTED_GPU_ATOMICS: u32 = 0x2080182a;
pub const NV2080_CTRL_CMD_CE_GET_ALL_CAPS: u32 = 0x20802a0a;
pub const NV2080_CTRL_CMD_FB_GET_INFO_V2: u32 = 0x20801303;
pub const NV2080_CTRL_CMD_FIFO_DISABLE_CHANNELS: u32 = 0x2080110b;
pub const NV2080_CTRL_CMD_GPU_GET_INFO_V2: u32 = 0x20800102;
pub const NV2080_CTRL_CMD_GPU_GET_NAME_STRING: u32 = 0x20800110;
pub const NV2080_CTRL_CMD_GPU_GET_SHORT_NAME_STRING: u32 = 0x20800111;
pub const NV2080_CTRL_CMD_GPU_GET_SIMULATION_INFO: u32 = 0x20800119;
pub const NV2080_CTRL_CMD_GPU_QUERY_ECC_STATUS: u32 = 0x2080012f;
pub const NV2080_CTRL_CMD_GPU_QUERY_COMPUTE_MODE_RULES: u32 = 0x20800131;
pub const NV2080_CTRL_CMD_GPU_ACQUIRE_COMPUTE_MODE_RESERVATION: u32 = 0x20800145;
pub const NV2080_CTRL_CMD_GPU_RELEASE_COMPUTE_MODE_RESERVATION: u32 = 0x20800146;
pub const NV2080_CTRL_CMD_GPU_GET_GID_INFO: u32 = 0x2080014a;
pub const NV2080_CTRL_CMD_GPU_GET_ENGINES_V2: u32 = 0x20800170;
pub const NV2080_CTRL_CMD_GPU_GET_ACTIVE_PARTITION_IDS: u32 = 0x2080018b;
pub const NV2080_CTRL_CMD_GPU_GET_COMPUTE_POLICY_CONFIG: u32 = 0x20800195;
pub const NV2080_CTRL_CMD_GET_GPU_FABRIC_PROBE_INFO: u32 = 0x208001a3;
pub const NV2080_CTRL_CMD_GR_GET_INFO: u32 = 0x20801201;
pub const NV2080_CTRL_CMD_GR_SET_CTXSW_PREEMPTION_MODE: u32 = 0x20801210;
pub const NV2080_CTRL_CMD_GR_GET_CTX_BUFFER_SIZE: u32 = 0x20801218;
pub const NV2080_CTRL_CMD_GR_GET_GLOBAL_SM_ORDER: u32 = 0x2080121b;
pub const NV2080_CTRL_CMD_GR_GET_CAPS_V2: u32 = 0x20801227;
pub const NV2080_CTRL_CMD_GR_GET_GPC_MASK: u32 = 0x2080122a;
pub const NV2080_CTRL_CMD_GR_GET_TPC_MASK: u32 = 0x2080122b;
pub const NV2080_CTRL_CMD_GSP_GET_FEATURES: u32 = 0x20803601;
pub const NV2080_CTRL_CMD_MC_GET_ARCH_INFO: u32 = 0x20801701;
pub const NV2080_CTRL_CMD_MC_SERVICE_INTERRUPTS: u32 = 0x20801702;
pub const NV2080_CTRL_CMD_NVLINK_GET_NVLINK_STATUS: u32 = 0x20803002;
pub const NV2080_CTRL_CMD_PERF_BOOST: u32 = 0x2080200a;
pub const NV2080_CTRL_CMD_RC_GET_WATCHDOG_INFO: u32 = 0x20802209;
pub const NV2080_CTRL_CMD_RC_RELEASE_WATCHDOG_REQUESTS: u32 = 0x2080220c;
pub const NV2080_CTRL_CMD_RC_SOFT_DISABLE_WATCHDOG: u32 = 0x20802210;
pub const NV2080_CTRL_CMD_TIMER_GET_GPU_CPU_TIME_CORRELATION_INFO: u32 = 0x20800406;

/*──────────────────────────── other classes ─────────────────────────────*/

pub const NV503C_CTRL_CMD_REGISTER_VA_SPACE: u32 = 0x503c0102;
pub const NV503C_CTRL_CMD_REGISTER_VIDMEM: u32 = 0x503c0104;
pub const NV503C_CTRL_CMD_UNREGISTER_VIDMEM: u32 = 0x503c0105;
pub const NV83DE_CTRL_CMD_DEBUG_SET_EXCEPTION_MASK: u32 = 0x83de0309;
pub const NV83DE_CTRL_CMD_DEBUG_READ_ALL_SM_ERROR_STATES: u32 = 0x83de030c;
pub const NV83DE_CTRL_CMD_DEBUG_CLEAR_ALL_SM_ERROR_STATES: u32 = 0x83de0310;
pub const NV906F_CTRL_CMD_RESET_CHANNEL: u32 = 0x906f0102;
pub const NV90E6_CTRL_CMD_MASTER_GET_VIRTUAL_FUNCTION_ERROR_CONT_INTR_MASK: u32 = 0x90e60102;
pub const NVC36F_CTRL_GET_CLASS_ENGINEID: u32 = 0xc36f0101;
pub const NVC36F_CTRL_CMD_GPFIFO_GET_WORK_SUBMIT_TOKEN: u32 = 0xc36f0108;
pub const NVA06C_CTRL_CMD_GPFIFO_SCHEDULE: u32 = 0xa06c0101;
pub const NVA06C_CTRL_CMD_SET_TIMESLICE: u32 = 0xa06c0103;
pub const NVA06C_CTRL_CMD_PREEMPT: u32 = 0xa06c0105;
/// Added in R535.
pub const NV_CONF_COMPUTE_CTRL_CMD_SYSTEM_GET_CAPABILITIES: u32 = 0xcb330101;

/*──────────────────────────── parameter blocks ──────────────────────────*/

/// `NV0000_CTRL_SYSTEM_GET_BUILD_VERSION_PARAMS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nv0000CtrlSystemGetBuildVersionParams {
    pub size_of_strings: u32,
    pub pad: [u8; 4],
    pub p_driver_version_buffer: u64,
    pub p_version_buffer: u64,
    pub p_title_buffer: u64,
    pub changelist_number: u32,
    pub official_changelist_number: u32,
}

/// `NV0080_CTRL_FIFO_GET_CHANNELLIST_PARAMS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nv0080CtrlFifoGetChannelListParams {
    pub num_channels: u32,
    pub pad: [u8; 4],
    pub p_channel_handle_list: u64,
    pub p_channel_list: u64,
}

pub const NV2080_CTRL_FIFO_DISABLE_CHANNELS_MAX_ENTRIES: usize = 64;

/// `NV2080_CTRL_FIFO_DISABLE_CHANNELS_PARAMS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Nv2080CtrlFifoDisableChannelsParams {
    pub b_disable: u8,
    pub pad1: [u8; 3],
    pub num_channels: u32,
    pub b_only_disable_scheduling: u8,
    pub b_rewind_gp_put: u8,
    pub pad2: [u8; 6],
    pub p_runlist_preempt_event: u64,
    pub h_client_list: [u32; NV2080_CTRL_FIFO_DISABLE_CHANNELS_MAX_ENTRIES],
    pub h_channel_list: [u32; NV2080_CTRL_FIFO_DISABLE_CHANNELS_MAX_ENTRIES],
}

impl Default for Nv2080CtrlFifoDisableChannelsParams {
    fn default() -> Self {
        Self {
            b_disable: 0,
            pad1: [0; 3],
            num_channels: 0,
            b_only_disable_scheduling: 0,
            b_rewind_gp_put: 0,
            pad2: [0; 6],
            p_runlist_preempt_event: 0,
            h_client_list: [0; NV2080_CTRL_FIFO_DISABLE_CHANNELS_MAX_ENTRIES],
            h_channel_list: [0; NV2080_CTRL_FIFO_DISABLE_CHANNELS_MAX_ENTRIES],
        }
    }
}

pub const NV2080_CTRL_GR_INFO_MAX_SIZE: u32 = 0x3a;

/// `NVXXXX_CTRL_XXX_ROUTE_INFO`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct NvxxxxCtrlXxxRouteInfo {
    pub flags: u32,
    pub pad: [u8; 4],
    pub route: u64,
}

/// `NVXXXX_CTRL_XXX_INFO`, one element of a GR info list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct NvxxxxCtrlXxxInfo {
    pub index: u32,
    pub data: u32,
}

/// `NV2080_CTRL_GR_GET_INFO_PARAMS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Nv2080CtrlGrGetInfoParams {
    pub gr_info_list_size: u32,
    pub pad: [u8; 4],
    pub gr_info_list: u64,
    pub gr_route_info: NvxxxxCtrlXxxRouteInfo,
}

impl_pod!(
    Nv0000CtrlSystemGetBuildVersionParams,
    Nv0080CtrlFifoGetChannelListParams,
    Nv2080CtrlFifoDisableChannelsParams,
    NvxxxxCtrlXxxRouteInfo,
    NvxxxxCtrlXxxInfo,
    Nv2080CtrlGrGetInfoParams,
);
