//! `NV_ESC_RM_CONTROL` and the control commands nested under it.
//!
//! The driver never sees guest pointers: every nested block, and any list
//! or string buffer it points at, is copied into proxy memory, forwarded,
//! and copied back out with the guest's pointers restored.

use log::Level;
use nvgpu::ctrl::{
    Nv0000CtrlSystemGetBuildVersionParams, Nv0080CtrlFifoGetChannelListParams,
    Nv2080CtrlFifoDisableChannelsParams, Nv2080CtrlGrGetInfoParams, NvxxxxCtrlXxxInfo,
    NV2080_CTRL_GR_INFO_MAX_SIZE,
};
use nvgpu::frontend::Nvos54Parameters;
use nvgpu::Pod;
use std::mem::{offset_of, size_of};

use super::{
    copy_in_params, copy_out_params, exact_params, invalid, FrontendIoctlState, IoctlError,
    IoctlResult,
};
use crate::table::IoctlClass;

const PARAMS_OFFSET: usize = offset_of!(Nvos54Parameters, params);

/// Second-level lookup: `cmd` selects the control-command handler. Legacy
/// GSS commands get no special treatment and must be listed like any other.
pub fn rm_control(fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    let params: Nvos54Parameters = exact_params(fi.payload)?;
    nvproxy_log!(Level::Trace, "dispatch", "Control command {:#x} (params_size={})", params.cmd, params.params_size);
    let proxy = fi.proxy;
    let handler = proxy.select(IoctlClass::ControlCommand, params.cmd, &proxy.table.control_cmd)?;
    (handler.func())(fi, &params)
}

pub fn rm_control_simple(fi: &mut FrontendIoctlState<'_>, params: &Nvos54Parameters) -> IoctlResult {
    if params.params_size == 0 {
        if params.params != 0 {
            return Err(invalid("params set with zero params_size"));
        }
        return fi.invoke();
    }
    if params.params == 0 {
        return Err(invalid("null params with non-zero params_size"));
    }
    let mut buf = vec![0u8; params.params_size as usize];
    fi.driver().copy_in(params.params, &mut buf).map_err(IoctlError::Host)?;
    let n = fi.invoke_nested_bytes(PARAMS_OFFSET, &mut buf)?;
    fi.driver().copy_out(params.params, &buf).map_err(IoctlError::Host)?;
    Ok(n)
}

/// Reads the nested block after checking `params_size` names exactly a `P`.
fn ctrl_params<P: Pod>(fi: &FrontendIoctlState<'_>, params: &Nvos54Parameters) -> Result<P, IoctlError> {
    if params.params_size as usize != size_of::<P>() || params.params == 0 {
        return Err(invalid("control params do not match command"));
    }
    copy_in_params(fi.driver(), params.params)
}

/// Forward a host copy of `ctrl` and write the reply back to the guest.
fn invoke_ctrl<P: Pod>(fi: &mut FrontendIoctlState<'_>, params: &Nvos54Parameters, mut ctrl: P) -> IoctlResult {
    let n = fi.invoke_nested(PARAMS_OFFSET, &mut ctrl)?;
    copy_out_params(fi.driver(), params.params, &ctrl)?;
    Ok(n)
}

fn guest_list(fi: &FrontendIoctlState<'_>, addr: u64, len: usize) -> Result<Vec<u8>, IoctlError> {
    let mut buf = vec![0u8; len];
    fi.driver().copy_in(addr, &mut buf).map_err(IoctlError::Host)?;
    Ok(buf)
}

pub fn ctrl_client_system_get_build_version(
    fi: &mut FrontendIoctlState<'_>,
    params: &Nvos54Parameters,
) -> IoctlResult {
    let ctrl: Nv0000CtrlSystemGetBuildVersionParams = ctrl_params(fi, params)?;
    // No strings are written if any buffer is null.
    if ctrl.p_driver_version_buffer == 0 || ctrl.p_version_buffer == 0 || ctrl.p_title_buffer == 0 {
        return invoke_ctrl(fi, params, ctrl);
    }
    if ctrl.size_of_strings == 0 {
        return Err(invalid("string buffers with zero size_of_strings"));
    }

    let len = ctrl.size_of_strings as usize;
    let mut driver_version = vec![0u8; len];
    let mut version = vec![0u8; len];
    let mut title = vec![0u8; len];
    let mut host = Nv0000CtrlSystemGetBuildVersionParams {
        p_driver_version_buffer: driver_version.as_mut_ptr() as u64,
        p_version_buffer: version.as_mut_ptr() as u64,
        p_title_buffer: title.as_mut_ptr() as u64,
        ..ctrl
    };
    let n = fi.invoke_nested(PARAMS_OFFSET, &mut host)?;

    let driver = fi.driver();
    driver.copy_out(ctrl.p_driver_version_buffer, &driver_version).map_err(IoctlError::Host)?;
    driver.copy_out(ctrl.p_version_buffer, &version).map_err(IoctlError::Host)?;
    driver.copy_out(ctrl.p_title_buffer, &title).map_err(IoctlError::Host)?;
    let out = Nv0000CtrlSystemGetBuildVersionParams {
        p_driver_version_buffer: ctrl.p_driver_version_buffer,
        p_version_buffer: ctrl.p_version_buffer,
        p_title_buffer: ctrl.p_title_buffer,
        ..host
    };
    copy_out_params(driver, params.params, &out)?;
    Ok(n)
}

pub fn ctrl_dev_fifo_get_channel_list(
    fi: &mut FrontendIoctlState<'_>,
    params: &Nvos54Parameters,
) -> IoctlResult {
    let ctrl: Nv0080CtrlFifoGetChannelListParams = ctrl_params(fi, params)?;
    if ctrl.num_channels == 0 {
        return invoke_ctrl(fi, params, ctrl);
    }
    if ctrl.p_channel_handle_list == 0 || ctrl.p_channel_list == 0 {
        return Err(invalid("null channel list"));
    }

    let len = ctrl.num_channels as usize * size_of::<u32>();
    let mut handles = guest_list(fi, ctrl.p_channel_handle_list, len)?;
    let mut channels = vec![0u8; len];
    let mut host = Nv0080CtrlFifoGetChannelListParams {
        p_channel_handle_list: handles.as_mut_ptr() as u64,
        p_channel_list: channels.as_mut_ptr() as u64,
        ..ctrl
    };
    let n = fi.invoke_nested(PARAMS_OFFSET, &mut host)?;

    fi.driver().copy_out(ctrl.p_channel_list, &channels).map_err(IoctlError::Host)?;
    let out = Nv0080CtrlFifoGetChannelListParams {
        p_channel_handle_list: ctrl.p_channel_handle_list,
        p_channel_list: ctrl.p_channel_list,
        ..host
    };
    copy_out_params(fi.driver(), params.params, &out)?;
    Ok(n)
}

pub fn ctrl_subdev_fifo_disable_channels(
    fi: &mut FrontendIoctlState<'_>,
    params: &Nvos54Parameters,
) -> IoctlResult {
    let ctrl: Nv2080CtrlFifoDisableChannelsParams = ctrl_params(fi, params)?;
    // Must be null; it is never translated.
    if ctrl.p_runlist_preempt_event != 0 {
        return Err(invalid("runlist preempt event must be null"));
    }
    invoke_ctrl(fi, params, ctrl)
}

pub fn ctrl_subdev_gr_get_info(fi: &mut FrontendIoctlState<'_>, params: &Nvos54Parameters) -> IoctlResult {
    let ctrl: Nv2080CtrlGrGetInfoParams = ctrl_params(fi, params)?;
    if ctrl.gr_info_list_size > NV2080_CTRL_GR_INFO_MAX_SIZE {
        return Err(invalid("gr info list too large"));
    }
    if ctrl.gr_info_list_size == 0 {
        return invoke_ctrl(fi, params, ctrl);
    }
    if ctrl.gr_info_list == 0 {
        return Err(invalid("null gr info list"));
    }

    let len = ctrl.gr_info_list_size as usize * size_of::<NvxxxxCtrlXxxInfo>();
    let mut list = guest_list(fi, ctrl.gr_info_list, len)?;
    let mut host = Nv2080CtrlGrGetInfoParams { gr_info_list: list.as_mut_ptr() as u64, ..ctrl };
    let n = fi.invoke_nested(PARAMS_OFFSET, &mut host)?;

    fi.driver().copy_out(ctrl.gr_info_list, &list).map_err(IoctlError::Host)?;
    copy_out_params(fi.driver(), params.params, &Nv2080CtrlGrGetInfoParams { gr_info_list: ctrl.gr_info_list, ..host })?;
    Ok(n)
}
