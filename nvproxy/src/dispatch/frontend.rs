use log::Level;
use nvgpu::classes::NV01_MEMORY_SYSTEM_OS_DESCRIPTOR;
use nvgpu::frontend::{
    IoctlAllocOsEvent, IoctlFreeOsEvent, IoctlNvos02ParametersWithFd, IoctlNvos33ParametersWithFd,
    IoctlRegisterFd, Nvos00Parameters, Nvos32Parameters, NVOS32_FUNCTION_ALLOC_SIZE,
};

use super::{exact_params, invalid, write_reply, FrontendIoctlState, IoctlResult};

/// Forwards a request whose payload carries no pointers or fds.
pub fn frontend_ioctl_simple(fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    fi.invoke()
}

/// The host's CPU topology differs from the one presented to the guest, so
/// this is always refused. Callers treat the failure as non-fatal.
pub fn rm_numa_info(_fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    nvproxy_log!(Level::Debug, "dispatch", "Ignoring NV_ESC_NUMA_INFO");
    Err(invalid("NUMA info is not exposed"))
}

pub fn frontend_register_fd(fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    let params: IoctlRegisterFd = exact_params(fi.payload)?;
    let ctl_fd = fi
        .driver()
        .translate_fd(params.ctl_fd)
        .ok_or_else(|| invalid("ctl_fd is not a driver fd"))?;
    let mut host = IoctlRegisterFd { ctl_fd };
    let n = fi.invoke_with(&mut host)?;
    write_reply(fi.payload, &params)?;
    Ok(n)
}

pub fn rm_alloc_os_event(fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    let params: IoctlAllocOsEvent = exact_params(fi.payload)?;
    let fd = fi
        .driver()
        .translate_fd(params.fd as i32)
        .ok_or_else(|| invalid("event fd is not a driver fd"))?;
    let mut host = IoctlAllocOsEvent { fd: fd as u32, ..params };
    let n = fi.invoke_with(&mut host)?;
    write_reply(fi.payload, &IoctlAllocOsEvent { fd: params.fd, ..host })?;
    Ok(n)
}

pub fn rm_free_os_event(fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    let params: IoctlFreeOsEvent = exact_params(fi.payload)?;
    let fd = fi
        .driver()
        .translate_fd(params.fd as i32)
        .ok_or_else(|| invalid("event fd is not a driver fd"))?;
    let mut host = IoctlFreeOsEvent { fd: fd as u32, ..params };
    let n = fi.invoke_with(&mut host)?;
    write_reply(fi.payload, &IoctlFreeOsEvent { fd: params.fd, ..host })?;
    Ok(n)
}

/// Only OS-descriptor memory can be allocated through this escape.
pub fn rm_alloc_memory(fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    let params: IoctlNvos02ParametersWithFd = exact_params(fi.payload)?;
    if params.params.h_class != NV01_MEMORY_SYSTEM_OS_DESCRIPTOR {
        nvproxy_log!(Level::Warn, "dispatch", "Unsupported NV_ESC_RM_ALLOC_MEMORY class {:#x}", params.params.h_class);
        return Err(invalid("unsupported memory class"));
    }
    let fd = fi
        .driver()
        .translate_fd(params.fd)
        .ok_or_else(|| invalid("fd is not a driver fd"))?;
    let mut host = IoctlNvos02ParametersWithFd { fd, ..params };
    let n = fi.invoke_with(&mut host)?;
    write_reply(fi.payload, &IoctlNvos02ParametersWithFd { fd: params.fd, ..host })?;
    Ok(n)
}

pub fn rm_free(fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    exact_params::<Nvos00Parameters>(fi.payload)?;
    fi.invoke()
}

pub fn rm_vid_heap_control(fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    // `function` selects the shape of `data`.
    let params: Nvos32Parameters = exact_params(fi.payload)?;
    if params.function != NVOS32_FUNCTION_ALLOC_SIZE {
        nvproxy_log!(Level::Warn, "dispatch", "Unknown VID_HEAP_CONTROL function {}", params.function);
        return Err(invalid("unsupported VID_HEAP_CONTROL function"));
    }
    fi.invoke()
}

pub fn rm_map_memory(fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    let params: IoctlNvos33ParametersWithFd = exact_params(fi.payload)?;
    let fd = fi
        .driver()
        .translate_fd(params.fd)
        .ok_or_else(|| invalid("fd is not a driver fd"))?;
    let mut host = IoctlNvos33ParametersWithFd { fd, ..params };
    let n = fi.invoke_with(&mut host)?;
    write_reply(fi.payload, &IoctlNvos33ParametersWithFd { fd: params.fd, ..host })?;
    Ok(n)
}
