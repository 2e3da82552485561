use nvgpu::uvm::{HasRmCtrlFd, UvmInitializeParams, UvmMmInitializeParams};
use nvgpu::Pod;

use super::{exact_params, invalid, write_reply, IoctlResult, UvmIoctlState};

pub fn uvm_initialize(ui: &mut UvmIoctlState<'_>) -> IoctlResult {
    let mut params: UvmInitializeParams = exact_params(ui.payload)?;
    ui.invoke_with(&mut params)
}

pub fn uvm_ioctl_no_params(ui: &mut UvmIoctlState<'_>) -> IoctlResult {
    ui.invoke()
}

/// Forwards a request whose `P` carries no pointers or fds.
pub fn uvm_ioctl_simple<P: Pod>(ui: &mut UvmIoctlState<'_>) -> IoctlResult {
    exact_params::<P>(ui.payload)?;
    ui.invoke()
}

/// Swaps `rmCtrlFd` for the host fd for the call, then puts the guest's
/// value back. A negative fd is passed through.
pub fn uvm_ioctl_has_rm_ctrl_fd<P: Pod + HasRmCtrlFd>(ui: &mut UvmIoctlState<'_>) -> IoctlResult {
    let params: P = exact_params(ui.payload)?;
    let guest_fd = params.rm_ctrl_fd();
    if guest_fd < 0 {
        return ui.invoke();
    }
    let host_fd = ui
        .driver()
        .translate_fd(guest_fd)
        .ok_or_else(|| invalid("rm_ctrl_fd is not a driver fd"))?;
    let mut host = params;
    host.set_rm_ctrl_fd(host_fd);
    let n = ui.invoke_with(&mut host)?;
    host.set_rm_ctrl_fd(guest_fd);
    write_reply(ui.payload, &host)?;
    Ok(n)
}

pub fn uvm_mm_initialize(ui: &mut UvmIoctlState<'_>) -> IoctlResult {
    let params: UvmMmInitializeParams = exact_params(ui.payload)?;
    let uvm_fd = ui
        .driver()
        .translate_fd(params.uvm_fd)
        .ok_or_else(|| invalid("uvm_fd is not a driver fd"))?;
    let mut host = UvmMmInitializeParams { uvm_fd, ..params };
    let n = ui.invoke_with(&mut host)?;
    write_reply(ui.payload, &UvmMmInitializeParams { uvm_fd: params.uvm_fd, ..host })?;
    Ok(n)
}
