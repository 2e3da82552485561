//! Fail-closed dispatch of intercepted driver requests.
//!
//! [`NvProxy`] owns the effective [`IoctlTable`] for one driver binding and
//! matches every request against it:
//!
//! | class              | key                                     |
//! |--------------------|-----------------------------------------|
//! | frontend           | `IOC_NR(cmd)`                           |
//! | control command    | `Nvos54Parameters::cmd` under `NV_ESC_RM_CONTROL` |
//! | allocation class   | `hClass` under `NV_ESC_RM_ALLOC`        |
//! | uvm                | raw request number                      |
//!
//! A miss is [`IoctlError::Unmediated`] and never reaches the host driver.

mod alloc;
mod control;
mod frontend;
mod uvm;

pub use alloc::{
    rm_alloc, rm_alloc_event_os_event, rm_alloc_no_params, rm_alloc_simple, R525, R535,
    RmAllocLayout, RmAllocRequest,
};
pub use control::{
    ctrl_client_system_get_build_version, ctrl_dev_fifo_get_channel_list,
    ctrl_subdev_fifo_disable_channels, ctrl_subdev_gr_get_info, rm_control, rm_control_simple,
};
pub use frontend::{
    frontend_ioctl_simple, frontend_register_fd, rm_alloc_memory, rm_alloc_os_event,
    rm_free, rm_free_os_event, rm_map_memory, rm_numa_info, rm_vid_heap_control,
};
pub use uvm::{
    uvm_initialize, uvm_ioctl_has_rm_ctrl_fd, uvm_ioctl_no_params, uvm_ioctl_simple,
    uvm_mm_initialize,
};

use log::Level;
use metrics::counter;
use nvgpu::ioctl::{ioc_nr, ioc_size};
use nvgpu::Pod;
use std::fmt;
use std::mem::size_of;
use std::sync::Arc;
use thiserror::Error;

use crate::config::DispatchConfig;
use crate::table::{ClassMap, Handler, IoctlClass, IoctlTable};
use crate::version::DriverVersion;
use crate::versioning::{self, BuildError};

pub type IoctlResult = Result<u64, IoctlError>;

pub type FrontendIoctlHandler = fn(&mut FrontendIoctlState<'_>) -> IoctlResult;
pub type UvmIoctlHandler = fn(&mut UvmIoctlState<'_>) -> IoctlResult;
pub type ControlCmdHandler = fn(&mut FrontendIoctlState<'_>, &nvgpu::frontend::Nvos54Parameters) -> IoctlResult;
pub type AllocationClassHandler = fn(&mut FrontendIoctlState<'_>, &RmAllocRequest) -> IoctlResult;

/// Everything that can stop a request short of a successful driver call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IoctlError {
    /// The key is absent from the effective table.
    #[error("{class} key {key:#x} is not mediated")]
    Unmediated { class: IoctlClass, key: u32 },

    #[error("invalid parameters: {reason}")]
    InvalidParams { reason: &'static str },

    #[error("host driver failed with errno {0}")]
    Host(i32),
}

impl IoctlError {
    /// Errno surfaced to the guest.
    pub fn errno(&self) -> i32 {
        match self {
            IoctlError::Unmediated { .. } => libc::ENOSYS,
            IoctlError::InvalidParams { .. } => libc::EINVAL,
            IoctlError::Host(errno) => *errno,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, IoctlError::Unmediated { .. })
    }
}

pub(crate) fn invalid(reason: &'static str) -> IoctlError {
    IoctlError::InvalidParams { reason }
}

/// The real driver session, as seen from the proxy. Interception, fd
/// bookkeeping and guest memory access live behind this.
pub trait HostDriver: Send + Sync {
    /// Issue `cmd` on the host frontend fd with `payload` in and out.
    fn frontend_ioctl(&self, cmd: u32, payload: &mut [u8]) -> Result<u64, i32>;

    /// Issue `cmd` on the host UVM fd.
    fn uvm_ioctl(&self, cmd: u32, payload: &mut [u8]) -> Result<u64, i32>;

    /// Host fd backing the guest's driver fd `guest_fd`, if it is one.
    fn translate_fd(&self, guest_fd: i32) -> Option<i32>;

    /// Read `buf.len()` bytes of guest memory at `addr`.
    fn copy_in(&self, addr: u64, buf: &mut [u8]) -> Result<(), i32>;

    /// Write `buf` to guest memory at `addr`.
    fn copy_out(&self, addr: u64, buf: &[u8]) -> Result<(), i32>;

    /// Issue `cmd` on the host frontend fd with the pointer at `ptr_offset`
    /// in `payload` aimed at `nested`, a proxy-owned copy of the block the
    /// guest pointed at. The guest's pointer is put back before returning.
    fn frontend_ioctl_nested(
        &self,
        cmd: u32,
        payload: &mut [u8],
        ptr_offset: usize,
        nested: &mut [u8],
    ) -> Result<u64, i32> {
        let guest_ptr = read_ptr(payload, ptr_offset).ok_or(libc::EINVAL)?;
        write_ptr(payload, ptr_offset, nested.as_mut_ptr() as u64);
        let res = self.frontend_ioctl(cmd, payload);
        write_ptr(payload, ptr_offset, guest_ptr);
        res
    }
}

fn read_ptr(buf: &[u8], offset: usize) -> Option<u64> {
    let bytes = buf.get(offset..offset.checked_add(8)?)?;
    Some(u64::from_ne_bytes(bytes.try_into().ok()?))
}

fn write_ptr(buf: &mut [u8], offset: usize, ptr: u64) {
    if let Some(bytes) = buf.get_mut(offset..offset.saturating_add(8)) {
        bytes.copy_from_slice(&ptr.to_ne_bytes());
    }
}

/// One driver binding: the release it was built for, its effective table,
/// and the host session requests are forwarded to.
pub struct NvProxy {
    version: DriverVersion,
    table: IoctlTable,
    driver: Arc<dyn HostDriver>,
    log_rejections: bool,
}

impl fmt::Debug for NvProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NvProxy")
            .field("version", &self.version)
            .field("entries", &self.table.total_len())
            .field("log_rejections", &self.log_rejections)
            .finish()
    }
}

impl NvProxy {
    /// Build the table for `version` from the built-in registry and bind it
    /// to `driver`.
    pub fn new(version: &str, driver: Arc<dyn HostDriver>) -> Result<Self, BuildError> {
        let version: DriverVersion = version.parse()?;
        let table = versioning::build_for_version(versioning::versioning_table(), version)?;
        Ok(Self::with_table(version, table, driver))
    }

    pub fn with_table(version: DriverVersion, table: IoctlTable, driver: Arc<dyn HostDriver>) -> Self {
        Self { version, table, driver, log_rejections: true }
    }

    /// Log rejections at WARN (default) rather than DEBUG.
    pub fn log_rejections(mut self, on: bool) -> Self {
        self.log_rejections = on;
        self
    }

    /// Apply the `[dispatch]` config table.
    pub fn configure(self, cfg: &DispatchConfig) -> Self {
        self.log_rejections(cfg.log_rejections)
    }

    pub fn version(&self) -> DriverVersion {
        self.version
    }

    pub fn table(&self) -> &IoctlTable {
        &self.table
    }

    /// Dispatch a request issued on the frontend device.
    pub fn frontend_ioctl(&self, cmd: u32, payload: &mut [u8]) -> IoctlResult {
        let nr = ioc_nr(cmd);
        let handler = self.select(IoctlClass::Frontend, nr, &self.table.frontend)?;
        // The host driver sizes the request from `cmd`, not from the slice.
        if ioc_size(cmd) as usize != payload.len() {
            nvproxy_log!(
                Level::Warn,
                "dispatch",
                "Frontend {:#x}: IOC_SIZE {} does not match payload of {} bytes",
                nr,
                ioc_size(cmd),
                payload.len()
            );
            return Err(invalid("IOC_SIZE does not match payload length"));
        }
        let mut fi = FrontendIoctlState { proxy: self, cmd, nr, payload };
        (handler.func())(&mut fi)
    }

    /// Dispatch a request issued on the UVM device.
    pub fn uvm_ioctl(&self, cmd: u32, payload: &mut [u8]) -> IoctlResult {
        let handler = self.select(IoctlClass::Uvm, cmd, &self.table.uvm)?;
        let mut ui = UvmIoctlState { proxy: self, cmd, payload };
        (handler.func())(&mut ui)
    }

    pub(crate) fn select<F: Copy>(
        &self,
        class: IoctlClass,
        key: u32,
        map: &ClassMap<F>,
    ) -> Result<Handler<F>, IoctlError> {
        match map.get(key) {
            Some(handler) => {
                counter!("nvproxy_ioctl_dispatched_total", "class" => class.as_str()).increment(1);
                nvproxy_log!(Level::Trace, "dispatch", "{} {:#x} -> {}", class, key, handler.name());
                Ok(handler)
            }
            None => {
                counter!("nvproxy_ioctl_rejected_total", "class" => class.as_str()).increment(1);
                let level = if self.log_rejections { Level::Warn } else { Level::Debug };
                nvproxy_log!(level, "dispatch", "Rejected unmediated {} {:#x} (driver {})", class, key, self.version);
                Err(IoctlError::Unmediated { class, key })
            }
        }
    }
}

/// A frontend request in flight. Control-command and allocation-class
/// handlers receive the same state as the enclosing frontend request.
pub struct FrontendIoctlState<'a> {
    pub(crate) proxy: &'a NvProxy,
    pub cmd: u32,
    pub nr: u32,
    pub payload: &'a mut [u8],
}

impl FrontendIoctlState<'_> {
    pub fn driver(&self) -> &dyn HostDriver {
        self.proxy.driver.as_ref()
    }

    /// Forward the payload as-is.
    pub fn invoke(&mut self) -> IoctlResult {
        self.proxy
            .driver
            .frontend_ioctl(self.cmd, self.payload)
            .map_err(IoctlError::Host)
    }

    /// Forward `params` in place of the payload and leave the driver's reply
    /// in `params`.
    pub fn invoke_with<P: Pod>(&mut self, params: &mut P) -> IoctlResult {
        let (proxy, cmd) = (self.proxy, self.cmd);
        with_params(self.payload, params, |buf| proxy.driver.frontend_ioctl(cmd, buf))
    }

    /// Forward with the pointer at `ptr_offset` in the payload aimed at a
    /// host copy of `nested`. The driver's reply is left in `nested`; the
    /// guest's block is not touched.
    pub fn invoke_nested<P: Pod>(&mut self, ptr_offset: usize, nested: &mut P) -> IoctlResult {
        let mut buf = vec![0u8; size_of::<P>()];
        if !nvgpu::write_params(&mut buf, nested) {
            return Err(invalid("nested block does not fit"));
        }
        let n = self.invoke_nested_bytes(ptr_offset, &mut buf)?;
        if let Some(out) = nvgpu::read_params(&buf) {
            *nested = out;
        }
        Ok(n)
    }

    /// Untyped [`invoke_nested`](Self::invoke_nested).
    pub fn invoke_nested_bytes(&mut self, ptr_offset: usize, nested: &mut [u8]) -> IoctlResult {
        self.proxy
            .driver
            .frontend_ioctl_nested(self.cmd, self.payload, ptr_offset, nested)
            .map_err(IoctlError::Host)
    }
}

/// A UVM request in flight.
pub struct UvmIoctlState<'a> {
    pub(crate) proxy: &'a NvProxy,
    pub cmd: u32,
    pub payload: &'a mut [u8],
}

impl UvmIoctlState<'_> {
    pub fn driver(&self) -> &dyn HostDriver {
        self.proxy.driver.as_ref()
    }

    pub fn invoke(&mut self) -> IoctlResult {
        self.proxy
            .driver
            .uvm_ioctl(self.cmd, self.payload)
            .map_err(IoctlError::Host)
    }

    pub fn invoke_with<P: Pod>(&mut self, params: &mut P) -> IoctlResult {
        let (proxy, cmd) = (self.proxy, self.cmd);
        with_params(self.payload, params, |buf| proxy.driver.uvm_ioctl(cmd, buf))
    }
}

/// Payload must be exactly one `P`.
pub(crate) fn exact_params<P: Pod>(payload: &[u8]) -> Result<P, IoctlError> {
    if payload.len() != size_of::<P>() {
        return Err(invalid("payload size does not match parameter type"));
    }
    nvgpu::read_params(payload).ok_or_else(|| invalid("payload too short"))
}

fn with_params<P: Pod>(
    payload: &mut [u8],
    params: &mut P,
    call: impl FnOnce(&mut [u8]) -> Result<u64, i32>,
) -> IoctlResult {
    let mut buf = vec![0u8; size_of::<P>()];
    if !nvgpu::write_params(&mut buf, params) {
        return Err(invalid("parameter block does not fit"));
    }
    let n = call(&mut buf).map_err(IoctlError::Host)?;
    if let Some(out) = nvgpu::read_params(&buf) {
        *params = out;
    }
    write_reply(payload, params)?;
    Ok(n)
}

/// Write a reply block back over the guest's payload.
pub(crate) fn write_reply<P: Pod>(payload: &mut [u8], params: &P) -> Result<(), IoctlError> {
    if !nvgpu::write_params(payload, params) {
        return Err(invalid("payload too short for reply"));
    }
    Ok(())
}

/// Read a `P` from guest memory at `addr`.
pub(crate) fn copy_in_params<P: Pod>(driver: &dyn HostDriver, addr: u64) -> Result<P, IoctlError> {
    let mut buf = vec![0u8; size_of::<P>()];
    driver.copy_in(addr, &mut buf).map_err(IoctlError::Host)?;
    nvgpu::read_params(&buf).ok_or_else(|| invalid("short guest read"))
}

/// Write `params` to guest memory at `addr`.
pub(crate) fn copy_out_params<P: Pod>(driver: &dyn HostDriver, addr: u64, params: &P) -> Result<(), IoctlError> {
    let mut buf = vec![0u8; size_of::<P>()];
    if !nvgpu::write_params(&mut buf, params) {
        return Err(invalid("parameter block does not fit"));
    }
    driver.copy_out(addr, &buf).map_err(IoctlError::Host)
}
