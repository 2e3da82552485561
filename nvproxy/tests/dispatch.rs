//! Integration tests for fail-closed dispatch.
//!
//! A recording host driver stands in for the real driver session so each
//! test can assert exactly which requests were forwarded, and with which
//! bytes.

use std::collections::HashMap;
use std::mem::size_of;
use std::sync::{Arc, Mutex};

use nvgpu::classes::{
    Nv0005AllocParameters, Nv0080AllocParameters, NV01_DEVICE_0, NV01_EVENT_OS_EVENT,
    NV01_MEMORY_SYSTEM_OS_DESCRIPTOR, NV01_ROOT,
};
use nvgpu::ctrl::{
    Nv0000CtrlSystemGetBuildVersionParams, Nv0080CtrlFifoGetChannelListParams,
    Nv2080CtrlFifoDisableChannelsParams, Nv2080CtrlGrGetInfoParams, NvxxxxCtrlXxxInfo,
    NV0000_CTRL_CMD_GPU_GET_ATTACHED_IDS, NV0000_CTRL_CMD_SYSTEM_GET_BUILD_VERSION,
    NV0080_CTRL_CMD_FIFO_GET_CHANNELLIST, NV2080_CTRL_CMD_FIFO_DISABLE_CHANNELS,
    NV2080_CTRL_CMD_GR_GET_INFO, NV2080_CTRL_GR_INFO_MAX_SIZE, RM_GSS_LEGACY_MASK,
};
use nvgpu::frontend::*;
use nvgpu::uvm::{UvmRegisterGpuParams, UVM_MM_INITIALIZE, UVM_REGISTER_GPU};
use nvgpu::{write_params, Handle, Pod};
use nvproxy::dispatch::{rm_control, FrontendIoctlState, HostDriver, IoctlError, IoctlResult, NvProxy};
use nvproxy::handler;
use nvproxy::table::{IoctlClass, IoctlTable, TableOverlay};
use nvproxy::version::DriverVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Device {
    Frontend,
    Uvm,
}

#[derive(Default)]
struct RecordingDriver {
    calls: Mutex<Vec<(Device, u32, Vec<u8>)>>,
    nested: Mutex<Vec<Vec<u8>>>,
    fds: HashMap<i32, i32>,
    memory: Mutex<HashMap<u64, Vec<u8>>>,
    fail_with: Option<i32>,
    /// Stands in for the driver writing its reply into a nested block.
    reply: Option<fn(&mut [u8])>,
}

impl RecordingDriver {
    fn with_fds(fds: &[(i32, i32)]) -> Self {
        Self { fds: fds.iter().copied().collect(), ..Default::default() }
    }

    fn with_memory(self, blocks: Vec<(u64, Vec<u8>)>) -> Self {
        Self { memory: Mutex::new(blocks.into_iter().collect()), ..self }
    }

    fn calls(&self) -> Vec<(Device, u32, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }

    fn nested(&self) -> Vec<Vec<u8>> {
        self.nested.lock().unwrap().clone()
    }

    fn guest<P: Pod>(&self, addr: u64) -> P {
        nvgpu::read_params(&self.memory.lock().unwrap()[&addr]).unwrap()
    }

    fn record(&self, dev: Device, cmd: u32, payload: &[u8]) -> Result<u64, i32> {
        self.calls.lock().unwrap().push((dev, cmd, payload.to_vec()));
        match self.fail_with {
            Some(errno) => Err(errno),
            None => Ok(0),
        }
    }
}

impl HostDriver for RecordingDriver {
    fn frontend_ioctl(&self, cmd: u32, payload: &mut [u8]) -> Result<u64, i32> {
        self.record(Device::Frontend, cmd, payload)
    }

    fn uvm_ioctl(&self, cmd: u32, payload: &mut [u8]) -> Result<u64, i32> {
        self.record(Device::Uvm, cmd, payload)
    }

    fn translate_fd(&self, guest_fd: i32) -> Option<i32> {
        self.fds.get(&guest_fd).copied()
    }

    fn copy_in(&self, addr: u64, buf: &mut [u8]) -> Result<(), i32> {
        let memory = self.memory.lock().unwrap();
        let src = memory.get(&addr).ok_or(libc::EFAULT)?;
        if src.len() < buf.len() {
            return Err(libc::EFAULT);
        }
        buf.copy_from_slice(&src[..buf.len()]);
        Ok(())
    }

    fn copy_out(&self, addr: u64, buf: &[u8]) -> Result<(), i32> {
        self.memory.lock().unwrap().insert(addr, buf.to_vec());
        Ok(())
    }

    fn frontend_ioctl_nested(
        &self,
        cmd: u32,
        payload: &mut [u8],
        _ptr_offset: usize,
        nested: &mut [u8],
    ) -> Result<u64, i32> {
        self.nested.lock().unwrap().push(nested.to_vec());
        if let Some(reply) = self.reply {
            reply(nested);
        }
        self.record(Device::Frontend, cmd, payload)
    }
}

fn stamp_first_word(block: &mut [u8]) {
    block[..4].copy_from_slice(&7u32.to_ne_bytes());
}

fn bytes<P: Pod>(p: &P) -> Vec<u8> {
    let mut v = vec![0u8; size_of::<P>()];
    assert!(write_params(&mut v, p));
    v
}

fn proxy(version: &str, driver: &Arc<RecordingDriver>) -> NvProxy {
    NvProxy::new(version, driver.clone()).unwrap()
}

fn control(cmd: u32, params: u64, params_size: u32) -> Vec<u8> {
    bytes(&Nvos54Parameters { cmd, params, params_size, ..Default::default() })
}

const CONTROL: u32 = frontend_cmd(NV_ESC_RM_CONTROL, size_of::<Nvos54Parameters>() as u32);

#[test]
fn frontend_miss_never_reaches_driver() {
    let driver = Arc::new(RecordingDriver::default());
    let nvp = proxy("535.43.02", &driver);

    let err = nvp.frontend_ioctl(frontend_cmd(NV_ESC_STATUS_CODE, 8), &mut [0u8; 8]).unwrap_err();

    assert_eq!(err, IoctlError::Unmediated { class: IoctlClass::Frontend, key: NV_ESC_STATUS_CODE });
    assert_eq!(err.errno(), libc::ENOSYS);
    assert!(err.is_rejection());
    assert!(driver.calls().is_empty());
}

#[test]
fn simple_frontend_request_is_forwarded_verbatim() {
    let driver = Arc::new(RecordingDriver::default());
    let nvp = proxy("525.60.13", &driver);
    let cmd = frontend_cmd(NV_ESC_CARD_INFO, 4);

    nvp.frontend_ioctl(cmd, &mut [1, 2, 3, 4]).unwrap();

    assert_eq!(driver.calls(), vec![(Device::Frontend, cmd, vec![1, 2, 3, 4])]);
}

#[test]
fn host_errno_passes_through() {
    let driver = Arc::new(RecordingDriver { fail_with: Some(libc::EIO), ..Default::default() });
    let nvp = proxy("525.60.13", &driver);

    let err = nvp.frontend_ioctl(frontend_cmd(NV_ESC_CARD_INFO, 0), &mut []).unwrap_err();

    assert_eq!(err, IoctlError::Host(libc::EIO));
    assert_eq!(err.errno(), libc::EIO);
    assert!(!err.is_rejection());
}

#[test]
fn numa_info_is_always_refused() {
    let driver = Arc::new(RecordingDriver::default());
    let nvp = proxy("535.43.02", &driver);

    let err = nvp.frontend_ioctl(frontend_cmd(NV_ESC_NUMA_INFO, 16), &mut [0u8; 16]).unwrap_err();

    assert_eq!(err.errno(), libc::EINVAL);
    assert!(driver.calls().is_empty());
}

#[test]
fn control_command_is_looked_up_under_rm_control() {
    let driver = Arc::new(RecordingDriver::default());
    let nvp = proxy("525.60.13", &driver);

    // 1) unknown command: rejected at the second level
    let mut payload = control(0x1234_5678, 0, 0);
    let err = nvp.frontend_ioctl(CONTROL, &mut payload).unwrap_err();
    assert_eq!(err, IoctlError::Unmediated { class: IoctlClass::ControlCommand, key: 0x1234_5678 });
    assert!(driver.calls().is_empty());

    // 2) known simple command: forwarded
    let mut payload = control(NV0000_CTRL_CMD_GPU_GET_ATTACHED_IDS, 0, 0);
    nvp.frontend_ioctl(CONTROL, &mut payload).unwrap();
    assert_eq!(driver.calls().len(), 1);

    // 3) simple command with a size but no pointer: refused
    let mut payload = control(NV0000_CTRL_CMD_GPU_GET_ATTACHED_IDS, 0, 16);
    assert_eq!(nvp.frontend_ioctl(CONTROL, &mut payload).unwrap_err().errno(), libc::EINVAL);
    assert_eq!(driver.calls().len(), 1);
}

#[test]
fn legacy_gss_commands_are_not_special_cased() {
    let driver = Arc::new(RecordingDriver::default());
    let nvp = proxy("535.43.02", &driver);
    let cmd = 0x2080_0000 | RM_GSS_LEGACY_MASK | 0x01;

    let err = nvp.frontend_ioctl(CONTROL, &mut control(cmd, 0, 0)).unwrap_err();

    assert!(err.is_rejection());
    assert!(driver.calls().is_empty());
}

#[test]
fn control_payload_of_wrong_size_is_invalid() {
    let driver = Arc::new(RecordingDriver::default());
    let nvp = proxy("535.43.02", &driver);

    let err = nvp.frontend_ioctl(CONTROL, &mut [0u8; 8]).unwrap_err();

    assert_eq!(err.errno(), libc::EINVAL);
    assert!(driver.calls().is_empty());
}

#[test]
fn disable_channels_requires_null_preempt_event() {
    let addr = 0x7000_0000;
    let ctrl = Nv2080CtrlFifoDisableChannelsParams { p_runlist_preempt_event: 0xdead, ..Default::default() };
    let driver = Arc::new(RecordingDriver::default().with_memory(vec![(addr, bytes(&ctrl))]));
    let nvp = proxy("535.43.02", &driver);
    let size = size_of::<Nv2080CtrlFifoDisableChannelsParams>() as u32;

    let mut payload = control(NV2080_CTRL_CMD_FIFO_DISABLE_CHANNELS, addr, size);
    assert_eq!(nvp.frontend_ioctl(CONTROL, &mut payload).unwrap_err().errno(), libc::EINVAL);

    // unreadable guest memory surfaces the copy-in errno
    let mut payload = control(NV2080_CTRL_CMD_FIFO_DISABLE_CHANNELS, addr + 8, size);
    assert_eq!(nvp.frontend_ioctl(CONTROL, &mut payload).unwrap_err(), IoctlError::Host(libc::EFAULT));
    assert!(driver.calls().is_empty());
}

#[test]
fn rm_alloc_shape_follows_the_release() {
    let driver = Arc::new(RecordingDriver::default());
    let r525 = proxy("525.60.13", &driver);
    let r535 = proxy("535.43.02", &driver);

    let old64 = bytes(&Nvos64Parameters { h_class: NV01_ROOT, ..Default::default() });
    let new64 = bytes(&Nvos64ParametersR535 { h_class: NV01_ROOT, ..Default::default() });
    let alloc = |len: usize| frontend_cmd(NV_ESC_RM_ALLOC, len as u32);

    // 1) each release accepts its own NVOS64 shape
    r525.frontend_ioctl(alloc(old64.len()), &mut old64.clone()).unwrap();
    r535.frontend_ioctl(alloc(new64.len()), &mut new64.clone()).unwrap();
    assert_eq!(driver.calls().len(), 2);

    // 2) and refuses the other's
    let err = r535.frontend_ioctl(alloc(old64.len()), &mut old64.clone()).unwrap_err();
    assert_eq!(err.errno(), libc::EINVAL);
    let err = r525.frontend_ioctl(alloc(new64.len()), &mut new64.clone()).unwrap_err();
    assert_eq!(err.errno(), libc::EINVAL);
    assert_eq!(driver.calls().len(), 2);
}

#[test]
fn allocation_class_is_looked_up_under_rm_alloc() {
    let driver = Arc::new(RecordingDriver::default());
    let nvp = proxy("535.43.02", &driver);
    let mut payload = bytes(&Nvos21ParametersR535 { h_class: 0xbeef, ..Default::default() });

    let err = nvp.frontend_ioctl(frontend_cmd(NV_ESC_RM_ALLOC, 32), &mut payload).unwrap_err();

    assert_eq!(err, IoctlError::Unmediated { class: IoctlClass::AllocationClass, key: 0xbeef });
    assert!(driver.calls().is_empty());
}

#[test]
fn r535_alloc_checks_declared_params_size() {
    let addr = 0x1000;
    let driver = Arc::new(RecordingDriver::default().with_memory(vec![(addr, bytes(&Nv0080AllocParameters::default()))]));
    let nvp = proxy("535.43.02", &driver);
    let req = |params_size: u32| {
        bytes(&Nvos21ParametersR535 {
            h_class: NV01_DEVICE_0,
            p_alloc_parms: addr,
            params_size,
            ..Default::default()
        })
    };
    let cmd = frontend_cmd(NV_ESC_RM_ALLOC, 32);

    let err = nvp.frontend_ioctl(cmd, &mut req(8)).unwrap_err();
    assert_eq!(err.errno(), libc::EINVAL);

    nvp.frontend_ioctl(cmd, &mut req(size_of::<Nv0080AllocParameters>() as u32)).unwrap();
    assert_eq!(driver.calls().len(), 1);
}

#[test]
fn register_fd_is_translated_then_restored() {
    let driver = Arc::new(RecordingDriver::with_fds(&[(5, 105)]));
    let nvp = proxy("525.60.13", &driver);
    let cmd = frontend_cmd(NV_ESC_REGISTER_FD, 4);

    let mut payload = bytes(&IoctlRegisterFd { ctl_fd: 5 });
    nvp.frontend_ioctl(cmd, &mut payload).unwrap();

    let calls = driver.calls();
    assert_eq!(calls.len(), 1);
    let seen: IoctlRegisterFd = nvgpu::read_params(&calls[0].2).unwrap();
    assert_eq!(seen.ctl_fd, 105);
    assert_eq!(nvgpu::read_params::<IoctlRegisterFd>(&payload).unwrap().ctl_fd, 5);

    // unknown fd: refused before the driver sees it
    let mut payload = bytes(&IoctlRegisterFd { ctl_fd: 6 });
    assert_eq!(nvp.frontend_ioctl(cmd, &mut payload).unwrap_err().errno(), libc::EINVAL);
    assert_eq!(driver.calls().len(), 1);
}

#[test]
fn uvm_rm_ctrl_fd_is_translated_then_restored() {
    let driver = Arc::new(RecordingDriver::with_fds(&[(3, 33)]));
    let nvp = proxy("535.43.02", &driver);

    let params = UvmRegisterGpuParams { rm_ctrl_fd: 3, h_client: Handle { val: 9 }, ..Default::default() };
    let mut payload = bytes(&params);
    nvp.uvm_ioctl(UVM_REGISTER_GPU, &mut payload).unwrap();

    let calls = driver.calls();
    assert_eq!(calls[0].0, Device::Uvm);
    assert_eq!(calls[0].1, UVM_REGISTER_GPU);
    let seen: UvmRegisterGpuParams = nvgpu::read_params(&calls[0].2).unwrap();
    assert_eq!((seen.rm_ctrl_fd, seen.h_client), (33, Handle { val: 9 }));
    assert_eq!(nvgpu::read_params::<UvmRegisterGpuParams>(&payload).unwrap(), params);
}

#[test]
fn uvm_mm_initialize_only_from_r535() {
    let driver = Arc::new(RecordingDriver::with_fds(&[(4, 44)]));
    let mut payload = [0u8; 8];
    payload[..4].copy_from_slice(&4i32.to_ne_bytes());

    let err = proxy("525.60.13", &driver).uvm_ioctl(UVM_MM_INITIALIZE, &mut payload).unwrap_err();
    assert_eq!(err, IoctlError::Unmediated { class: IoctlClass::Uvm, key: UVM_MM_INITIALIZE });

    proxy("535.43.02", &driver).uvm_ioctl(UVM_MM_INITIALIZE, &mut payload).unwrap();
    assert_eq!(driver.calls().len(), 1);
}

#[test]
fn payload_must_match_encoded_size() {
    let driver = Arc::new(RecordingDriver::default());
    let nvp = proxy("525.60.13", &driver);
    let mut nvos21 = bytes(&Nvos21Parameters { h_class: NV01_ROOT, ..Default::default() });

    let cmd = frontend_cmd(NV_ESC_RM_ALLOC, SIZEOF_NVOS64_PARAMETERS as u32);
    assert_eq!(nvp.frontend_ioctl(cmd, &mut nvos21).unwrap_err().errno(), libc::EINVAL);
    assert!(driver.calls().is_empty());
}

#[test]
fn os_event_fds_are_translated_then_restored() {
    let driver = Arc::new(RecordingDriver::with_fds(&[(5, 105)]));
    let nvp = proxy("525.60.13", &driver);
    let event = IoctlAllocOsEvent { h_client: Handle { val: 1 }, fd: 5, ..Default::default() };

    let mut payload = bytes(&event);
    let cmd = frontend_cmd(NV_ESC_ALLOC_OS_EVENT, size_of::<IoctlAllocOsEvent>() as u32);
    nvp.frontend_ioctl(cmd, &mut payload).unwrap();
    assert_eq!(nvgpu::read_params::<IoctlAllocOsEvent>(&driver.calls()[0].2).unwrap().fd, 105);
    assert_eq!(nvgpu::read_params::<IoctlAllocOsEvent>(&payload).unwrap(), event);

    let free = IoctlFreeOsEvent { h_client: Handle { val: 1 }, fd: 5, ..Default::default() };
    let mut payload = bytes(&free);
    let cmd = frontend_cmd(NV_ESC_FREE_OS_EVENT, size_of::<IoctlFreeOsEvent>() as u32);
    nvp.frontend_ioctl(cmd, &mut payload).unwrap();
    assert_eq!(nvgpu::read_params::<IoctlFreeOsEvent>(&driver.calls()[1].2).unwrap().fd, 105);
    assert_eq!(nvgpu::read_params::<IoctlFreeOsEvent>(&payload).unwrap(), free);

    let mut payload = bytes(&IoctlFreeOsEvent { fd: 6, ..free });
    assert_eq!(nvp.frontend_ioctl(cmd, &mut payload).unwrap_err().errno(), libc::EINVAL);
    assert_eq!(driver.calls().len(), 2);
}

#[test]
fn alloc_memory_takes_only_os_descriptors() {
    let driver = Arc::new(RecordingDriver::with_fds(&[(5, 105)]));
    let nvp = proxy("525.60.13", &driver);
    let cmd = frontend_cmd(NV_ESC_RM_ALLOC_MEMORY, size_of::<IoctlNvos02ParametersWithFd>() as u32);
    let req = |h_class| IoctlNvos02ParametersWithFd {
        params: Nvos02Parameters { h_class, p_memory: 0x7000, limit: 0xfff, ..Default::default() },
        fd: 5,
        ..Default::default()
    };

    let mut payload = bytes(&req(NV01_DEVICE_0));
    assert_eq!(nvp.frontend_ioctl(cmd, &mut payload).unwrap_err().errno(), libc::EINVAL);
    assert!(driver.calls().is_empty());

    let mut payload = bytes(&req(NV01_MEMORY_SYSTEM_OS_DESCRIPTOR));
    nvp.frontend_ioctl(cmd, &mut payload).unwrap();
    let seen: IoctlNvos02ParametersWithFd = nvgpu::read_params(&driver.calls()[0].2).unwrap();
    assert_eq!(seen.fd, 105);
    assert_eq!(seen.params, req(NV01_MEMORY_SYSTEM_OS_DESCRIPTOR).params);
    assert_eq!(nvgpu::read_params::<IoctlNvos02ParametersWithFd>(&payload).unwrap().fd, 5);
}

#[test]
fn map_memory_fd_is_translated_then_restored() {
    let driver = Arc::new(RecordingDriver::with_fds(&[(5, 105)]));
    let nvp = proxy("535.43.02", &driver);
    let cmd = frontend_cmd(NV_ESC_RM_MAP_MEMORY, size_of::<IoctlNvos33ParametersWithFd>() as u32);
    let map = IoctlNvos33ParametersWithFd {
        params: Nvos33Parameters { length: 0x1000, ..Default::default() },
        fd: 5,
        ..Default::default()
    };

    let mut payload = bytes(&map);
    nvp.frontend_ioctl(cmd, &mut payload).unwrap();
    assert_eq!(nvgpu::read_params::<IoctlNvos33ParametersWithFd>(&driver.calls()[0].2).unwrap().fd, 105);
    assert_eq!(nvgpu::read_params::<IoctlNvos33ParametersWithFd>(&payload).unwrap(), map);
}

#[test]
fn vid_heap_control_allows_only_alloc_size() {
    let driver = Arc::new(RecordingDriver::default());
    let nvp = proxy("525.60.13", &driver);
    let cmd = frontend_cmd(NV_ESC_RM_VID_HEAP_CONTROL, size_of::<Nvos32Parameters>() as u32);

    let mut payload = bytes(&Nvos32Parameters { function: NVOS32_FUNCTION_ALLOC_SIZE, ..Default::default() });
    nvp.frontend_ioctl(cmd, &mut payload).unwrap();
    assert_eq!(driver.calls().len(), 1);

    let mut payload = bytes(&Nvos32Parameters { function: 7, ..Default::default() });
    assert_eq!(nvp.frontend_ioctl(cmd, &mut payload).unwrap_err().errno(), libc::EINVAL);
    assert_eq!(driver.calls().len(), 1);
}

#[test]
fn event_os_event_forwards_host_fd_and_restores_guest_fd() {
    let addr = 0x2000;
    let params = Nv0005AllocParameters { h_class: NV01_EVENT_OS_EVENT, notify_index: 3, data: 5, ..Default::default() };
    let driver = Arc::new(RecordingDriver {
        reply: Some(stamp_first_word),
        ..RecordingDriver::with_fds(&[(5, 105)]).with_memory(vec![(addr, bytes(&params))])
    });
    let nvp = proxy("525.60.13", &driver);
    let cmd = frontend_cmd(NV_ESC_RM_ALLOC, SIZEOF_NVOS21_PARAMETERS as u32);
    let req = bytes(&Nvos21Parameters { h_class: NV01_EVENT_OS_EVENT, p_alloc_parms: addr, ..Default::default() });

    let mut payload = req.clone();
    nvp.frontend_ioctl(cmd, &mut payload).unwrap();
    assert_eq!(payload, req);

    // host copy carries the host fd
    let nested = driver.nested();
    assert_eq!(nested.len(), 1);
    let seen: Nv0005AllocParameters = nvgpu::read_params(&nested[0]).unwrap();
    assert_eq!(seen, Nv0005AllocParameters { data: 105, ..params });

    // reply reaches the guest with its own fd
    let back: Nv0005AllocParameters = driver.guest(addr);
    assert_eq!(back, Nv0005AllocParameters { h_parent_client: Handle { val: 7 }, ..params });
}

#[test]
fn event_os_event_rejects_unknown_fd() {
    let addr = 0x2000;
    let params = Nv0005AllocParameters { h_class: NV01_EVENT_OS_EVENT, data: 6, ..Default::default() };
    let driver = Arc::new(RecordingDriver::with_fds(&[(5, 105)]).with_memory(vec![(addr, bytes(&params))]));
    let nvp = proxy("535.43.02", &driver);
    let mut payload = bytes(&Nvos21ParametersR535 {
        h_class: NV01_EVENT_OS_EVENT,
        p_alloc_parms: addr,
        params_size: size_of::<Nv0005AllocParameters>() as u32,
        ..Default::default()
    });

    let err = nvp.frontend_ioctl(frontend_cmd(NV_ESC_RM_ALLOC, 32), &mut payload).unwrap_err();
    assert_eq!(err.errno(), libc::EINVAL);
    assert!(driver.calls().is_empty());
}

#[test]
fn alloc_params_reply_is_copied_back() {
    let addr = 0x1000;
    let driver = Arc::new(RecordingDriver {
        reply: Some(stamp_first_word),
        ..RecordingDriver::default().with_memory(vec![(addr, bytes(&Nv0080AllocParameters::default()))])
    });
    let nvp = proxy("525.60.13", &driver);
    let mut payload = bytes(&Nvos21Parameters { h_class: NV01_DEVICE_0, p_alloc_parms: addr, ..Default::default() });

    nvp.frontend_ioctl(frontend_cmd(NV_ESC_RM_ALLOC, 32), &mut payload).unwrap();

    assert_eq!(driver.nested(), vec![bytes(&Nv0080AllocParameters::default())]);
    assert_eq!(driver.guest::<u32>(addr), 7);
}

#[test]
fn build_version_strings_go_through_host_buffers() {
    let (ctrl_at, dv, v, t) = (0x3000, 0x3100, 0x3200, 0x3300);
    let ctrl = Nv0000CtrlSystemGetBuildVersionParams {
        size_of_strings: 16,
        p_driver_version_buffer: dv,
        p_version_buffer: v,
        p_title_buffer: t,
        ..Default::default()
    };
    let driver = Arc::new(RecordingDriver::default().with_memory(vec![(ctrl_at, bytes(&ctrl))]));
    let nvp = proxy("525.60.13", &driver);
    let size = size_of::<Nv0000CtrlSystemGetBuildVersionParams>() as u32;

    nvp.frontend_ioctl(CONTROL, &mut control(NV0000_CTRL_CMD_SYSTEM_GET_BUILD_VERSION, ctrl_at, size)).unwrap();

    let seen: Nv0000CtrlSystemGetBuildVersionParams = nvgpu::read_params(&driver.nested()[0]).unwrap();
    assert_eq!(seen.size_of_strings, 16);
    assert!(![dv, v, t].contains(&seen.p_driver_version_buffer));
    assert!(![dv, v, t].contains(&seen.p_title_buffer));
    for buf in [dv, v, t] {
        assert_eq!(driver.guest::<[u8; 16]>(buf), [0; 16]);
    }
    assert_eq!(driver.guest::<Nv0000CtrlSystemGetBuildVersionParams>(ctrl_at), ctrl);

    // buffers without a size are refused
    let driver = Arc::new(
        RecordingDriver::default().with_memory(vec![(ctrl_at, bytes(&Nv0000CtrlSystemGetBuildVersionParams { size_of_strings: 0, ..ctrl }))]),
    );
    let nvp = proxy("525.60.13", &driver);
    let err = nvp
        .frontend_ioctl(CONTROL, &mut control(NV0000_CTRL_CMD_SYSTEM_GET_BUILD_VERSION, ctrl_at, size))
        .unwrap_err();
    assert_eq!(err.errno(), libc::EINVAL);
    assert!(driver.calls().is_empty());
}

#[test]
fn channel_list_is_copied_in_and_out() {
    let (ctrl_at, handles_at, channels_at) = (0x4000, 0x4100, 0x4200);
    let handles: [u32; 2] = [0x11, 0x22];
    let ctrl = Nv0080CtrlFifoGetChannelListParams {
        num_channels: 2,
        p_channel_handle_list: handles_at,
        p_channel_list: channels_at,
        ..Default::default()
    };
    let driver = Arc::new(
        RecordingDriver::default().with_memory(vec![(ctrl_at, bytes(&ctrl)), (handles_at, bytes(&handles))]),
    );
    let nvp = proxy("535.43.02", &driver);
    let size = size_of::<Nv0080CtrlFifoGetChannelListParams>() as u32;

    nvp.frontend_ioctl(CONTROL, &mut control(NV0080_CTRL_CMD_FIFO_GET_CHANNELLIST, ctrl_at, size)).unwrap();

    let seen: Nv0080CtrlFifoGetChannelListParams = nvgpu::read_params(&driver.nested()[0]).unwrap();
    assert_eq!(seen.num_channels, 2);
    assert_ne!(seen.p_channel_handle_list, handles_at);
    assert_ne!(seen.p_channel_list, channels_at);
    assert_eq!(driver.guest::<[u32; 2]>(channels_at), [0, 0]);
    assert_eq!(driver.guest::<Nv0080CtrlFifoGetChannelListParams>(ctrl_at), ctrl);
}

#[test]
fn channel_list_count_requires_lists() {
    let ctrl_at = 0x4000;
    let ctrl = Nv0080CtrlFifoGetChannelListParams { num_channels: 2, ..Default::default() };
    let driver = Arc::new(RecordingDriver::default().with_memory(vec![(ctrl_at, bytes(&ctrl))]));
    let nvp = proxy("525.60.13", &driver);
    let size = size_of::<Nv0080CtrlFifoGetChannelListParams>() as u32;

    let err = nvp
        .frontend_ioctl(CONTROL, &mut control(NV0080_CTRL_CMD_FIFO_GET_CHANNELLIST, ctrl_at, size))
        .unwrap_err();
    assert_eq!(err.errno(), libc::EINVAL);
    assert!(driver.calls().is_empty());
}

#[test]
fn gr_info_list_goes_through_host_buffer() {
    let (ctrl_at, list_at) = (0x5000, 0x5100);
    let list = [NvxxxxCtrlXxxInfo { index: 1, data: 0 }, NvxxxxCtrlXxxInfo { index: 4, data: 0 }];
    let ctrl = Nv2080CtrlGrGetInfoParams { gr_info_list_size: 2, gr_info_list: list_at, ..Default::default() };
    let driver = Arc::new(RecordingDriver::default().with_memory(vec![(ctrl_at, bytes(&ctrl)), (list_at, bytes(&list))]));
    let nvp = proxy("525.60.13", &driver);
    let size = size_of::<Nv2080CtrlGrGetInfoParams>() as u32;

    nvp.frontend_ioctl(CONTROL, &mut control(NV2080_CTRL_CMD_GR_GET_INFO, ctrl_at, size)).unwrap();

    let seen: Nv2080CtrlGrGetInfoParams = nvgpu::read_params(&driver.nested()[0]).unwrap();
    assert_ne!(seen.gr_info_list, list_at);
    assert_eq!(driver.guest::<[NvxxxxCtrlXxxInfo; 2]>(list_at), list);
    assert_eq!(driver.guest::<Nv2080CtrlGrGetInfoParams>(ctrl_at), ctrl);
}

#[test]
fn gr_info_list_size_is_capped() {
    let ctrl_at = 0x5000;
    let ctrl = Nv2080CtrlGrGetInfoParams {
        gr_info_list_size: NV2080_CTRL_GR_INFO_MAX_SIZE + 1,
        gr_info_list: 0x5100,
        ..Default::default()
    };
    let driver = Arc::new(RecordingDriver::default().with_memory(vec![(ctrl_at, bytes(&ctrl))]));
    let nvp = proxy("525.60.13", &driver);
    let size = size_of::<Nv2080CtrlGrGetInfoParams>() as u32;

    let err = nvp.frontend_ioctl(CONTROL, &mut control(NV2080_CTRL_CMD_GR_GET_INFO, ctrl_at, size)).unwrap_err();
    assert_eq!(err.errno(), libc::EINVAL);
    assert!(driver.calls().is_empty());
}

fn tag_x(_: &mut FrontendIoctlState<'_>, _: &Nvos54Parameters) -> IoctlResult {
    Ok(0x9)
}

#[test]
fn synthetic_release_rejects_unlisted_control_key() {
    let mut table = IoctlTable::new();
    table.apply(
        &TableOverlay::new()
            .frontend(&[(NV_ESC_RM_CONTROL, handler!(rm_control))])
            .control_cmd(&[(9, handler!(tag_x))]),
    );
    let driver = Arc::new(RecordingDriver::default());
    let nvp = NvProxy::with_table(DriverVersion::new(2, 0, 0), table, driver.clone()).log_rejections(false);

    assert_eq!(nvp.frontend_ioctl(CONTROL, &mut control(9, 0, 0)), Ok(0x9));
    assert_eq!(
        nvp.frontend_ioctl(CONTROL, &mut control(8, 0, 0)),
        Err(IoctlError::Unmediated { class: IoctlClass::ControlCommand, key: 8 })
    );
    assert!(driver.calls().is_empty());
}

#[test]
fn dispatch_config_is_applied() {
    let driver = Arc::new(RecordingDriver::default());
    let cfg = nvproxy::config::loader::parse("[dispatch]\nlog_rejections = false\n").unwrap();
    let nvp = proxy("535.43.02", &driver).configure(&cfg.dispatch);

    assert!(format!("{nvp:?}").contains("log_rejections: false"));
    assert_eq!(nvp.version(), DriverVersion::new(535, 43, 2));
    assert_eq!(nvp.table().fingerprint(), nvproxy::build_ioctl_table("535.43.02").unwrap().fingerprint());
}

#[test]
fn concurrent_dispatch_shares_one_table() {
    let driver = Arc::new(RecordingDriver::default());
    let nvp = proxy("535.43.02", &driver).log_rejections(false);
    let hit = frontend_cmd(NV_ESC_CARD_INFO, 0);
    let miss = frontend_cmd(NV_ESC_STATUS_CODE, 0);

    crossbeam::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|_| {
                for i in 0..500 {
                    let cmd = if i % 2 == 0 { hit } else { miss };
                    let res: IoctlResult = nvp.frontend_ioctl(cmd, &mut []);
                    assert_eq!(res.is_ok(), cmd == hit);
                }
            });
        }
    })
    .unwrap();

    assert_eq!(driver.calls().len(), 8 * 250);
}
