//! `NV_ESC_RM_ALLOC` and the allocation classes nested under it.
//!
//! The escape carries either an NVOS21 or an NVOS64 block and the two are
//! told apart only by payload size. Both shapes changed in R535, so the
//! frontend handler is bound per release through [`RmAllocLayout`].

use nvgpu::classes::Nv0005AllocParameters;
use nvgpu::frontend::{
    Nvos21Parameters, Nvos21ParametersR535, Nvos64Parameters, Nvos64ParametersR535,
};
use nvgpu::{Handle, Pod};
use std::mem::{offset_of, size_of};

use super::{copy_in_params, copy_out_params, invalid, FrontendIoctlState, IoctlResult};
use crate::table::IoctlClass;

/// Release-independent view of an allocation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RmAllocRequest {
    pub h_root: Handle,
    pub h_object_parent: Handle,
    pub h_object_new: Handle,
    pub h_class: u32,
    pub p_alloc_parms: u64,
    /// Declared size of the block at `p_alloc_parms`; R535 onwards only.
    pub params_size: Option<u32>,
    pub is_nvos64: bool,
    /// Byte offset of `p_alloc_parms` within the frontend payload.
    pub alloc_parms_offset: usize,
}

/// NVOS21/NVOS64 shapes of one driver generation.
pub trait RmAllocLayout {
    type Nvos21: Pod;
    type Nvos64: Pod;

    fn from_nvos21(p: &Self::Nvos21) -> RmAllocRequest;
    fn from_nvos64(p: &Self::Nvos64) -> RmAllocRequest;
}

/// Shapes up to R535.
#[derive(Debug, Clone, Copy)]
pub struct R525;

/// Shapes from R535, which add `paramsSize`.
#[derive(Debug, Clone, Copy)]
pub struct R535;

impl RmAllocLayout for R525 {
    type Nvos21 = Nvos21Parameters;
    type Nvos64 = Nvos64Parameters;

    fn from_nvos21(p: &Nvos21Parameters) -> RmAllocRequest {
        RmAllocRequest {
            h_root: p.h_root,
            h_object_parent: p.h_object_parent,
            h_object_new: p.h_object_new,
            h_class: p.h_class,
            p_alloc_parms: p.p_alloc_parms,
            params_size: None,
            is_nvos64: false,
            alloc_parms_offset: offset_of!(Nvos21Parameters, p_alloc_parms),
        }
    }

    fn from_nvos64(p: &Nvos64Parameters) -> RmAllocRequest {
        RmAllocRequest {
            h_root: p.h_root,
            h_object_parent: p.h_object_parent,
            h_object_new: p.h_object_new,
            h_class: p.h_class,
            p_alloc_parms: p.p_alloc_parms,
            params_size: None,
            is_nvos64: true,
            alloc_parms_offset: offset_of!(Nvos64Parameters, p_alloc_parms),
        }
    }
}

impl RmAllocLayout for R535 {
    type Nvos21 = Nvos21ParametersR535;
    type Nvos64 = Nvos64ParametersR535;

    fn from_nvos21(p: &Nvos21ParametersR535) -> RmAllocRequest {
        RmAllocRequest {
            h_root: p.h_root,
            h_object_parent: p.h_object_parent,
            h_object_new: p.h_object_new,
            h_class: p.h_class,
            p_alloc_parms: p.p_alloc_parms,
            params_size: Some(p.params_size),
            is_nvos64: false,
            alloc_parms_offset: offset_of!(Nvos21ParametersR535, p_alloc_parms),
        }
    }

    fn from_nvos64(p: &Nvos64ParametersR535) -> RmAllocRequest {
        RmAllocRequest {
            h_root: p.h_root,
            h_object_parent: p.h_object_parent,
            h_object_new: p.h_object_new,
            h_class: p.h_class,
            p_alloc_parms: p.p_alloc_parms,
            params_size: Some(p.params_size),
            is_nvos64: true,
            alloc_parms_offset: offset_of!(Nvos64ParametersR535, p_alloc_parms),
        }
    }
}

/// Second-level lookup: `hClass` selects the allocation-class handler.
pub fn rm_alloc<L: RmAllocLayout>(fi: &mut FrontendIoctlState<'_>) -> IoctlResult {
    let len = fi.payload.len();
    let req = if len == size_of::<L::Nvos21>() {
        nvgpu::read_params::<L::Nvos21>(fi.payload).map(|p| L::from_nvos21(&p))
    } else if len == size_of::<L::Nvos64>() {
        nvgpu::read_params::<L::Nvos64>(fi.payload).map(|p| L::from_nvos64(&p))
    } else {
        None
    }
    .ok_or_else(|| invalid("payload is neither NVOS21 nor NVOS64"))?;

    let proxy = fi.proxy;
    let handler = proxy.select(IoctlClass::AllocationClass, req.h_class, &proxy.table.allocation_class)?;
    (handler.func())(fi, &req)
}

/// Allocation whose parameter block holds no pointers or fds. Unlike the
/// simple frontend and control handlers this needs `P` to know the size.
pub fn rm_alloc_simple<P: Pod>(fi: &mut FrontendIoctlState<'_>, req: &RmAllocRequest) -> IoctlResult {
    if req.p_alloc_parms == 0 {
        return fi.invoke();
    }
    if let Some(size) = req.params_size {
        if size as usize != size_of::<P>() {
            return Err(invalid("params_size does not match allocation class"));
        }
    }
    let mut params: P = copy_in_params(fi.driver(), req.p_alloc_parms)?;
    let n = fi.invoke_nested(req.alloc_parms_offset, &mut params)?;
    copy_out_params(fi.driver(), req.p_alloc_parms, &params)?;
    Ok(n)
}

pub fn rm_alloc_no_params(fi: &mut FrontendIoctlState<'_>, _req: &RmAllocRequest) -> IoctlResult {
    fi.invoke()
}

/// `data` names one of the guest's driver fds; the host sees its own fd
/// and the guest gets its fd back.
pub fn rm_alloc_event_os_event(fi: &mut FrontendIoctlState<'_>, req: &RmAllocRequest) -> IoctlResult {
    if req.p_alloc_parms == 0 {
        return Err(invalid("event allocation without parameters"));
    }
    let params: Nv0005AllocParameters = copy_in_params(fi.driver(), req.p_alloc_parms)?;
    let host_fd = fi
        .driver()
        .translate_fd(params.data as i32)
        .ok_or_else(|| invalid("event fd is not a driver fd"))?;
    let mut host = Nv0005AllocParameters { data: host_fd as u64, ..params };
    let n = fi.invoke_nested(req.alloc_parms_offset, &mut host)?;
    copy_out_params(fi.driver(), req.p_alloc_parms, &Nv0005AllocParameters { data: params.data, ..host })?;
    Ok(n)
}
