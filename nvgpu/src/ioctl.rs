//! Linux `_IOC` request-code encoding.
//!
//! ```text
//!  31 30 29            16 15        8 7         0
//! ┌─────┬────────────────┬───────────┬───────────┐
//! │ dir │      size      │   type    │    nr     │
//! └─────┴────────────────┴───────────┴───────────┘
//! ```

pub const IOC_NRBITS: u32 = 8;
pub const IOC_TYPEBITS: u32 = 8;
pub const IOC_SIZEBITS: u32 = 14;
pub const IOC_DIRBITS: u32 = 2;

pub const IOC_NRSHIFT: u32 = 0;
pub const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
pub const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
pub const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

pub const IOC_NONE: u32 = 0;
pub const IOC_WRITE: u32 = 1;
pub const IOC_READ: u32 = 2;

const fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

/// `_IOC(dir, type, nr, size)`.
pub const fn ioc(dir: u32, typ: u32, nr: u32, size: u32) -> u32 {
    (dir << IOC_DIRSHIFT) | (size << IOC_SIZESHIFT) | (typ << IOC_TYPESHIFT) | (nr << IOC_NRSHIFT)
}

/// `_IOWR(type, nr, size)`.
pub const fn iowr(typ: u32, nr: u32, size: u32) -> u32 {
    ioc(IOC_READ | IOC_WRITE, typ, nr, size)
}

pub const fn ioc_nr(cmd: u32) -> u32 {
    (cmd >> IOC_NRSHIFT) & mask(IOC_NRBITS)
}

pub const fn ioc_type(cmd: u32) -> u32 {
    (cmd >> IOC_TYPESHIFT) & mask(IOC_TYPEBITS)
}

pub const fn ioc_size(cmd: u32) -> u32 {
    (cmd >> IOC_SIZESHIFT) & mask(IOC_SIZEBITS)
}

pub const fn ioc_dir(cmd: u32) -> u32 {
    (cmd >> IOC_DIRSHIFT) & mask(IOC_DIRBITS)
}
