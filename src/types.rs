// SPDX-License-Identifier: Apache-2.0

//! The Rust-flavored, FFI-friendly versions of the structures declared
//! in the driver's `rawrabbit.h` header.
//!
//! These cross the ioctl boundary verbatim, so their layout is an ABI:
//! field order, width and alignment must match the driver bit-for-bit.
//! The size assertions below lock that down.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use libc::c_ulong;
use static_assertions::const_assert;

use crate::error::Error;

/// Value of a [`Devsel`] field the driver must ignore while matching.
pub const DEVSEL_UNUSED: u16 = 0xffff;

/// PCI vendor ID of the default Gennum kit.
pub const DEFAULT_VENDOR: u16 = 0x1a39;

/// PCI device ID of the default Gennum kit.
pub const DEFAULT_DEVICE: u16 = 0x0004;

/// Number of entries in the page list copied out by `RR_GETPLIST`:
/// the driver's 1 MiB DMA buffer in 4 KiB pages.
pub const PLIST_LEN: usize = 256;

/// Shift turning a page frame number into a physical address.
pub const PAGE_SHIFT: u32 = 12;

/// The Rust-flavored version of `struct rr_devsel`, which tells the
/// driver which PCI device to bind to.
///
/// Fields left at [`DEVSEL_UNUSED`] do not participate in matching, so
/// a descriptor can select by vendor/device alone, narrow by subsystem
/// IDs, or pin a geographic slot with `bus`/`devfn`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Devsel {
    /// PCI vendor ID.
    pub vendor: u16,
    /// PCI device ID.
    pub device: u16,
    /// PCI subsystem vendor ID, or [`DEVSEL_UNUSED`].
    pub subvendor: u16,
    /// PCI subsystem device ID, or [`DEVSEL_UNUSED`].
    pub subdevice: u16,
    /// PCI bus number, or [`DEVSEL_UNUSED`].
    pub bus: u16,
    /// PCI device/function number, or [`DEVSEL_UNUSED`].
    pub devfn: u16,
}

const_assert!(std::mem::size_of::<Devsel>() == 12);

impl Devsel {
    /// A descriptor matching the default Gennum kit anywhere on the bus.
    pub fn gennum() -> Self {
        Devsel {
            vendor: DEFAULT_VENDOR,
            device: DEFAULT_DEVICE,
            subvendor: DEVSEL_UNUSED,
            subdevice: DEVSEL_UNUSED,
            bus: DEVSEL_UNUSED,
            devfn: DEVSEL_UNUSED,
        }
    }
}

impl fmt::Display for Devsel {
    /// `vendor:device/subvendor:subdevice@bus:devfn`, four hex digits per
    /// field, the same syntax [`FromStr`] parses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x}/{:04x}:{:04x}@{:04x}:{:04x}",
            self.vendor, self.device, self.subvendor, self.subdevice, self.bus, self.devfn
        )
    }
}

fn parse_pair(s: &str) -> Result<(u16, u16), Error> {
    let (a, b) = s.split_once(':').ok_or(Error::InvalidArgument)?;
    let a = u16::from_str_radix(a, 16).map_err(|_| Error::InvalidArgument)?;
    let b = u16::from_str_radix(b, 16).map_err(|_| Error::InvalidArgument)?;
    Ok((a, b))
}

impl FromStr for Devsel {
    type Err = Error;

    /// Parses `vendor:device[/subvendor:subdevice][@bus:devfn]`, all
    /// fields hexadecimal; absent groups become [`DEVSEL_UNUSED`].
    fn from_str(s: &str) -> Result<Self, Error> {
        let (s, geo) = match s.split_once('@') {
            Some((head, tail)) => (head, Some(tail)),
            None => (s, None),
        };
        let (id, sub) = match s.split_once('/') {
            Some((head, tail)) => (head, Some(tail)),
            None => (s, None),
        };

        let (vendor, device) = parse_pair(id)?;
        let (subvendor, subdevice) = match sub {
            Some(sub) => parse_pair(sub)?,
            None => (DEVSEL_UNUSED, DEVSEL_UNUSED),
        };
        let (bus, devfn) = match geo {
            Some(geo) => parse_pair(geo)?,
            None => (DEVSEL_UNUSED, DEVSEL_UNUSED),
        };

        Ok(Devsel {
            vendor,
            device,
            subvendor,
            subdevice,
            bus,
            devfn,
        })
    }
}

/// Transfer sizes the driver accepts for a single access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Width {
    /// 1-byte access.
    Byte = 1,
    /// 2-byte access.
    Word = 2,
    /// 4-byte access.
    Dword = 4,
    /// 8-byte access.
    Qword = 8,
}

impl Width {
    /// All widths, narrowest first.
    pub const ALL: [Width; 4] = [Width::Byte, Width::Word, Width::Dword, Width::Qword];

    /// Mask covering the bytes this width transfers.
    pub fn mask(self) -> u64 {
        match self {
            Width::Qword => u64::MAX,
            _ => (1u64 << (self as u32 * 8)) - 1,
        }
    }
}

impl TryFrom<u32> for Width {
    type Error = Error;

    /// Converts a byte count, rejecting anything the driver would
    /// answer with `EINVAL` before the command is ever issued.
    fn try_from(bytes: u32) -> Result<Self, Error> {
        match bytes {
            1 => Ok(Width::Byte),
            2 => Ok(Width::Word),
            4 => Ok(Width::Dword),
            8 => Ok(Width::Qword),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Address windows encoded in the top bits of [`Iocmd::address`].
///
/// BARs 0, 2 and 4 reach the board through the GN4124 bridge; the
/// fourth window addresses the driver's own DMA buffer instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Bar {
    /// BAR 0 (FPGA application registers).
    Bar0 = 0x0000_0000,
    /// BAR 2.
    Bar2 = 0x2000_0000,
    /// BAR 4 (GN4124 bridge registers).
    Bar4 = 0x4000_0000,
    /// The driver's DMA buffer window.
    DmaBuffer = 0xc000_0000,
}

impl Bar {
    /// Composes the driver address for `offset` within this window.
    pub fn address(self, offset: u32) -> u32 {
        self as u32 | offset
    }
}

impl TryFrom<u32> for Bar {
    type Error = Error;

    /// Converts a BAR number as the original tools spell it: 0, 2, 4,
    /// or 0xc for the DMA buffer.
    fn try_from(bar: u32) -> Result<Self, Error> {
        match bar {
            0x0 => Ok(Bar::Bar0),
            0x2 => Ok(Bar::Bar2),
            0x4 => Ok(Bar::Bar4),
            0xc => Ok(Bar::DmaBuffer),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Data payload of an [`Iocmd`], overlaid exactly like the anonymous
/// union in `struct rr_iocmd`.
#[repr(C)]
#[derive(Clone, Copy)]
pub union Data {
    /// 1-byte payload.
    pub data8: u8,
    /// 2-byte payload.
    pub data16: u16,
    /// 4-byte payload.
    pub data32: u32,
    /// 8-byte payload.
    pub data64: u64,
}

/// The Rust-flavored version of `struct rr_iocmd`: one register or
/// memory access through the driver.
///
/// For a read, `address` and `datasize` are inputs and the payload is
/// filled by the driver; for a write all three are inputs. Which union
/// member is live is decided by `datasize`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Iocmd {
    /// Window selector and offset, as composed by [`Bar::address`].
    pub address: u32,
    /// Transfer size in bytes; the driver accepts 1, 2, 4 or 8.
    pub datasize: u32,
    /// Data payload.
    pub data: Data,
}

const_assert!(std::mem::size_of::<Iocmd>() == 16);
const_assert!(std::mem::align_of::<Iocmd>() == 8);

impl Iocmd {
    /// A read command for `width` bytes at `offset` within `bar`.
    pub fn read(bar: Bar, offset: u32, width: Width) -> Self {
        Iocmd {
            address: bar.address(offset),
            datasize: width as u32,
            data: Data { data64: 0 },
        }
    }

    /// A write command carrying `value`, truncated to `width` bytes.
    pub fn write(bar: Bar, offset: u32, width: Width, value: u64) -> Self {
        let mut cmd = Iocmd::read(bar, offset, width);
        cmd.set_value(value);
        cmd
    }

    /// Stores `value` into the union member selected by `datasize`.
    pub fn set_value(&mut self, value: u64) {
        // Writing a union member is safe; every constructor initializes
        // the full 8 bytes first.
        match self.datasize {
            1 => self.data.data8 = value as u8,
            2 => self.data.data16 = value as u16,
            4 => self.data.data32 = value as u32,
            _ => self.data.data64 = value,
        }
    }

    /// The payload for the command's transfer size, widened to `u64`.
    pub fn value(&self) -> u64 {
        unsafe {
            match self.datasize {
                1 => self.data.data8 as u64,
                2 => self.data.data16 as u64,
                4 => self.data.data32 as u64,
                _ => self.data.data64,
            }
        }
    }
}

impl fmt::Debug for Iocmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iocmd")
            .field("address", &format_args!("{:#010x}", self.address))
            .field("datasize", &self.datasize)
            .field("data", &format_args!("{:#x}", self.value()))
            .finish()
    }
}

/// The fixed-size page list filled by `RR_GETPLIST`: one page frame
/// number per 4 KiB page of the DMA buffer.
///
/// Entries are frame numbers, not addresses; shift left by
/// [`PAGE_SHIFT`] to obtain the physical address of a page. Entries
/// past `dma_size >> PAGE_SHIFT` are not written by the driver.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PageFrames(pub [c_ulong; PLIST_LEN]);

impl Default for PageFrames {
    fn default() -> Self {
        PageFrames([0; PLIST_LEN])
    }
}
