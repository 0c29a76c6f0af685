// SPDX-License-Identifier: Apache-2.0

//! Type-safe ioctl bindings for the rawrabbit character device.
//!
//! The operation codes below are declared in the driver's `rawrabbit.h`
//! and must match it bit-for-bit; renumbering anything here breaks the
//! ABI silently.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::raw::c_void;
use std::path::Path;

use iocuddle::*;

use super::Control;
use crate::types::{Devsel, Iocmd, PageFrames};

/// Default path of the rawrabbit device node.
pub const DEVICE_PATH: &str = "/dev/rawrabbit";

// "random or so", per the driver header.
const RR: Group = Group::new(b'4');

/// Bind the driver to a PCI device. Encoded `_IOW` in the header, but
/// the driver updates the descriptor with the device it settled on.
pub const DEVSEL: Ioctl<WriteRead, &Devsel> = unsafe { RR.write::<Devsel>(0).lie() };

/// Query the descriptor of the device the driver is bound to.
pub const DEVGET: Ioctl<Read, &Devsel> = unsafe { RR.read(1) };

/// Perform one register or memory read.
pub const READ: Ioctl<WriteRead, &Iocmd> = unsafe { RR.write_read(2) };

/// Perform one register or memory write.
pub const WRITE: Ioctl<Write, &Iocmd> = unsafe { RR.write(3) };

// The remaining requests are `_IO('4', n)` in the header: direction
// and size bits are zero, so their raw codes are 0x3400 | n.

/// Block until the device raises an interrupt.
pub const IRQWAIT: Ioctl<Write, c_void> = unsafe { Ioctl::classic(0x3404) };

/// Enable interrupt delivery for this file handle.
pub const IRQENA: Ioctl<Write, c_void> = unsafe { Ioctl::classic(0x3405) };

/// Return the DMA buffer size, in bytes, as the ioctl return value.
pub const GETDMASIZE: Ioctl<Write, c_void> = unsafe { Ioctl::classic(0x3406) };

/// Fetch the page list backing the DMA buffer.
///
/// `RR_GETPLIST` is encoded `_IO` in the header even though the driver
/// writes the list through the argument pointer.
pub const GETPLIST: Ioctl<Read, &PageFrames> = unsafe { Ioctl::classic(0x3407) };

/// A handle to the rawrabbit control device node.
#[derive(Debug)]
pub struct RawrabbitControl(File);

impl RawrabbitControl {
    /// Open the default device node, [`DEVICE_PATH`].
    pub fn open() -> io::Result<Self> {
        Self::open_path(DEVICE_PATH)
    }

    /// Open a specific device node.
    pub fn open_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(RawrabbitControl(
            OpenOptions::new().read(true).write(true).open(path)?,
        ))
    }
}

impl Control for RawrabbitControl {
    fn devsel(&mut self, devsel: &mut Devsel) -> io::Result<()> {
        DEVSEL.ioctl(&mut self.0, devsel).map(drop)
    }

    fn devget(&mut self) -> io::Result<Devsel> {
        let (_, devsel) = DEVGET.ioctl(&mut self.0)?;
        Ok(devsel)
    }

    fn read(&mut self, cmd: &mut Iocmd) -> io::Result<()> {
        READ.ioctl(&mut self.0, cmd).map(drop)
    }

    fn write(&mut self, cmd: &Iocmd) -> io::Result<()> {
        WRITE.ioctl(&mut self.0, cmd).map(drop)
    }

    fn irq_wait(&mut self) -> io::Result<()> {
        IRQWAIT.ioctl(&mut self.0).map(drop)
    }

    fn irq_enable(&mut self) -> io::Result<()> {
        IRQENA.ioctl(&mut self.0).map(drop)
    }

    fn dma_size(&mut self) -> io::Result<u32> {
        GETDMASIZE.ioctl(&mut self.0)
    }

    fn plist(&mut self) -> io::Result<PageFrames> {
        let (_, frames) = GETPLIST.ioctl(&mut self.0)?;
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A file that is not the device node answers every rawrabbit request
    // with ENOTTY. Issuing the argument-less requests against one proves
    // the constants carry a callable encoding all the way to the kernel.
    #[test]
    fn argless_requests_reach_the_kernel() {
        let mut null = File::open("/dev/null").unwrap();
        for result in [
            IRQWAIT.ioctl(&mut null),
            IRQENA.ioctl(&mut null),
            GETDMASIZE.ioctl(&mut null),
        ] {
            assert_eq!(result.unwrap_err().raw_os_error(), Some(libc::ENOTTY));
        }
    }
}
