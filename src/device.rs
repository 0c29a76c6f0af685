// SPDX-License-Identifier: Apache-2.0

//! The device-control API, built on top of a [`Control`] transport.

use log::{debug, trace};

use crate::error::Result;
use crate::sys::Control;
use crate::types::{Bar, Devsel, Iocmd, Width, PAGE_SHIFT};

/// A handle to a rawrabbit-controlled device.
///
/// Every operation maps to exactly one driver request (the page-list
/// fetch to two) and carries no state besides the transport itself;
/// failures are surfaced to the caller uninterpreted and never retried.
#[derive(Debug)]
pub struct Device<C: Control> {
    ctl: C,
}

#[cfg(target_os = "linux")]
impl Device<crate::sys::imp::RawrabbitControl> {
    /// Open the default device node, `/dev/rawrabbit`.
    pub fn open() -> Result<Self> {
        Ok(Device {
            ctl: crate::sys::imp::RawrabbitControl::open()?,
        })
    }

    /// Open the device node at `path`.
    pub fn open_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Ok(Device {
            ctl: crate::sys::imp::RawrabbitControl::open_path(path)?,
        })
    }
}

impl<C: Control> Device<C> {
    /// Wrap an already-open transport.
    pub fn from_control(ctl: C) -> Self {
        Device { ctl }
    }

    /// Bind the driver to the device matching `devsel`.
    ///
    /// On success the driver has rewritten the descriptor with the
    /// device it actually bound, geographic fields included.
    pub fn bind(&mut self, devsel: &mut Devsel) -> Result<()> {
        debug!("binding to {}", devsel);
        self.ctl.devsel(devsel)?;
        debug!("bound to {}", devsel);
        Ok(())
    }

    /// The descriptor of the currently bound device.
    pub fn binding(&mut self) -> Result<Devsel> {
        Ok(self.ctl.devget()?)
    }

    /// The bound device formatted as
    /// `vendor:device/subvendor:subdevice@bus:devfn`.
    pub fn info(&mut self) -> Result<String> {
        Ok(self.binding()?.to_string())
    }

    /// Read `width` bytes at `offset` within `bar`.
    pub fn read(&mut self, bar: Bar, offset: u32, width: Width) -> Result<u64> {
        let mut cmd = Iocmd::read(bar, offset, width);
        self.ctl.read(&mut cmd)?;
        let value = cmd.value();
        trace!("read {:?}+{:#x} ({:?}) -> {:#x}", bar, offset, width, value);
        Ok(value)
    }

    /// Write `value`, truncated to `width` bytes, at `offset` within
    /// `bar`.
    pub fn write(&mut self, bar: Bar, offset: u32, width: Width, value: u64) -> Result<()> {
        trace!("write {:?}+{:#x} ({:?}) <- {:#x}", bar, offset, width, value);
        let cmd = Iocmd::write(bar, offset, width, value);
        self.ctl.write(&cmd)?;
        Ok(())
    }

    /// 4-byte read, the width nearly every board register uses.
    pub fn read32(&mut self, bar: Bar, offset: u32) -> Result<u32> {
        Ok(self.read(bar, offset, Width::Dword)? as u32)
    }

    /// 4-byte write.
    pub fn write32(&mut self, bar: Bar, offset: u32, value: u32) -> Result<()> {
        self.write(bar, offset, Width::Dword, value as u64)
    }

    /// Enable interrupt delivery for this handle.
    pub fn enable_interrupts(&mut self) -> Result<()> {
        debug!("enabling interrupts");
        Ok(self.ctl.irq_enable()?)
    }

    /// Block the calling thread until the device raises an interrupt.
    ///
    /// There is no timeout. The only way to abandon the wait is to
    /// close the device node from another thread, and what happens then
    /// is the driver's decision, not this crate's.
    pub fn wait_interrupt(&mut self) -> Result<()> {
        debug!("waiting for interrupt");
        self.ctl.irq_wait()?;
        debug!("interrupt received");
        Ok(())
    }

    /// Size of the driver's DMA buffer, in bytes.
    pub fn dma_size(&mut self) -> Result<u32> {
        Ok(self.ctl.dma_size()?)
    }

    /// Physical addresses of the pages backing the DMA buffer.
    ///
    /// This issues two driver requests: a size query, then the
    /// page-list fetch. The driver could remap the buffer between the
    /// two; callers that care must serialize remapping against this
    /// call themselves.
    pub fn dma_pages(&mut self) -> Result<Vec<u64>> {
        let size = self.ctl.dma_size()?;
        let frames = self.ctl.plist()?;
        let pages = (size >> PAGE_SHIFT) as usize;
        Ok(frames
            .0
            .iter()
            .take(pages)
            .map(|&pfn| (pfn as u64) << PAGE_SHIFT)
            .collect())
    }

    /// Consume the handle, returning the underlying transport.
    pub fn into_control(self) -> C {
        self.ctl
    }
}
