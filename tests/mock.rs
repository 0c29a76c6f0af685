// SPDX-License-Identifier: Apache-2.0

//! Exercises the device API against an in-memory implementation of the
//! driver's control requests.

use std::collections::HashMap;
use std::convert::TryFrom;
use std::io;

use rawrabbit::sys::Control;
use rawrabbit::{Bar, Device, Devsel, Error, Iocmd, PageFrames, Width, DEVSEL_UNUSED, PLIST_LEN};

const DMA_SIZE: u32 = 1 << 20;
const FIRST_FRAME: libc::c_ulong = 0x1_0000;

/// A register file standing in for the driver and the board behind it.
struct MockControl {
    regs: HashMap<u32, u64>,
    bound: Option<Devsel>,
    irq_enabled: bool,
    irq_pending: u32,
    closed: bool,
}

impl MockControl {
    fn new() -> Self {
        MockControl {
            regs: HashMap::new(),
            bound: None,
            irq_enabled: false,
            irq_pending: 0,
            closed: false,
        }
    }

    /// What the driver does when an interrupt line fires: nothing,
    /// unless delivery was enabled first.
    fn raise_interrupt(&mut self) {
        if self.irq_enabled {
            self.irq_pending += 1;
        }
    }

    fn check_open(&self) -> io::Result<()> {
        if self.closed {
            Err(io::Error::from_raw_os_error(libc::EBADF))
        } else {
            Ok(())
        }
    }

    fn check_cmd(cmd: &Iocmd) -> io::Result<()> {
        match cmd.datasize {
            1 | 2 | 4 | 8 => Ok(()),
            _ => Err(io::Error::from_raw_os_error(libc::EINVAL)),
        }
    }
}

impl Control for MockControl {
    fn devsel(&mut self, devsel: &mut Devsel) -> io::Result<()> {
        self.check_open()?;
        if devsel.vendor != rawrabbit::DEFAULT_VENDOR || devsel.device != rawrabbit::DEFAULT_DEVICE
        {
            return Err(io::Error::from_raw_os_error(libc::ENODEV));
        }
        // fill in the geographic fields like a real bind would
        devsel.bus = 0x0020;
        devsel.devfn = 0x0000;
        self.bound = Some(*devsel);
        Ok(())
    }

    fn devget(&mut self) -> io::Result<Devsel> {
        self.check_open()?;
        self.bound
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENODEV))
    }

    fn read(&mut self, cmd: &mut Iocmd) -> io::Result<()> {
        self.check_open()?;
        Self::check_cmd(cmd)?;
        let value = self.regs.get(&cmd.address).copied().unwrap_or(0);
        cmd.set_value(value);
        Ok(())
    }

    fn write(&mut self, cmd: &Iocmd) -> io::Result<()> {
        self.check_open()?;
        Self::check_cmd(cmd)?;
        self.regs.insert(cmd.address, cmd.value());
        Ok(())
    }

    fn irq_wait(&mut self) -> io::Result<()> {
        self.check_open()?;
        if self.irq_pending == 0 {
            // the real driver would block here; the mock fails instead,
            // so a wait that would have returned early is caught
            return Err(io::Error::from_raw_os_error(libc::EAGAIN));
        }
        self.irq_pending -= 1;
        Ok(())
    }

    fn irq_enable(&mut self) -> io::Result<()> {
        self.check_open()?;
        self.irq_enabled = true;
        Ok(())
    }

    fn dma_size(&mut self) -> io::Result<u32> {
        self.check_open()?;
        Ok(DMA_SIZE)
    }

    fn plist(&mut self) -> io::Result<PageFrames> {
        self.check_open()?;
        let mut frames = PageFrames::default();
        for (index, frame) in frames.0.iter_mut().enumerate() {
            *frame = FIRST_FRAME + index as libc::c_ulong;
        }
        Ok(frames)
    }
}

fn device() -> Device<MockControl> {
    Device::from_control(MockControl::new())
}

#[test]
fn write_then_read_round_trips_every_width() {
    let mut device = device();
    let value = 0xdead_face_0123_4567u64;

    for &width in Width::ALL.iter() {
        device.write(Bar::Bar4, 0xa08, width, value).unwrap();
        let read_back = device.read(Bar::Bar4, 0xa08, width).unwrap();
        assert_eq!(read_back, value & width.mask(), "width {:?}", width);
    }
}

#[test]
fn reads_of_untouched_addresses_return_zero() {
    let mut device = device();
    assert_eq!(device.read32(Bar::Bar0, 0x8).unwrap(), 0);
}

#[test]
fn writes_do_not_alias_across_bars() {
    let mut device = device();
    device.write32(Bar::Bar0, 0x100, 0x1111_1111).unwrap();
    device.write32(Bar::Bar4, 0x100, 0x4444_4444).unwrap();
    assert_eq!(device.read32(Bar::Bar0, 0x100).unwrap(), 0x1111_1111);
    assert_eq!(device.read32(Bar::Bar4, 0x100).unwrap(), 0x4444_4444);
}

#[test]
fn dma_size_is_idempotent() {
    let mut device = device();
    let first = device.dma_size().unwrap();
    let second = device.dma_size().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, DMA_SIZE);
}

#[test]
fn page_list_matches_dma_size() {
    let mut device = device();
    let size = device.dma_size().unwrap();
    let pages = device.dma_pages().unwrap();

    assert_eq!(pages.len(), (size >> rawrabbit::PAGE_SHIFT) as usize);
    assert_eq!(pages.len(), PLIST_LEN);

    // frames come back as physical addresses
    assert_eq!(pages[0], (FIRST_FRAME as u64) << rawrabbit::PAGE_SHIFT);
    assert_eq!(pages[1] - pages[0], 1 << rawrabbit::PAGE_SHIFT);
}

#[test]
fn closed_handle_fails_with_ebadf() {
    let mut ctl = MockControl::new();
    ctl.closed = true;
    let mut device = Device::from_control(ctl);

    let err = device.dma_size().unwrap_err();
    assert!(matches!(err, Error::InvalidHandle));
    assert_eq!(err.errno(), -libc::EBADF);

    assert!(device.read32(Bar::Bar0, 0).is_err());
    assert!(device.enable_interrupts().is_err());
    assert!(device.binding().is_err());
}

#[test]
fn interrupt_wait_does_not_return_before_signal() {
    let mut device = device();
    device.enable_interrupts().unwrap();

    let err = device.wait_interrupt().unwrap_err();
    assert_eq!(err.errno(), -libc::EAGAIN);

    // signal the interrupt, then wait again
    let mut ctl = device.into_control();
    ctl.raise_interrupt();
    let mut device = Device::from_control(ctl);

    device.wait_interrupt().unwrap();
    assert!(device.wait_interrupt().is_err());
}

#[test]
fn interrupts_are_dropped_until_enabled() {
    let mut ctl = MockControl::new();
    ctl.raise_interrupt();
    assert_eq!(ctl.irq_pending, 0);

    ctl.irq_enable().unwrap();
    ctl.raise_interrupt();
    assert_eq!(ctl.irq_pending, 1);
}

#[test]
fn bind_fills_geographic_fields() {
    let mut device = device();
    let mut devsel = Devsel::gennum();
    assert_eq!(devsel.bus, DEVSEL_UNUSED);

    device.bind(&mut devsel).unwrap();
    assert_eq!(devsel.bus, 0x0020);
    assert_eq!(devsel.devfn, 0x0000);

    assert_eq!(device.binding().unwrap(), devsel);
    assert_eq!(device.info().unwrap(), "1a39:0004/ffff:ffff@0020:0000");
}

#[test]
fn bind_to_absent_device_fails() {
    let mut device = device();
    let mut devsel: Devsel = "10ee:0666".parse().unwrap();
    let err = device.bind(&mut devsel).unwrap_err();
    assert!(matches!(err, Error::NoSuchDevice));
}

#[test]
fn binding_query_before_bind_fails() {
    let mut device = device();
    assert!(matches!(
        device.binding().unwrap_err(),
        Error::NoSuchDevice
    ));
}

#[test]
fn invalid_widths_never_reach_the_transport() {
    // rejected at the type boundary, before any control request
    assert!(matches!(
        Width::try_from(0).unwrap_err(),
        Error::InvalidArgument
    ));
    assert!(matches!(
        Width::try_from(3).unwrap_err(),
        Error::InvalidArgument
    ));
}

#[test]
fn transport_level_einval_propagates_unchanged() {
    // a hand-built command with a size the driver rejects
    let mut ctl = MockControl::new();
    let mut cmd = Iocmd::read(Bar::Bar4, 0xa08, Width::Dword);
    cmd.datasize = 3;

    let err = ctl.read(&mut cmd).unwrap_err();
    assert_eq!(err.raw_os_error(), Some(libc::EINVAL));

    cmd.datasize = 0;
    let err = ctl.write(&cmd).unwrap_err();
    assert_eq!(err.raw_os_error(), Some(libc::EINVAL));
}
