// SPDX-License-Identifier: Apache-2.0

//! Tests that talk to a real `/dev/rawrabbit` node. They are ignored
//! unless the driver is loaded (or the `hw_tests` feature forces them).

#![cfg(target_os = "linux")]

use rawrabbit::{Bar, Device, Width, PAGE_SHIFT};

use serial_test::serial;

#[cfg_attr(not(has_rawrabbit), ignore)]
#[test]
#[serial]
fn open_and_query_binding() {
    let mut device = Device::open().unwrap();
    let info = device.info().unwrap();
    // vendor:device/subvendor:subdevice@bus:devfn
    assert_eq!(info.len(), "0000:0000/0000:0000@0000:0000".len());
}

#[cfg_attr(not(has_rawrabbit), ignore)]
#[test]
#[serial]
fn dma_buffer_is_page_aligned() {
    let mut device = Device::open().unwrap();
    let size = device.dma_size().unwrap();
    assert!(size > 0);
    assert_eq!(size % (1 << PAGE_SHIFT), 0);

    let pages = device.dma_pages().unwrap();
    assert_eq!(pages.len(), (size >> PAGE_SHIFT) as usize);
    for address in pages {
        assert_eq!(address % (1 << PAGE_SHIFT), 0);
    }
}

#[cfg_attr(not(has_rawrabbit), ignore)]
#[test]
#[serial]
fn gn4124_interrupt_status_is_readable() {
    let mut device = Device::open().unwrap();
    device.read(Bar::Bar4, 0x814, Width::Dword).unwrap();
}

#[cfg_attr(not(has_rawrabbit), ignore)]
#[test]
#[serial]
fn dma_buffer_round_trips_through_ioctl() {
    let mut device = Device::open().unwrap();
    // the DMA buffer window is plain host memory, safe to scribble on
    device.write32(Bar::DmaBuffer, 0x0, 0xdead_face).unwrap();
    assert_eq!(device.read32(Bar::DmaBuffer, 0x0).unwrap(), 0xdead_face);
}
