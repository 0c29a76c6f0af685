// SPDX-License-Identifier: Apache-2.0

//! The `rawrabbit` crate talks to the rawrabbit Linux driver for
//! GN4124-based PCIe carriers (the CERN "Gennum kit").
//!
//! The driver exports a single character device node, `/dev/rawrabbit`,
//! with a small ioctl surface: bind to a PCI device, query the binding,
//! read and write board registers or the DMA buffer, enable and wait
//! for interrupts, and describe the DMA buffer's backing pages. This
//! crate wraps that surface in a typed API while keeping the driver ABI
//! intact — the wire structures and the operation codes in [`sys`]
//! match the driver's `rawrabbit.h` bit-for-bit.
//!
//! ```no_run
//! use rawrabbit::{Bar, Device, Width};
//!
//! let mut device = Device::open()?;
//! println!("bound to {}", device.info()?);
//!
//! // GN4124 interrupt status register, as in the vendor DMA example.
//! let status = device.read(Bar::Bar4, 0x814, Width::Dword)?;
//! println!("INT status: {:#010x}", status);
//! # Ok::<(), rawrabbit::Error>(())
//! ```
//!
//! Every operation issues exactly one control request and surfaces
//! failures uninterpreted; retries and recovery are the caller's
//! business. [`Device::dma_pages`] is the one composite call (a size
//! query followed by the list fetch) and documents its race.
//!
//! Code that should run without the driver — tests, simulation — can
//! implement [`sys::Control`] over an in-memory register file and wrap
//! it with [`Device::from_control`].

#![deny(clippy::all)]
#![deny(missing_docs)]

mod device;
mod error;
mod types;

pub mod sys;

pub use device::Device;
pub use error::{Error, Result};
pub use types::{Bar, Data, Devsel, Iocmd, PageFrames, Width};
pub use types::{DEFAULT_DEVICE, DEFAULT_VENDOR, DEVSEL_UNUSED, PAGE_SHIFT, PLIST_LEN};
