// SPDX-License-Identifier: Apache-2.0

//! The transport boundary between the device API and the driver.
//!
//! Each trait method issues exactly one control request. Failures cross
//! the boundary as raw [`io::Error`]s so the OS error code reaches the
//! caller untouched; classification happens above, in
//! [`crate::Error`]. Implementing [`Control`] over something other than
//! the real device node (a register file in memory, a simulator) is the
//! supported way to run code against this crate without the driver.

use std::io;

use crate::types::{Devsel, Iocmd, PageFrames};

/// One method per rawrabbit control request.
pub trait Control {
    /// Bind the driver to the device matching `devsel`. The driver
    /// rewrites the descriptor with the device it actually bound.
    fn devsel(&mut self, devsel: &mut Devsel) -> io::Result<()>;

    /// Fetch the descriptor of the currently bound device.
    fn devget(&mut self) -> io::Result<Devsel>;

    /// Execute a read command; the driver fills the payload of `cmd`.
    fn read(&mut self, cmd: &mut Iocmd) -> io::Result<()>;

    /// Execute a write command.
    fn write(&mut self, cmd: &Iocmd) -> io::Result<()>;

    /// Block the calling thread until the device raises an interrupt.
    fn irq_wait(&mut self) -> io::Result<()>;

    /// Enable interrupt delivery for this handle.
    fn irq_enable(&mut self) -> io::Result<()>;

    /// Size of the driver's DMA buffer, in bytes.
    fn dma_size(&mut self) -> io::Result<u32>;

    /// Fetch the page list backing the DMA buffer.
    fn plist(&mut self) -> io::Result<PageFrames>;
}

/// The transport backed by the real device node.
#[cfg(target_os = "linux")]
#[path = "linux.rs"]
pub mod imp;
