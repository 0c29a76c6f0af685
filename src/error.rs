// SPDX-License-Identifier: Apache-2.0

//! Error types for rawrabbit device control.

use std::os::raw::c_int;
use std::{error, fmt, io};

/// A convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error conditions returned by the rawrabbit driver or by the layers
/// between it and this crate (i.e., the Linux kernel).
///
/// The driver reports every failure as an `errno` value; the kinds below
/// name the codes it actually raises. Anything else is carried through
/// unmapped in [`Error::Io`] so the numeric code is never lost.
#[derive(Debug)]
pub enum Error {
    /// Something went wrong when communicating with the "outside world"
    /// (kernel, device node) that does not map to a known driver error.
    Io(io::Error),

    /// The file descriptor does not refer to an open device node. (`EBADF`)
    InvalidHandle,

    /// The device is in use and cannot be rebound right now. (`EBUSY`)
    DeviceBusy,

    /// No device matched the selection descriptor, or the driver is not
    /// currently bound to one. (`ENODEV`)
    NoSuchDevice,

    /// The driver rejected the address or data size of a command. (`EINVAL`)
    InvalidArgument,

    /// A buffer crossing the ioctl boundary could not be accessed. (`EFAULT`)
    IoFault,

    /// A blocking wait was cut short by a signal. (`EINTR`)
    Interrupted,
}

impl Error {
    /// The error as a negated OS error code, following the C library
    /// convention of the original `rrlib` bindings.
    pub fn errno(&self) -> c_int {
        let raw = match self {
            Error::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
            Error::InvalidHandle => libc::EBADF,
            Error::DeviceBusy => libc::EBUSY,
            Error::NoSuchDevice => libc::ENODEV,
            Error::InvalidArgument => libc::EINVAL,
            Error::IoFault => libc::EFAULT,
            Error::Interrupted => libc::EINTR,
        };
        -raw
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let err_description = match self {
            Error::Io(_) => "I/O error",
            Error::InvalidHandle => "Device handle is invalid",
            Error::DeviceBusy => "Device is busy",
            Error::NoSuchDevice => "No matching device",
            Error::InvalidArgument => "Address or data size rejected by the driver",
            Error::IoFault => "Buffer was inaccessible to the driver",
            Error::Interrupted => "Wait was interrupted by a signal",
        };
        write!(f, "{}", err_description)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(error: io::Error) -> Error {
        match error.raw_os_error() {
            Some(libc::EBADF) => Error::InvalidHandle,
            Some(libc::EBUSY) => Error::DeviceBusy,
            Some(libc::ENODEV) => Error::NoSuchDevice,
            Some(libc::EINVAL) => Error::InvalidArgument,
            Some(libc::EFAULT) => Error::IoFault,
            Some(libc::EINTR) => Error::Interrupted,
            _ => Error::Io(error),
        }
    }
}

impl From<Error> for io::Error {
    #[inline]
    fn from(error: Error) -> io::Error {
        match error {
            Error::Io(e) => e,
            other => io::Error::from_raw_os_error(-other.errno()),
        }
    }
}

impl From<Error> for c_int {
    #[inline]
    fn from(error: Error) -> c_int {
        error.errno()
    }
}
