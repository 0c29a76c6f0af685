// SPDX-License-Identifier: Apache-2.0

//! Command-line poke tool for the rawrabbit driver, in the spirit of
//! the Python `rrcmd` utility shipped with it.

use std::process;

const USAGE: &str = "\
usage: rrcmd <command> [args]
  info
  bind <vendor:device[/subvendor:subdevice][@bus:devfn]>
  read <bar> <hex-offset> <width>
  write <bar> <hex-offset> <width> <hex-value>
  irqena
  irqwait
  dmasize
  plist

bar is 0, 2, 4 or c; width is 1, 2, 4 or 8 bytes";

fn usage() -> ! {
    eprintln!("{}", USAGE);
    process::exit(2);
}

#[cfg(target_os = "linux")]
fn run(args: &[String]) -> rawrabbit::Result<()> {
    use std::convert::TryFrom;

    use rawrabbit::{Bar, Device, Devsel, Error, Width};

    fn parse_hex(s: &str) -> rawrabbit::Result<u64> {
        let s = s.trim_start_matches("0x");
        u64::from_str_radix(s, 16).map_err(|_| Error::InvalidArgument)
    }

    fn parse_access(args: &[String]) -> rawrabbit::Result<(Bar, u32, Width)> {
        if args.len() < 3 {
            usage();
        }
        let bar = Bar::try_from(parse_hex(&args[0])? as u32)?;
        let offset = parse_hex(&args[1])? as u32;
        let width = args[2]
            .parse::<u32>()
            .map_err(|_| Error::InvalidArgument)
            .and_then(Width::try_from)?;
        Ok((bar, offset, width))
    }

    let mut device = Device::open()?;

    match args.first().map(String::as_str) {
        Some("info") => println!("bound to {}", device.info()?),
        Some("bind") => {
            let addr = args.get(1).unwrap_or_else(|| usage());
            let mut devsel: Devsel = addr.parse()?;
            device.bind(&mut devsel)?;
            println!("bound to {}", device.info()?);
        }
        Some("read") => {
            let (bar, offset, width) = parse_access(&args[1..])?;
            println!("{:#010x}", device.read(bar, offset, width)?);
        }
        Some("write") => {
            let (bar, offset, width) = parse_access(&args[1..])?;
            let value = parse_hex(args.get(4).unwrap_or_else(|| usage()))?;
            device.write(bar, offset, width, value)?;
        }
        Some("irqena") => device.enable_interrupts()?,
        Some("irqwait") => device.wait_interrupt()?,
        Some("dmasize") => println!("{:#x}", device.dma_size()?),
        Some("plist") => {
            for (index, address) in device.dma_pages()?.iter().enumerate() {
                println!("{:03}: {:#012x}", index, address);
            }
        }
        _ => usage(),
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    #[cfg(target_os = "linux")]
    {
        if let Err(error) = run(&args) {
            eprintln!("rrcmd: {} (errno {})", error, error.errno());
            process::exit(1);
        }
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = args;
        eprintln!("rrcmd: the rawrabbit driver only exists on Linux");
        process::exit(1);
    }
}
