//! Raspberry Pi bring-up through spidev and the GPIO character device
//!
//! The display and the buttons each open their own handle on the GPIO chip,
//! so the input thread never shares a handle with the display path.

use std::process::Command;

use anyhow::{Context, Result};
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};
use log::{debug, info, warn};

use crate::config::{Builder, Config, Dimensions};
use crate::display::Display;
use crate::input::{InputMonitor, Pull};
use crate::interface::Interface;
use crate::settings::{HardwareSettings, InputSettings};
use crate::sink::EpdSink;

/// Concrete interface on the Pi
pub type PiInterface = Interface<SpidevDevice, CdevPin, CdevPin, CdevPin>;

/// Concrete sink on the Pi
pub type PiSink = EpdSink<PiInterface, Delay>;

const CONSUMER: &str = "eink-dashboard";

/// Panel configuration with the busy timeout from the settings file
pub fn panel_config(settings: &HardwareSettings) -> Result<Config> {
    Builder::new()
        .dimensions(Dimensions::EPD_2IN7)
        .busy_timeout_ms(settings.busy_timeout_ms)
        .build()
        .context("building panel configuration")
}

fn request_line(chip: &mut Chip, line: u32, flags: LineRequestFlags, role: &str) -> Result<CdevPin> {
    let handle = chip
        .get_line(line)
        .with_context(|| format!("getting {role} line {line}"))?
        .request(flags, 0, CONSUMER)
        .with_context(|| format!("requesting {role} line {line}"))?;
    CdevPin::new(handle).with_context(|| format!("creating {role} pin"))
}

/// Open the SPI bus and the control lines, wrapped in a sink
///
/// Nothing is sent to the controller until [`EpdSink::start`].
pub fn open_display(settings: &HardwareSettings, config: Config) -> Result<PiSink> {
    let mut spi = SpidevDevice::open(&settings.spi_device)
        .with_context(|| format!("opening SPI device {}", settings.spi_device.display()))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(settings.spi_speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options).context("configuring SPI")?;

    let mut chip = Chip::new(&settings.gpio_chip)
        .with_context(|| format!("opening GPIO chip {}", settings.gpio_chip.display()))?;
    let rst = request_line(&mut chip, settings.rst_pin, LineRequestFlags::OUTPUT, "RST")?;
    let dc = request_line(&mut chip, settings.dc_pin, LineRequestFlags::OUTPUT, "DC")?;
    let busy = request_line(&mut chip, settings.busy_pin, LineRequestFlags::INPUT, "BUSY")?;

    info!(
        "Opened {} at {} Hz (RST={}, DC={}, BUSY={})",
        settings.spi_device.display(),
        settings.spi_speed_hz,
        settings.rst_pin,
        settings.dc_pin,
        settings.busy_pin
    );
    let interface = Interface::new(spi, dc, rst, busy);
    Ok(EpdSink::new(Display::new(interface, config), Delay {}))
}

/// Set the bias of one line with the first tool that works
///
/// The character device ABI in use has no bias flags, so this goes through
/// the firmware tools. Returns false when none of them succeeded.
fn apply_pull(line: u32, pull: Pull) -> bool {
    let commands = pull.commands(line);
    if commands.is_empty() {
        return true;
    }
    for (program, args) in commands {
        match Command::new(program).args(&args).status() {
            Ok(status) if status.success() => {
                debug!("{program} {}", args.join(" "));
                return true;
            }
            Ok(status) => debug!("{program} exited with {status}"),
            Err(e) => debug!("Cannot run {program}: {e}"),
        }
    }
    false
}

/// Bias the four key lines per the settings, then claim them as inputs
pub fn open_buttons(hardware: &HardwareSettings, input: &InputSettings) -> Result<InputMonitor<CdevPin>> {
    for line in input.pins {
        if !apply_pull(line, input.pull) {
            warn!("Could not set {:?} bias on line {line}; the key may read as pressed", input.pull);
        }
    }
    let mut chip = Chip::new(&hardware.gpio_chip)
        .with_context(|| format!("opening GPIO chip {}", hardware.gpio_chip.display()))?;
    let [k1, k2, k3, k4] = input.pins;
    let pins = [
        request_line(&mut chip, k1, LineRequestFlags::INPUT, "KEY1")?,
        request_line(&mut chip, k2, LineRequestFlags::INPUT, "KEY2")?,
        request_line(&mut chip, k3, LineRequestFlags::INPUT, "KEY3")?,
        request_line(&mut chip, k4, LineRequestFlags::INPUT, "KEY4")?,
    ];
    info!("Watching keys on lines {:?} (pull {:?})", input.pins, input.pull);
    Ok(InputMonitor::new(pins, input.debounce()))
}
