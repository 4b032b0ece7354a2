//! Tri-color e-paper dashboard for the Waveshare 2.7" e-Paper HAT (B) V1
//!
//! Renders a rotation of status panels onto the 264x176 black/white/red panel
//! of the HAT and switches between them with the four keys on its edge.
//!
//! ## Pipeline
//!
//! ```text
//! Panel --draws--> Compositor (two Gray8 layers, landscape)
//!                      | threshold + rotate
//!                      v
//!                  Planes (black + red bitplanes, portrait)
//!                      |
//!                      v
//!                  FrameSink --> EpdSink (Display driver over SPI)
//!                            \-> PngSink (files, `png` feature)
//! ```
//!
//! The [`Scheduler`](scheduler::Scheduler) drives the pipeline, alternating
//! between rendering a frame and polling for button events from the
//! [`InputMonitor`](input::InputMonitor).
//!
//! ## Features
//!
//! - `png` (default): headless [`PngSink`](demo::PngSink) and conversion from
//!   `image::RgbImage` into the dithering engine
//! - `linux`: spidev and GPIO character device bring-up for the Raspberry Pi
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use embedded_graphics::mono_font::ascii::FONT_10X20;
//! use embedded_graphics::prelude::Point;
//! use eink_dashboard::{Compositor, Config, Display, Interface, Layer};
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! let config = Config::epd2in7b();
//! let mut display = Display::new(Interface::new(MockSpi, MockPin, MockPin, MockPin), config.clone());
//! if display.initialize(&mut delay).is_err() {
//!     return;
//! }
//!
//! let mut frame = Compositor::new(&config);
//! frame.begin_frame();
//! frame.text(Point::new(4, 20), "Hello", &FONT_10X20, Layer::Black);
//! frame.text(Point::new(4, 50), "World", &FONT_10X20, Layer::Red);
//!
//! let _ = display.display_planes(&frame.finalize(), &mut delay);
//! let _ = display.sleep(&mut delay);
//! ```

/// Packed 1-bit ink planes
pub mod bitplane;
/// Grayscale drawing surface
pub mod canvas;
/// Tri-color palette and ink layers
pub mod color;
/// V1 controller command definitions
pub mod command;
/// Two-layer compositor
pub mod compositor;
/// Display configuration types and builder
pub mod config;
/// PNG output for headless runs
#[cfg(feature = "png")]
pub mod demo;
/// Display driver state machine
pub mod display;
/// Error-diffusion dithering to the tri-color palette
pub mod dither;
/// Error types for the driver
pub mod error;
/// Raspberry Pi bring-up
#[cfg(feature = "linux")]
pub mod hardware;
/// Button sampling and debouncing
pub mod input;
/// Hardware interface abstraction
pub mod interface;
/// Waveform tables
pub mod lut;
/// Dashboard panels
pub mod panels;
/// Coordinate rotation utilities
pub mod rotation;
/// Render/poll control loop
pub mod scheduler;
/// Runtime settings file
pub mod settings;
/// Frame destinations
pub mod sink;

pub use bitplane::{Bitplane, Planes};
pub use canvas::GrayCanvas;
pub use color::{Color, Layer, PALETTE};
pub use compositor::Compositor;
pub use config::{Builder, Config, Dimensions, PanelSetup, Rotation};
pub use display::{Display, DisplayState};
pub use error::{BuilderError, Error, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};
pub use interface::InterfaceError;
pub use interface::{DEFAULT_BUSY_TIMEOUT_MS, DisplayInterface, Interface};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use settings::{Settings, SettingsError};
pub use sink::{EpdSink, FrameInfo, FrameSink};
