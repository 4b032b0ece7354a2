//! Frame sinks
//!
//! The scheduler hands every finished frame to a [`FrameSink`]. On the
//! device that is an [`EpdSink`] wrapping the [`Display`] driver; headless
//! runs use the PNG writer from [`demo`](crate::demo) instead.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::info;

use crate::bitplane::Planes;
use crate::display::{Display, DisplayState};
use crate::error::Error;
use crate::interface::DisplayInterface;

/// What is being shown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo<'a> {
    /// Panel index
    pub index: usize,
    /// Number of panels in rotation
    pub total: usize,
    /// Panel title
    pub title: &'a str,
    /// Panel draws edge to edge without chrome
    pub fullbleed: bool,
}

impl FrameInfo<'_> {
    /// File-name friendly panel name: the title in lower case with spaces
    /// replaced, or `fullbleed` for chrome-less panels
    pub fn file_stem(&self) -> String {
        if self.fullbleed {
            return "fullbleed".into();
        }
        self.title.to_lowercase().replace(' ', "_")
    }
}

/// Destination for finished frames
pub trait FrameSink {
    /// Error reported by the sink
    type Error: fmt::Display;

    /// Present one frame; may block for the whole refresh
    fn show(&mut self, planes: &Planes, info: &FrameInfo<'_>) -> Result<(), Self::Error>;

    /// Leave the output in a resting state
    fn shutdown(&mut self) -> Result<(), Self::Error>;
}

/// Sink that drives the e-paper panel
pub struct EpdSink<I, D>
where
    I: DisplayInterface,
{
    display: Display<I>,
    delay: D,
}

impl<I, D> EpdSink<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    /// Wrap a driver and the delay it waits with
    pub fn new(display: Display<I>, delay: D) -> Self {
        Self { display, delay }
    }

    /// Initialize the controller and blank the panel
    ///
    /// # Errors
    ///
    /// Any driver error, typically [`Error::BusyTimeout`] on a dead panel.
    pub fn start(&mut self) -> Result<(), Error<I>> {
        self.display.initialize(&mut self.delay)?;
        self.display.clear(&mut self.delay)
    }

    /// The wrapped driver
    pub fn display(&self) -> &Display<I> {
        &self.display
    }

    /// Give back the driver and delay
    pub fn release(self) -> (Display<I>, D) {
        (self.display, self.delay)
    }
}

impl<I, D> FrameSink for EpdSink<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    type Error = Error<I>;

    fn show(&mut self, planes: &Planes, info: &FrameInfo<'_>) -> Result<(), Self::Error> {
        info!(
            "Refreshing panel with {} ({}/{})",
            info.title,
            info.index + 1,
            info.total
        );
        self.display.display_planes(planes, &mut self.delay)
    }

    /// Blank the panel and put the controller to sleep
    ///
    /// Does nothing unless the controller is active.
    fn shutdown(&mut self) -> Result<(), Self::Error> {
        if self.display.state() != DisplayState::Active {
            return Ok(());
        }
        info!("Clearing panel before sleep");
        self.display.clear(&mut self.delay)?;
        self.display.sleep(&mut self.delay)
    }
}
