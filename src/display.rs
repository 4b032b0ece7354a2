//! Core display operations
//!
//! [`Display`] is the protocol state machine for the V1 controller:
//!
//! ```text
//! Uninitialized --initialize()--> Active --sleep()--> Sleeping
//!                                   ^                    |
//!                                   +---initialize()-----+
//! ```
//!
//! [`display`](Display::display) and [`clear`](Display::clear) are only
//! accepted while `Active`. Every wait on the busy line is bounded by
//! [`Config::busy_timeout_ms`]; running past it yields
//! [`Error::BusyTimeout`].

use embedded_hal::delay::DelayNs;
use log::{debug, error, info};

use crate::bitplane::{Bitplane, Planes};
use crate::command::{
    BOOSTER_SOFT_START, DATA_START_TRANSMISSION_1, DATA_START_TRANSMISSION_2, DATA_STOP,
    DEEP_SLEEP, DEEP_SLEEP_CHECK, DISPLAY_REFRESH, PANEL_SETTING, PARTIAL_DISPLAY_REFRESH,
    PLL_CONTROL, POWER_OFF, POWER_ON, POWER_OPTIMIZATION, POWER_SETTING, TCON_RESOLUTION,
    VCM_DC_SETTING, VCOM_AND_DATA_INTERVAL_SETTING,
};
use crate::config::{Config, Dimensions, Rotation};
use crate::error::Error;
use crate::interface::DisplayInterface;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Pause between a data start command and its first byte
const DATA_START_PAUSE_MS: u32 = 2;

/// Protocol state of the controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayState {
    /// Power-on state; nothing has been sent
    #[default]
    Uninitialized,
    /// Reset, configured and waveforms loaded
    Active,
    /// In deep sleep; needs a reset to wake
    Sleeping,
}

/// Core display driver for the 2.7" (B) V1 panel
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Where the controller is in its lifecycle
    state: DisplayState,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    ///
    /// Nothing is sent until [`initialize`](Self::initialize).
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            state: DisplayState::Uninitialized,
        }
    }

    /// Reset the controller, configure it and upload the waveform tables
    ///
    /// Valid from any state; calling it again simply runs the full sequence
    /// once more. This is also the only way out of [`DisplayState::Sleeping`].
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        debug!("initializing display from {:?}", self.state);
        // Until the sequence completes the controller state is unknown
        self.state = DisplayState::Uninitialized;

        self.interface.reset(delay).map_err(Error::Interface)?;

        self.send_command(POWER_ON)?;
        self.wait_until_idle(delay)?;

        let setup = self.config.setup;
        self.command_with_data(PANEL_SETTING, &[setup.panel_setting])?;
        self.command_with_data(PLL_CONTROL, &[setup.pll])?;
        self.command_with_data(POWER_SETTING, &setup.power_setting)?;
        self.command_with_data(BOOSTER_SOFT_START, &setup.booster_soft_start)?;
        for pair in setup.power_optimization {
            self.command_with_data(POWER_OPTIMIZATION, &pair)?;
        }
        self.command_with_data(VCM_DC_SETTING, &[setup.vcm_dc])?;
        self.command_with_data(VCOM_AND_DATA_INTERVAL_SETTING, &[setup.vcom_data_interval])?;

        self.load_waveforms()?;

        self.command_with_data(PARTIAL_DISPLAY_REFRESH, &[0x00])?;

        self.state = DisplayState::Active;
        info!("display initialized");
        Ok(())
    }

    /// Upload the five waveform tables
    fn load_waveforms(&mut self) -> DisplayResult<I> {
        let waveforms = self.config.waveforms;
        for (command, table) in waveforms.upload_order() {
            debug!("uploading waveform {command:#04x} ({} bytes)", table.len());
            self.command_with_data(command, table)?;
        }
        Ok(())
    }

    /// Transmit both ink planes and run a full refresh
    ///
    /// Both planes must be at native size (176x264). Bytes go out one per
    /// transfer. Blocks until the refresh completes, typically 10-20 seconds.
    ///
    /// # Errors
    ///
    /// * [`Error::NotActive`] unless the display is `Active`
    /// * [`Error::PlaneSizeMismatch`] if a plane has the wrong size
    /// * [`Error::BusyTimeout`] if the refresh does not finish in time
    pub fn display<D: DelayNs>(
        &mut self,
        black: &Bitplane,
        red: &Bitplane,
        delay: &mut D,
    ) -> DisplayResult<I> {
        self.ensure_active()?;
        self.check_plane(black)?;
        self.check_plane(red)?;

        debug!("sending frame");
        self.send_resolution()?;
        self.write_plane(DATA_START_TRANSMISSION_1, black.as_bytes().iter().copied(), delay)?;
        self.write_plane(DATA_START_TRANSMISSION_2, red.as_bytes().iter().copied(), delay)?;
        self.refresh(delay)
    }

    /// [`display`](Self::display) for a bundled pair of planes
    pub fn display_planes<D: DelayNs>(&mut self, planes: &Planes, delay: &mut D) -> DisplayResult<I> {
        self.display(&planes.black, &planes.red, delay)
    }

    /// Blank both planes and refresh
    ///
    /// Streams zero bytes, so no frame buffer is needed.
    pub fn clear<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.ensure_active()?;

        debug!("clearing display");
        let size = self.config.dimensions.buffer_size();
        self.send_resolution()?;
        self.write_plane(DATA_START_TRANSMISSION_1, core::iter::repeat_n(0x00, size), delay)?;
        self.write_plane(DATA_START_TRANSMISSION_2, core::iter::repeat_n(0x00, size), delay)?;
        self.refresh(delay)
    }

    /// Power down and enter deep sleep
    ///
    /// Sleeping again is a no-op. Use [`initialize`](Self::initialize) to
    /// wake the controller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotActive`] if the display was never initialized.
    pub fn sleep<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        match self.state {
            DisplayState::Sleeping => return Ok(()),
            DisplayState::Uninitialized => {
                return Err(Error::NotActive { state: self.state });
            }
            DisplayState::Active => {}
        }

        let border = self.config.setup.vcom_data_interval_sleep;
        self.command_with_data(VCOM_AND_DATA_INTERVAL_SETTING, &[border])?;
        self.send_command(POWER_OFF)?;
        self.wait_until_idle(delay)?;
        self.command_with_data(DEEP_SLEEP, &[DEEP_SLEEP_CHECK])?;

        self.state = DisplayState::Sleeping;
        info!("display asleep");
        Ok(())
    }

    /// Current protocol state
    pub fn state(&self) -> DisplayState {
        self.state
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &Dimensions {
        &self.config.dimensions
    }

    /// Get display rotation
    pub fn rotation(&self) -> Rotation {
        self.config.rotation
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Give back the interface
    pub fn release(self) -> I {
        self.interface
    }

    fn ensure_active(&self) -> DisplayResult<I> {
        if self.state == DisplayState::Active {
            Ok(())
        } else {
            Err(Error::NotActive { state: self.state })
        }
    }

    fn check_plane(&self, plane: &Bitplane) -> DisplayResult<I> {
        let dims = self.config.dimensions;
        let expected = (u32::from(dims.cols), u32::from(dims.rows));
        if plane.size() == expected {
            Ok(())
        } else {
            Err(Error::PlaneSizeMismatch {
                expected,
                provided: plane.size(),
            })
        }
    }

    fn send_resolution(&mut self) -> DisplayResult<I> {
        let Dimensions { rows, cols } = self.config.dimensions;
        let [cols_hi, cols_lo] = cols.to_be_bytes();
        let [rows_hi, rows_lo] = rows.to_be_bytes();
        self.command_with_data(TCON_RESOLUTION, &[cols_hi, cols_lo, rows_hi, rows_lo])
    }

    fn write_plane<D, B>(&mut self, command: u8, bytes: B, delay: &mut D) -> DisplayResult<I>
    where
        D: DelayNs,
        B: Iterator<Item = u8>,
    {
        self.send_command(command)?;
        delay.delay_ms(DATA_START_PAUSE_MS);
        for byte in bytes {
            self.send_data(byte)?;
        }
        self.send_command(DATA_STOP)
    }

    fn refresh<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.send_command(DISPLAY_REFRESH)?;
        self.wait_until_idle(delay)?;
        debug!("refresh complete");
        Ok(())
    }

    /// Poll the busy line until idle or the configured ceiling passes
    fn wait_until_idle<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let timeout_ms = self.config.busy_timeout_ms;
        let poll_ms = self.config.busy_poll_ms.max(1);
        let mut waited_ms = 0u32;

        while self.interface.is_busy().map_err(Error::Interface)? {
            if timeout_ms > 0 && waited_ms >= timeout_ms {
                error!("display still busy after {waited_ms} ms");
                return Err(Error::BusyTimeout { waited_ms });
            }
            delay.delay_ms(poll_ms);
            waited_ms = waited_ms.saturating_add(poll_ms);
        }
        if waited_ms > 0 {
            debug!("busy for ~{waited_ms} ms");
        }
        Ok(())
    }

    fn command_with_data(&mut self, command: u8, data: &[u8]) -> DisplayResult<I> {
        self.send_command(command)?;
        for byte in data {
            self.send_data(*byte)?;
        }
        Ok(())
    }

    /// Send a command to the display controller
    fn send_command(&mut self, cmd: u8) -> DisplayResult<I> {
        self.interface.send_command(cmd).map_err(Error::Interface)
    }

    /// Send one data byte to the display controller
    fn send_data(&mut self, data: u8) -> DisplayResult<I> {
        self.interface.send_data(data).map_err(Error::Interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;

    #[derive(Debug)]
    struct MockInterface {
        commands: Vec<u8>,
        data: Vec<u8>,
        command_data: Vec<(u8, Vec<u8>)>,
        resets: u32,
        /// Number of busy samples before the line reports idle
        busy_samples: u32,
        /// Never report idle
        stuck: bool,
        polls: u32,
    }

    impl MockInterface {
        fn new() -> Self {
            Self {
                commands: Vec::new(),
                data: Vec::new(),
                command_data: Vec::new(),
                resets: 0,
                busy_samples: 0,
                stuck: false,
                polls: 0,
            }
        }
    }

    impl DisplayInterface for MockInterface {
        type Error = core::convert::Infallible;

        fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.commands.push(command);
            self.command_data.push((command, Vec::new()));
            Ok(())
        }

        fn send_data(&mut self, data: u8) -> Result<(), Self::Error> {
            self.data.push(data);
            if let Some((_, bytes)) = self.command_data.last_mut() {
                bytes.push(data);
            }
            Ok(())
        }

        fn reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
            self.resets += 1;
            Ok(())
        }

        fn is_busy(&mut self) -> Result<bool, Self::Error> {
            self.polls += 1;
            if self.stuck {
                return Ok(true);
            }
            if self.busy_samples > 0 {
                self.busy_samples -= 1;
                return Ok(true);
            }
            Ok(false)
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ms: u32,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += ns / 1_000_000;
        }
        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms;
        }
    }

    fn test_display() -> Display<MockInterface> {
        Display::new(MockInterface::new(), Config::epd2in7b())
    }

    fn active_display() -> Display<MockInterface> {
        let mut display = test_display();
        display.initialize(&mut MockDelay::default()).unwrap();
        display
    }

    fn native_planes() -> Planes {
        Planes::new(176, 264)
    }

    fn payload(display: &Display<MockInterface>, command: u8) -> Vec<Vec<u8>> {
        display
            .interface
            .command_data
            .iter()
            .filter(|(cmd, _)| *cmd == command)
            .map(|(_, data)| data.clone())
            .collect()
    }

    #[test]
    fn test_new_display_is_uninitialized() {
        let display = test_display();
        assert_eq!(display.state(), DisplayState::Uninitialized);
        assert!(display.interface.commands.is_empty());
    }

    #[test]
    fn test_initialize_sequence() {
        let display = active_display();
        assert_eq!(display.state(), DisplayState::Active);
        assert_eq!(display.interface.resets, 1);
        assert_eq!(
            display.interface.commands,
            vec![
                0x04, 0x00, 0x30, 0x01, 0x06, 0xF8, 0xF8, 0xF8, 0xF8, 0xF8, 0x82, 0x50, 0x20,
                0x21, 0x22, 0x23, 0x24, 0x16,
            ]
        );
        assert_eq!(payload(&display, POWER_SETTING), vec![vec![0x03, 0x00, 0x2B, 0x2B, 0x09]]);
        assert_eq!(payload(&display, POWER_OPTIMIZATION)[3], vec![0x93, 0x2A]);
        assert_eq!(payload(&display, 0x20)[0].len(), 44);
        assert_eq!(payload(&display, 0x23)[0], crate::lut::LUT_BB.to_vec());
        assert_eq!(payload(&display, 0x24)[0], crate::lut::LUT_WB.to_vec());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut display = active_display();
        let first = display.interface.command_data.clone();
        display.interface.command_data.clear();

        display.initialize(&mut MockDelay::default()).unwrap();
        assert_eq!(display.state(), DisplayState::Active);
        assert_eq!(display.interface.command_data, first);
        assert_eq!(display.interface.resets, 2);

        display
            .display_planes(&native_planes(), &mut MockDelay::default())
            .unwrap();
    }

    #[test]
    fn test_display_requires_initialize() {
        let mut display = test_display();
        let planes = native_planes();
        let result = display.display_planes(&planes, &mut MockDelay::default());
        assert!(matches!(
            result,
            Err(Error::NotActive {
                state: DisplayState::Uninitialized
            })
        ));
        assert!(display.interface.commands.is_empty());
    }

    #[test]
    fn test_display_rejected_while_sleeping() {
        let mut display = active_display();
        display.sleep(&mut MockDelay::default()).unwrap();
        let sent = display.interface.commands.len();

        let result = display.display_planes(&native_planes(), &mut MockDelay::default());
        assert!(matches!(
            result,
            Err(Error::NotActive {
                state: DisplayState::Sleeping
            })
        ));
        assert_eq!(display.interface.commands.len(), sent);
    }

    #[test]
    fn test_initialize_wakes_from_sleep() {
        let mut display = active_display();
        display.sleep(&mut MockDelay::default()).unwrap();
        display.initialize(&mut MockDelay::default()).unwrap();
        assert_eq!(display.state(), DisplayState::Active);
    }

    #[test]
    fn test_display_sends_every_byte_individually() {
        let mut display = active_display();
        display.interface.commands.clear();
        display.interface.command_data.clear();
        display.interface.data.clear();

        let mut planes = native_planes();
        planes.black.set(0, 0, true);
        planes.red.set(175, 263, true);
        display
            .display_planes(&planes, &mut MockDelay::default())
            .unwrap();

        assert_eq!(display.interface.commands, vec![0x61, 0x10, 0x11, 0x13, 0x11, 0x12]);
        assert_eq!(payload(&display, TCON_RESOLUTION), vec![vec![0x00, 0xB0, 0x01, 0x08]]);

        let black = &payload(&display, DATA_START_TRANSMISSION_1)[0];
        let red = &payload(&display, DATA_START_TRANSMISSION_2)[0];
        assert_eq!(black.len(), 5808);
        assert_eq!(red.len(), 5808);
        assert_eq!(black[0], 0x80);
        assert_eq!(red[5807], 0x01);
        // 4 resolution bytes plus both planes, one call per byte
        assert_eq!(display.interface.data.len(), 4 + 2 * 5808);
    }

    #[test]
    fn test_display_idle_busy_does_not_wait() {
        let mut display = active_display();
        let mut delay = MockDelay::default();
        display.display_planes(&native_planes(), &mut delay).unwrap();
        // Only the two data start pauses
        assert!(delay.total_ms < display.config().busy_poll_ms);
        assert_eq!(delay.total_ms, 2 * DATA_START_PAUSE_MS);
    }

    #[test]
    fn test_busy_wait_polls_until_idle() {
        let mut display = active_display();
        display.interface.busy_samples = 3;
        display.interface.polls = 0;
        let mut delay = MockDelay::default();
        display.display_planes(&native_planes(), &mut delay).unwrap();
        assert_eq!(display.interface.polls, 4);
        assert_eq!(delay.total_ms, 2 * DATA_START_PAUSE_MS + 300);
    }

    #[test]
    fn test_busy_timeout_is_reported() {
        let config = Builder::new()
            .dimensions(Dimensions::EPD_2IN7)
            .busy_timeout_ms(500)
            .build()
            .unwrap();
        let mut display = Display::new(MockInterface::new(), config);
        display.interface.stuck = true;

        let result = display.initialize(&mut MockDelay::default());
        assert!(matches!(result, Err(Error::BusyTimeout { waited_ms: 500 })));
        assert_eq!(display.state(), DisplayState::Uninitialized);
    }

    #[test]
    fn test_plane_size_mismatch() {
        let mut display = active_display();
        let landscape = Planes::new(264, 176);
        let result = display.display_planes(&landscape, &mut MockDelay::default());
        assert!(matches!(
            result,
            Err(Error::PlaneSizeMismatch {
                expected: (176, 264),
                provided: (264, 176)
            })
        ));
    }

    #[test]
    fn test_clear_streams_zeros() {
        let mut display = active_display();
        display.interface.command_data.clear();
        display.clear(&mut MockDelay::default()).unwrap();

        let black = &payload(&display, DATA_START_TRANSMISSION_1)[0];
        let red = &payload(&display, DATA_START_TRANSMISSION_2)[0];
        assert_eq!(black.len(), 5808);
        assert!(black.iter().chain(red.iter()).all(|byte| *byte == 0));
        assert_eq!(payload(&display, DISPLAY_REFRESH).len(), 1);
    }

    #[test]
    fn test_sleep_sequence() {
        let mut display = active_display();
        display.interface.commands.clear();
        display.interface.command_data.clear();
        display.sleep(&mut MockDelay::default()).unwrap();

        assert_eq!(display.interface.commands, vec![0x50, 0x02, 0x07]);
        assert_eq!(payload(&display, VCOM_AND_DATA_INTERVAL_SETTING), vec![vec![0xF7]]);
        assert_eq!(payload(&display, DEEP_SLEEP), vec![vec![0xA5]]);
        assert_eq!(display.state(), DisplayState::Sleeping);

        // Second sleep sends nothing
        display.sleep(&mut MockDelay::default()).unwrap();
        assert_eq!(display.interface.commands.len(), 3);
    }

    #[test]
    fn test_sleep_before_initialize_is_rejected() {
        let mut display = test_display();
        assert!(matches!(
            display.sleep(&mut MockDelay::default()),
            Err(Error::NotActive { .. })
        ));
    }
}
