//! Render/poll control loop
//!
//! The scheduler alternates between two phases:
//!
//! ```text
//!            +----------------- event / timer -----------------+
//!            v                                                  |
//!        RENDER --(frame shown, timer reset)--> POLL --(tick)--+
//! ```
//!
//! * **Render** draws the current panel, hands the planes to the sink and
//!   restarts the refresh timer.
//! * **Poll** runs one tick per [`SchedulerConfig::poll_interval`]. A tick
//!   first checks the refresh timer (advancing when auto-cycle is on, then
//!   rendering either way), otherwise takes at most one button event.
//!
//! All hardware access goes through the sink from this single call path.
//! Events that arrive during a render wait in the source until the next
//! tick.

use core::time::Duration;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::bitplane::Planes;
use crate::compositor::Compositor;
use crate::input::{ButtonEvent, EventSource};
use crate::panels::{self, Panel};
use crate::sink::{FrameInfo, FrameSink};

/// Default time between automatic refreshes
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(180);

/// Default time between poll ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Monotonic time source
pub trait Clock {
    /// Time since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]; sleeps with the current thread
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Clock starting at zero now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl DelayNs for MonotonicClock {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Loop timing and initial mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time after a render before the next automatic one
    pub refresh_interval: Duration,
    /// Sleep between poll ticks
    pub poll_interval: Duration,
    /// Advance to the next panel on each automatic refresh
    pub auto_cycle: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
            auto_cycle: true,
        }
    }
}

/// Phase of the control loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Next step draws and shows a frame
    Render,
    /// Next step is a poll tick
    Poll,
}

/// Panel rotation and refresh control
pub struct Scheduler<S, E, T> {
    panels: Vec<Box<dyn Panel>>,
    frame: Compositor,
    sink: S,
    events: E,
    timer: T,
    config: SchedulerConfig,
    phase: Phase,
    current: usize,
    auto_cycle: bool,
    last_render: Option<Duration>,
    renders: u64,
}

impl<S, E, T> Scheduler<S, E, T>
where
    S: FrameSink,
    E: EventSource,
    T: Clock + DelayNs,
{
    /// Scheduler that starts by rendering panel 0
    pub fn new(
        panels: Vec<Box<dyn Panel>>,
        frame: Compositor,
        sink: S,
        events: E,
        timer: T,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            panels,
            frame,
            sink,
            events,
            timer,
            config,
            phase: Phase::Render,
            current: 0,
            auto_cycle: config.auto_cycle,
            last_render: None,
            renders: 0,
        }
    }

    /// Index of the panel shown (or about to be)
    pub fn current(&self) -> usize {
        self.current
    }

    /// Whether automatic refreshes advance the panel
    pub fn auto_cycle(&self) -> bool {
        self.auto_cycle
    }

    /// Phase the next [`step`](Self::step) runs
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Frames shown so far
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// The frame sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The event source
    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    /// Give back the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn wrap(&self, delta: isize) -> usize {
        let total = self.panels.len();
        if total == 0 {
            return 0;
        }
        (self.current as isize + delta).rem_euclid(total as isize) as usize
    }

    /// Run one phase and return the phase that follows
    ///
    /// # Errors
    ///
    /// Whatever the sink reports while showing a frame. For the panel this
    /// is a hardware fault and the loop should stop.
    pub fn step(&mut self) -> Result<Phase, S::Error> {
        match self.phase {
            Phase::Render => self.render()?,
            Phase::Poll => self.poll(),
        }
        Ok(self.phase)
    }

    /// Step until `shutdown` is raised
    ///
    /// # Errors
    ///
    /// Stops at the first sink error.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<(), S::Error> {
        info!(
            "Cycling {} panels, refresh every {:?}",
            self.panels.len(),
            self.config.refresh_interval
        );
        while !shutdown.load(Ordering::Relaxed) {
            self.step()?;
        }
        info!("Shutdown requested after {} renders", self.renders);
        Ok(())
    }

    /// Render every panel once, in order, then return to panel 0
    ///
    /// # Errors
    ///
    /// Stops at the first sink error.
    pub fn render_all(&mut self) -> Result<usize, S::Error> {
        for index in 0..self.panels.len() {
            self.current = index;
            self.render()?;
        }
        self.current = 0;
        Ok(self.panels.len())
    }

    /// Let the sink rest the output
    ///
    /// # Errors
    ///
    /// Whatever the sink reports.
    pub fn shutdown(&mut self) -> Result<(), S::Error> {
        self.sink.shutdown()
    }

    fn draw_current(&mut self) -> Option<Planes> {
        let total = self.panels.len();
        let index = self.current;
        let panel = self.panels.get_mut(index)?;
        let frame = &mut self.frame;
        let drawn = panic::catch_unwind(AssertUnwindSafe(|| {
            panels::compose(panel.as_mut(), &mut *frame, index, total)
        }));
        match drawn {
            Ok(planes) => Some(planes),
            Err(_) => {
                let title = panel.title().to_owned();
                warn!("Panel {title} failed to draw, showing placeholder");
                Some(panels::placeholder(frame, &title, index, total))
            }
        }
    }

    fn render(&mut self) -> Result<(), S::Error> {
        if let Some(planes) = self.draw_current() {
            let (title, fullbleed) = self
                .panels
                .get(self.current)
                .map(|p| (p.title().to_owned(), p.fullbleed()))
                .unwrap_or_default();
            let info = FrameInfo {
                index: self.current,
                total: self.panels.len(),
                title: &title,
                fullbleed,
            };
            info!("Rendering {} ({}/{})", title, self.current + 1, info.total);
            self.sink.show(&planes, &info)?;
            self.renders += 1;
        }
        self.last_render = Some(self.timer.now());
        self.phase = Phase::Poll;
        Ok(())
    }

    fn poll(&mut self) {
        let now = self.timer.now();
        let since = now.saturating_sub(self.last_render.unwrap_or(now));
        if since >= self.config.refresh_interval {
            if self.auto_cycle {
                self.current = self.wrap(1);
            }
            debug!("Refresh interval elapsed, panel {}", self.current);
            self.phase = Phase::Render;
            return;
        }

        if let Some(event) = self.events.next_event() {
            self.handle(event);
            if self.phase == Phase::Render {
                return;
            }
        }

        let ms = u32::try_from(self.config.poll_interval.as_millis()).unwrap_or(u32::MAX);
        self.timer.delay_ms(ms);
    }

    fn handle(&mut self, event: ButtonEvent) {
        info!("Button: {event}");
        match event {
            ButtonEvent::Previous => {
                self.current = self.wrap(-1);
                self.phase = Phase::Render;
            }
            ButtonEvent::Next => {
                self.current = self.wrap(1);
                self.phase = Phase::Render;
            }
            ButtonEvent::ForceRefresh => self.phase = Phase::Render,
            ButtonEvent::ToggleAutoCycle => {
                self.auto_cycle = !self.auto_cycle;
                info!(
                    "Auto-cycle {}",
                    if self.auto_cycle { "on" } else { "off" }
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Layer;
    use crate::config::Config;
    use embedded_graphics::prelude::{Point, Size};
    use embedded_graphics::primitives::Rectangle;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SimClock {
        now: Rc<Cell<Duration>>,
    }

    impl SimClock {
        fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }
    }

    impl Clock for SimClock {
        fn now(&self) -> Duration {
            self.now.get()
        }
    }

    impl DelayNs for SimClock {
        fn delay_ns(&mut self, ns: u32) {
            self.advance(Duration::from_nanos(u64::from(ns)));
        }
    }

    #[derive(Default)]
    struct Recorder {
        shown: Vec<usize>,
        fail: bool,
        shutdowns: usize,
    }

    impl FrameSink for Recorder {
        type Error = String;

        fn show(&mut self, planes: &Planes, info: &FrameInfo<'_>) -> Result<(), Self::Error> {
            if self.fail {
                return Err("bus gone".into());
            }
            assert_eq!(planes.size(), (176, 264));
            self.shown.push(info.index);
            Ok(())
        }

        fn shutdown(&mut self) -> Result<(), Self::Error> {
            self.shutdowns += 1;
            Ok(())
        }
    }

    struct Tile(usize);

    impl Panel for Tile {
        fn title(&self) -> &str {
            "TILE"
        }

        fn draw(&mut self, frame: &mut Compositor, _size: Size) {
            let x = 10 * self.0 as i32;
            frame.fill(Rectangle::new(Point::new(x, 40), Size::new(8, 8)), Layer::Black);
        }
    }

    struct Broken;

    impl Panel for Broken {
        fn title(&self) -> &str {
            "BROKEN"
        }

        #[allow(clippy::panic)]
        fn draw(&mut self, _frame: &mut Compositor, _size: Size) {
            panic!("no data");
        }
    }

    type TestScheduler = Scheduler<Recorder, VecDeque<ButtonEvent>, SimClock>;

    fn scheduler_with(panels: Vec<Box<dyn Panel>>) -> (TestScheduler, SimClock) {
        let clock = SimClock::default();
        let scheduler = Scheduler::new(
            panels,
            Compositor::new(&Config::epd2in7b()),
            Recorder::default(),
            VecDeque::new(),
            clock.clone(),
            SchedulerConfig::default(),
        );
        (scheduler, clock)
    }

    fn scheduler() -> (TestScheduler, SimClock) {
        scheduler_with((0..6).map(|i| Box::new(Tile(i)) as Box<dyn Panel>).collect())
    }

    /// Step until `renders` frames have been shown or `limit` steps pass
    fn run_until(s: &mut TestScheduler, renders: u64, limit: usize) {
        for _ in 0..limit {
            if s.renders() >= renders && s.phase() == Phase::Poll {
                return;
            }
            s.step().unwrap();
        }
    }

    #[test]
    fn test_starts_on_first_panel_with_auto_cycle() {
        let (s, _) = scheduler();
        assert_eq!(s.current(), 0);
        assert!(s.auto_cycle());
        assert_eq!(s.phase(), Phase::Render);
    }

    #[test]
    fn test_next_six_times_wraps() {
        let (mut s, _) = scheduler();
        s.step().unwrap();
        for _ in 0..6 {
            s.events_mut().push_back(ButtonEvent::Next);
            assert_eq!(s.step().unwrap(), Phase::Render);
            assert_eq!(s.step().unwrap(), Phase::Poll);
        }
        assert_eq!(s.current(), 0);
        assert_eq!(s.sink().shown, [0, 1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn test_previous_wraps_backwards() {
        let (mut s, _) = scheduler();
        s.step().unwrap();
        s.events_mut().push_back(ButtonEvent::Previous);
        s.step().unwrap();
        s.step().unwrap();
        assert_eq!(s.sink().shown, [0, 5]);
    }

    #[test]
    fn test_auto_cycle_off_rerenders_same_panel() {
        let (mut s, clock) = scheduler();
        s.step().unwrap();
        s.events_mut().push_back(ButtonEvent::ToggleAutoCycle);
        assert_eq!(s.step().unwrap(), Phase::Poll);
        assert!(!s.auto_cycle());

        run_until(&mut s, 3, 10_000);
        assert_eq!(s.sink().shown, [0, 0, 0]);
        assert!(clock.now() >= DEFAULT_REFRESH_INTERVAL * 2);
    }

    #[test]
    fn test_force_refresh_renders_exactly_once() {
        for auto in [true, false] {
            let (mut s, _) = scheduler();
            s.step().unwrap();
            if !auto {
                s.events_mut().push_back(ButtonEvent::ToggleAutoCycle);
                s.step().unwrap();
            }
            s.events_mut().push_back(ButtonEvent::ForceRefresh);
            assert_eq!(s.step().unwrap(), Phase::Render);
            s.step().unwrap();
            for _ in 0..50 {
                s.step().unwrap();
            }
            assert_eq!(s.sink().shown, [0, 0], "auto-cycle {auto}");
        }
    }

    #[test]
    fn test_next_then_three_minutes() {
        let (mut s, clock) = scheduler();
        s.step().unwrap();
        assert_eq!(s.sink().shown, [0]);

        s.events_mut().push_back(ButtonEvent::Next);
        run_until(&mut s, 2, 10);
        assert_eq!(s.sink().shown, [0, 1]);
        let rendered_at = clock.now();

        // just short of the interval: nothing new
        while clock.now() + DEFAULT_POLL_INTERVAL < rendered_at + DEFAULT_REFRESH_INTERVAL {
            s.step().unwrap();
        }
        assert_eq!(s.sink().shown, [0, 1]);

        run_until(&mut s, 3, 10);
        assert_eq!(s.sink().shown, [0, 1, 2]);
    }

    #[test]
    fn test_timer_checked_before_events() {
        let (mut s, clock) = scheduler();
        s.step().unwrap();
        clock.advance(DEFAULT_REFRESH_INTERVAL);
        s.events_mut().push_back(ButtonEvent::Next);
        s.step().unwrap();
        s.step().unwrap();
        assert_eq!(s.sink().shown, [0, 1]);
        // the queued Next is handled on the following tick
        s.step().unwrap();
        s.step().unwrap();
        assert_eq!(s.sink().shown, [0, 1, 2]);
    }

    #[test]
    fn test_panicking_panel_shows_placeholder() {
        let (mut s, _) = scheduler_with(vec![Box::new(Broken), Box::new(Tile(1))]);
        s.step().unwrap();
        assert_eq!(s.sink().shown, [0]);
        s.events_mut().push_back(ButtonEvent::Next);
        s.step().unwrap();
        s.step().unwrap();
        assert_eq!(s.sink().shown, [0, 1]);
    }

    #[test]
    fn test_render_all_visits_every_panel() {
        let (mut s, _) = scheduler();
        assert_eq!(s.render_all().unwrap(), 6);
        assert_eq!(s.sink().shown, [0, 1, 2, 3, 4, 5]);
        assert_eq!(s.current(), 0);
    }

    #[test]
    fn test_sink_error_stops_the_loop() {
        let (mut s, _) = scheduler();
        let shutdown = AtomicBool::new(false);
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        s.sink = recorder;
        assert_eq!(s.run(&shutdown), Err("bus gone".to_owned()));
    }

    #[test]
    fn test_run_returns_when_flag_is_raised() {
        let (mut s, _) = scheduler();
        let shutdown = AtomicBool::new(true);
        s.run(&shutdown).unwrap();
        assert_eq!(s.renders(), 0);
        s.shutdown().unwrap();
        assert_eq!(s.into_sink().shutdowns, 1);
    }
}
