//! Button input
//!
//! The HAT has four active-low keys. [`InputMonitor`] samples them, applies a
//! per-line refractory window and turns each accepted press edge into one
//! [`ButtonEvent`] on a bounded [`EventQueue`]. Release edges only re-arm the
//! line.
//!
//! The monitor never touches the display; the scheduler drains the queue
//! through the [`EventSource`] trait.
//!
//! ## Example
//!
//! ```
//! use eink_dashboard::input::{ButtonEvent, EventQueue, EventSource};
//!
//! let queue = EventQueue::new();
//! queue.push(ButtonEvent::Next);
//! let mut source = queue.clone();
//! assert_eq!(source.next_event(), Some(ButtonEvent::Next));
//! assert_eq!(source.next_event(), None);
//! ```

use core::fmt;
use std::collections::VecDeque;
use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use embedded_hal::digital::{Error as _, InputPin};
use heapless::Deque;
use log::{debug, info, warn};
use serde::Deserialize;

/// Number of keys on the HAT
pub const KEY_COUNT: usize = 4;

/// BCM pin numbers of KEY1..KEY4
pub const DEFAULT_PINS: [u32; KEY_COUNT] = [5, 6, 13, 19];

/// Refractory window after an accepted transition
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Background sampling period
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

/// Pending events kept before the oldest is dropped
pub const QUEUE_CAPACITY: usize = 8;

/// Logical button events
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ButtonEvent {
    /// KEY1: previous panel
    Previous,
    /// KEY2: next panel
    Next,
    /// KEY3: redraw the current panel
    ForceRefresh,
    /// KEY4: toggle automatic panel cycling
    ToggleAutoCycle,
}

impl ButtonEvent {
    /// Events in key order
    pub const ALL: [Self; KEY_COUNT] = [
        Self::Previous,
        Self::Next,
        Self::ForceRefresh,
        Self::ToggleAutoCycle,
    ];

    /// Event produced by the key at `line` (0-based)
    pub fn for_line(line: usize) -> Option<Self> {
        Self::ALL.get(line).copied()
    }
}

impl fmt::Display for ButtonEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Previous => "previous",
            Self::Next => "next",
            Self::ForceRefresh => "refresh",
            Self::ToggleAutoCycle => "toggle auto-cycle",
        };
        f.write_str(name)
    }
}

/// Bias applied to the key lines before they are claimed
///
/// The keys short their line to ground, so the line needs a pull-up to read
/// high when released. BCM 13 and 19 come out of reset pulled down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pull {
    /// Internal pull-up (stock HAT)
    #[default]
    Up,
    /// Internal pull-down
    Down,
    /// Leave the bias as firmware left it (external resistors fitted)
    Keep,
}

impl Pull {
    /// Tools that set the bias of a BCM line, tried in order until one
    /// succeeds. Empty for [`Pull::Keep`].
    pub fn commands(self, line: u32) -> Vec<(&'static str, Vec<String>)> {
        let flag = match self {
            Self::Up => "pu",
            Self::Down => "pd",
            Self::Keep => return Vec::new(),
        };
        ["pinctrl", "raspi-gpio"]
            .into_iter()
            .map(|tool| (tool, vec!["set".to_owned(), line.to_string(), flag.to_owned()]))
            .collect()
    }
}

/// Edge detector for one line
#[derive(Clone, Copy, Debug)]
struct Debouncer {
    pressed: bool,
    last_change: Option<Duration>,
    window: Duration,
}

impl Debouncer {
    const fn new(window: Duration) -> Self {
        Self {
            pressed: false,
            last_change: None,
            window,
        }
    }

    /// Feed a sample; true on an accepted press edge
    fn update(&mut self, pressed: bool, now: Duration) -> bool {
        if pressed == self.pressed {
            return false;
        }
        if let Some(last) = self.last_change {
            if now.saturating_sub(last) < self.window {
                return false;
            }
        }
        self.pressed = pressed;
        self.last_change = Some(now);
        pressed
    }
}

/// Anything the scheduler can take button events from
pub trait EventSource {
    /// Oldest pending event, if any
    fn next_event(&mut self) -> Option<ButtonEvent>;
}

impl EventSource for VecDeque<ButtonEvent> {
    fn next_event(&mut self) -> Option<ButtonEvent> {
        self.pop_front()
    }
}

/// Bounded FIFO shared between the monitor thread and the scheduler
///
/// When full, pushing drops the oldest event.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<Deque<ButtonEvent, QUEUE_CAPACITY>>>,
}

impl EventQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Deque<ButtonEvent, QUEUE_CAPACITY>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append an event, evicting the oldest on overflow
    pub fn push(&self, event: ButtonEvent) {
        let mut queue = self.lock();
        if let Err(rejected) = queue.push_back(event) {
            let dropped = queue.pop_front();
            warn!("Button queue full, dropping {dropped:?}");
            let _ = queue.push_back(rejected);
        }
    }

    /// Take the oldest event
    pub fn pop(&self) -> Option<ButtonEvent> {
        self.lock().pop_front()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl EventSource for EventQueue {
    fn next_event(&mut self) -> Option<ButtonEvent> {
        self.pop()
    }
}

/// Debounced sampler for the four keys
pub struct InputMonitor<P> {
    pins: [P; KEY_COUNT],
    lines: [Debouncer; KEY_COUNT],
    queue: EventQueue,
}

impl<P> InputMonitor<P>
where
    P: InputPin,
{
    /// Monitor over KEY1..KEY4, in that order
    pub fn new(pins: [P; KEY_COUNT], debounce: Duration) -> Self {
        Self {
            pins,
            lines: [Debouncer::new(debounce); KEY_COUNT],
            queue: EventQueue::new(),
        }
    }

    /// Handle to the queue this monitor fills
    pub fn queue(&self) -> EventQueue {
        self.queue.clone()
    }

    /// Read every line once; `now` is time since an arbitrary fixed origin
    ///
    /// Returns the number of events queued by this sample.
    pub fn sample(&mut self, now: Duration) -> usize {
        let mut queued = 0;
        for (line, (pin, debouncer)) in self.pins.iter_mut().zip(self.lines.iter_mut()).enumerate()
        {
            let pressed = match pin.is_low() {
                Ok(low) => low,
                Err(e) => {
                    warn!("Failed to read key {}: {:?}", line + 1, e.kind());
                    continue;
                }
            };
            if debouncer.update(pressed, now) {
                if let Some(event) = ButtonEvent::for_line(line) {
                    debug!("Key {} pressed: {}", line + 1, event);
                    self.queue.push(event);
                    queued += 1;
                }
            }
        }
        queued
    }

    /// Sample on a background thread until `shutdown` is raised
    pub fn spawn(
        mut self,
        interval: Duration,
        shutdown: Arc<AtomicBool>,
    ) -> std::io::Result<JoinHandle<()>>
    where
        P: Send + 'static,
    {
        thread::Builder::new()
            .name("input-monitor".into())
            .spawn(move || {
                info!("Input monitor running, sampling every {interval:?}");
                let origin = Instant::now();
                while !shutdown.load(Ordering::Relaxed) {
                    self.sample(origin.elapsed());
                    thread::sleep(interval);
                }
                info!("Input monitor stopped");
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    #[test]
    fn test_pull_commands() {
        assert_eq!(Pull::default(), Pull::Up);
        let commands = Pull::Up.commands(13);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].0, "pinctrl");
        assert_eq!(commands[0].1, ["set", "13", "pu"]);
        assert_eq!(commands[1].0, "raspi-gpio");
        assert_eq!(commands[1].1, ["set", "13", "pu"]);
        assert_eq!(Pull::Down.commands(19)[0].1, ["set", "19", "pd"]);
        assert!(Pull::Keep.commands(5).is_empty());
    }

    #[derive(Clone, Default)]
    struct MockPin {
        low: Arc<AtomicBool>,
        broken: bool,
    }

    impl MockPin {
        fn press(&self) {
            self.low.store(true, Ordering::SeqCst);
        }

        fn release(&self) {
            self.low.store(false, Ordering::SeqCst);
        }
    }

    impl ErrorType for MockPin {
        type Error = ErrorKind;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.is_low().map(|low| !low)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            Ok(self.low.load(Ordering::SeqCst))
        }
    }

    fn monitor() -> (InputMonitor<MockPin>, [MockPin; KEY_COUNT]) {
        let pins: [MockPin; KEY_COUNT] = Default::default();
        (InputMonitor::new(pins.clone(), DEFAULT_DEBOUNCE), pins)
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_lines_map_to_events() {
        let (mut monitor, pins) = monitor();
        for pin in &pins {
            pin.press();
        }
        assert_eq!(monitor.sample(ms(0)), 4);
        let queue = monitor.queue();
        let drained: Vec<_> = core::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained, ButtonEvent::ALL.to_vec());
    }

    #[test]
    fn test_held_key_emits_once() {
        let (mut monitor, pins) = monitor();
        pins[1].press();
        for t in 0..20 {
            monitor.sample(ms(t * 10));
        }
        assert_eq!(monitor.queue().len(), 1);
    }

    #[test]
    fn test_release_does_not_emit() {
        let (mut monitor, pins) = monitor();
        pins[0].press();
        monitor.sample(ms(0));
        let queue = monitor.queue();
        assert_eq!(queue.pop(), Some(ButtonEvent::Previous));
        pins[0].release();
        monitor.sample(ms(100));
        assert!(monitor.queue().is_empty());
    }

    #[test]
    fn test_bounce_inside_window_is_ignored() {
        let (mut monitor, pins) = monitor();
        pins[2].press();
        monitor.sample(ms(0));
        // contact bounce
        pins[2].release();
        monitor.sample(ms(5));
        pins[2].press();
        monitor.sample(ms(10));
        pins[2].release();
        monitor.sample(ms(20));
        assert_eq!(monitor.queue().len(), 1);

        // a real release, then a second press
        monitor.sample(ms(100));
        pins[2].press();
        monitor.sample(ms(200));
        assert_eq!(monitor.queue().len(), 2);
    }

    #[test]
    fn test_quick_second_press_inside_window_is_ignored() {
        let (mut monitor, pins) = monitor();
        pins[3].press();
        monitor.sample(ms(0));
        pins[3].release();
        monitor.sample(ms(60));
        pins[3].press();
        monitor.sample(ms(80));
        assert_eq!(monitor.queue().len(), 1);
        monitor.sample(ms(120));
        assert_eq!(monitor.queue().len(), 2);
    }

    #[test]
    fn test_read_error_skips_line() {
        let mut pins: [MockPin; KEY_COUNT] = Default::default();
        pins[0].broken = true;
        pins[0].press();
        pins[1].press();
        let mut monitor = InputMonitor::new(pins, DEFAULT_DEBOUNCE);
        assert_eq!(monitor.sample(ms(0)), 1);
        assert_eq!(monitor.queue().pop(), Some(ButtonEvent::Next));
    }

    #[test]
    fn test_queue_overflow_keeps_newest() {
        let queue = EventQueue::new();
        for _ in 0..QUEUE_CAPACITY {
            queue.push(ButtonEvent::Next);
        }
        queue.push(ButtonEvent::Previous);
        queue.push(ButtonEvent::ForceRefresh);
        assert_eq!(queue.len(), QUEUE_CAPACITY);

        let drained: Vec<_> = core::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained.len(), QUEUE_CAPACITY);
        assert_eq!(drained[QUEUE_CAPACITY - 2], ButtonEvent::Previous);
        assert_eq!(drained[QUEUE_CAPACITY - 1], ButtonEvent::ForceRefresh);
    }

    #[test]
    fn test_vecdeque_source() {
        let mut source: VecDeque<ButtonEvent> = [ButtonEvent::Next].into_iter().collect();
        assert_eq!(source.next_event(), Some(ButtonEvent::Next));
        assert_eq!(source.next_event(), None);
    }

    #[test]
    fn test_background_thread_enqueues_and_stops() {
        let (monitor, pins) = monitor();
        let queue = monitor.queue();
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = monitor
            .spawn(Duration::from_millis(1), Arc::clone(&shutdown))
            .unwrap();

        pins[1].press();
        let deadline = Instant::now() + Duration::from_secs(2);
        while queue.is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        shutdown.store(true, Ordering::Relaxed);
        handle.join().unwrap();
        assert_eq!(queue.pop(), Some(ButtonEvent::Next));
    }
}
