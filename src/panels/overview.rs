//! System overview: temperature, utilisation bars and load

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use super::probe::{self, CpuTimes};
use super::{CONTENT_TOP, MARGIN, Panel, fonts, or_placeholder};
use crate::color::Layer;
use crate::compositor::Compositor;

/// Temperature at which readings turn red
pub const HOT_CELSIUS: f32 = 70.0;

const FRAME_INSET: i32 = 40;
const FRAME_HEIGHT: u32 = 44;
const BAR_LABEL_WIDTH: i32 = 40;
const BAR_PERCENT_WIDTH: i32 = 35;
const BAR_HEIGHT: u32 = 10;
const BAR_SPACING: i32 = 16;

/// Ink for a temperature reading
pub fn temperature_layer(celsius: Option<f32>) -> Layer {
    match celsius {
        Some(t) if t >= HOT_CELSIUS => Layer::Red,
        _ => Layer::Black,
    }
}

/// `48.3°C`, or the placeholder
pub fn format_temperature(celsius: Option<f32>) -> String {
    or_placeholder(celsius.map(|t| format!("{t:.1}\u{b0}C")))
}

/// Double frame with a centred hero reading
pub(crate) fn hero_reading(frame: &mut Compositor, y: i32, text: &str, layer: Layer) {
    let width = frame.size().width.saturating_sub(2 * FRAME_INSET as u32);
    let outer = Rectangle::new(Point::new(FRAME_INSET, y), Size::new(width, FRAME_HEIGHT));
    let inner = Rectangle::new(
        Point::new(FRAME_INSET + 2, y + 2),
        Size::new(width.saturating_sub(4), FRAME_HEIGHT - 4),
    );
    frame.rect(outer, layer, false);
    frame.rect(inner, layer, false);
    let text_y = y + (FRAME_HEIGHT as i32 - fonts::HERO.character_size.height as i32) / 2;
    frame.text_centered(text_y, text, &fonts::HERO, layer);
}

/// Hostname, uptime, hero temperature and CPU/RAM/DISK bars
#[derive(Debug, Default)]
pub struct OverviewPanel {
    last_cpu: Option<CpuTimes>,
}

impl OverviewPanel {
    /// Panel with no CPU history
    pub fn new() -> Self {
        Self::default()
    }

    fn cpu_percent(&mut self) -> Option<f32> {
        let now = probe::cpu_times()?;
        let percent = probe::cpu_percent(self.last_cpu, now);
        self.last_cpu = Some(now);
        Some(percent)
    }

    fn labelled_bar(frame: &mut Compositor, y: i32, label: &str, percent: Option<f32>) {
        let width = frame.size().width as i32 - MARGIN * 2 - BAR_LABEL_WIDTH - BAR_PERCENT_WIDTH - 4;
        frame.text(Point::new(MARGIN, y), label, &fonts::LABEL, Layer::Red);
        frame.progress_bar(
            MARGIN + BAR_LABEL_WIDTH,
            y + 2,
            width.max(0) as u32,
            BAR_HEIGHT,
            percent.unwrap_or(0.0),
            Layer::Black,
        );
        let value = or_placeholder(percent.map(|p| format!("{p:.0}%")));
        frame.text_right(y, &value, &fonts::LABEL, Layer::Black);
    }
}

impl Panel for OverviewPanel {
    fn title(&self) -> &str {
        "DASHBOARD"
    }

    fn draw(&mut self, frame: &mut Compositor, _size: Size) {
        let mut y = CONTENT_TOP + 2;

        let host = or_placeholder(probe::hostname());
        let uptime = or_placeholder(probe::uptime_secs().map(probe::format_uptime));
        frame.text(Point::new(MARGIN, y), &host, &fonts::BODY, Layer::Black);
        frame.text_right(y, &uptime, &fonts::SMALL, Layer::Black);
        y += 16;

        let temp = probe::cpu_temp_c();
        hero_reading(frame, y, &format_temperature(temp), temperature_layer(temp));
        y += FRAME_HEIGHT as i32 + 6;

        let cpu = self.cpu_percent();
        Self::labelled_bar(frame, y, "CPU", cpu);
        y += BAR_SPACING;
        Self::labelled_bar(frame, y, "RAM", probe::memory_percent());
        y += BAR_SPACING;
        Self::labelled_bar(frame, y, "DISK", probe::disk_percent());
        y += BAR_SPACING + 2;

        let load = or_placeholder(
            probe::load_average().map(|(a, b, c)| format!("{a:.2} {b:.2} {c:.2}")),
        );
        frame.text(Point::new(MARGIN, y), &format!("Load: {load}"), &fonts::SMALL, Layer::Black);
        let procs = or_placeholder(probe::process_count());
        frame.text_right(y, &format!("Procs: {procs}"), &fonts::SMALL, Layer::Black);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_temperature_formatting() {
        assert_eq!(format_temperature(Some(48.26)), "48.3\u{b0}C");
        assert_eq!(format_temperature(None), "N/A");
        assert_eq!(temperature_layer(Some(70.0)), Layer::Red);
        assert_eq!(temperature_layer(Some(69.9)), Layer::Black);
        assert_eq!(temperature_layer(None), Layer::Black);
    }

    #[test]
    fn test_hero_reading_frames_in_red_when_hot() {
        let mut frame = Compositor::new(&Config::epd2in7b());
        frame.begin_frame();
        hero_reading(&mut frame, 40, "75.0\u{b0}C", Layer::Red);
        let red = frame.layer(Layer::Red);
        assert_eq!(red.luma(40, 40), Some(0));
        assert_eq!(red.luma(42, 42), Some(0));
        assert!(frame.layer(Layer::Black).pixels().iter().all(|p| *p == 255));
    }

    #[test]
    fn test_draw_never_panics_off_device() {
        let mut frame = Compositor::new(&Config::epd2in7b());
        frame.begin_frame();
        let size = frame.size();
        let mut panel = OverviewPanel::new();
        panel.draw(&mut frame, size);
        panel.draw(&mut frame, size);
        assert!(!frame.finalize().black.is_blank());
    }
}
