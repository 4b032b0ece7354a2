//! CPU health: temperature, clock, voltage and throttling

use embedded_graphics::prelude::{Point, Size};

use super::overview::{format_temperature, hero_reading, temperature_layer};
use super::probe::{self, Throttle};
use super::{CONTENT_TOP, MARGIN, Panel, fonts, or_placeholder};
use crate::color::Layer;
use crate::compositor::Compositor;

const ROW_STEP: i32 = 18;
const FLAG_STEP: i32 = 14;
const LABEL_GAP: i32 = 3;

/// Hero temperature plus clock and throttle status
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthPanel;

impl HealthPanel {
    fn flag_row(frame: &mut Compositor, y: i32, label: &str, flags: &[&str], layer: Layer) {
        frame.text(Point::new(MARGIN, y), label, &fonts::LABEL, layer);
        let x = MARGIN + frame.text_width(label, &fonts::LABEL) as i32 + LABEL_GAP;
        frame.text(Point::new(x, y), &flags.join(", "), &fonts::SMALL, layer);
    }

    /// Throttle section; current conditions in red, boot history in black
    pub fn draw_throttle(frame: &mut Compositor, mut y: i32, throttle: Option<Throttle>) {
        match throttle {
            None => frame.label_value(
                Point::new(MARGIN, y),
                "THROTTLE:",
                "unknown",
                &fonts::LABEL,
                &fonts::BODY,
            ),
            Some(Throttle(0)) => {
                Self::flag_row(frame, y, "THROTTLE:", &["none"], Layer::Black);
            }
            Some(flags) => {
                let current = flags.current();
                if !current.is_empty() {
                    Self::flag_row(frame, y, "ACTIVE:", &current, Layer::Red);
                    y += FLAG_STEP;
                }
                let boot = flags.since_boot();
                if !boot.is_empty() {
                    Self::flag_row(frame, y, "BOOT:", &boot, Layer::Black);
                }
            }
        }
    }
}

impl Panel for HealthPanel {
    fn title(&self) -> &str {
        "HEALTH"
    }

    fn draw(&mut self, frame: &mut Compositor, size: Size) {
        let mut y = CONTENT_TOP + 2;

        let temp = probe::cpu_temp_c();
        hero_reading(frame, y, &format_temperature(temp), temperature_layer(temp));
        y += 50;

        let freq = or_placeholder(probe::cpu_freq_mhz().map(|mhz| format!("{mhz} MHz")));
        frame.label_value(Point::new(MARGIN, y), "FREQ:", &freq, &fonts::LABEL, &fonts::BODY);
        let volts = or_placeholder(probe::core_voltage());
        let half = size.width as i32 / 2;
        frame.label_value(Point::new(half, y), "VOLT:", &volts, &fonts::LABEL, &fonts::BODY);
        y += ROW_STEP;

        let governor = or_placeholder(probe::governor());
        frame.label_value(Point::new(MARGIN, y), "GOV:", &governor, &fonts::LABEL, &fonts::BODY);
        y += ROW_STEP;

        Self::draw_throttle(frame, y, probe::throttled());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn frame() -> Compositor {
        let mut frame = Compositor::new(&Config::epd2in7b());
        frame.begin_frame();
        frame
    }

    #[test]
    fn test_no_throttling_is_all_black() {
        let mut frame = frame();
        HealthPanel::draw_throttle(&mut frame, 100, Some(Throttle(0)));
        assert!(frame.finalize().red.is_blank());
    }

    #[test]
    fn test_current_flags_are_red_boot_flags_black() {
        let mut boot_only = frame();
        HealthPanel::draw_throttle(&mut boot_only, 100, Some(Throttle(0x5_0000)));
        let planes = boot_only.finalize();
        assert!(planes.red.is_blank());
        assert!(!planes.black.is_blank());

        let mut active = frame();
        HealthPanel::draw_throttle(&mut active, 100, Some(Throttle(0x1)));
        let planes = active.finalize();
        assert!(!planes.red.is_blank());
        assert!(planes.black.is_blank());
    }

    #[test]
    fn test_unknown_throttle_uses_label_value() {
        let mut frame = frame();
        HealthPanel::draw_throttle(&mut frame, 100, None);
        let planes = frame.finalize();
        assert!(!planes.red.is_blank());
        assert!(!planes.black.is_blank());
    }
}
