//! Wireless link details as label/value rows

use embedded_graphics::prelude::{Point, Size};

use super::probe;
use super::{CONTENT_TOP, MARGIN, Panel, fonts, or_placeholder};
use crate::compositor::Compositor;

const LINE_SPACING: i32 = 18;

/// SSID, signal, frequency, addressing and socket count
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkPanel;

impl NetworkPanel {
    /// Rows as (label, value), top to bottom
    pub fn rows() -> [(&'static str, String); 7] {
        [
            ("SSID:", or_placeholder(probe::ssid())),
            (
                "SIGNAL:",
                or_placeholder(probe::signal_dbm().map(|dbm| format!("{dbm} dBm"))),
            ),
            (
                "FREQ:",
                or_placeholder(probe::frequency_mhz().map(|mhz| format!("{mhz} MHz"))),
            ),
            (
                "IP:",
                probe::ipv4_address().map_or_else(|| "No IP".to_owned(), |ip| ip.to_string()),
            ),
            ("GW:", or_placeholder(probe::gateway())),
            ("DNS:", or_placeholder(probe::dns_server())),
            ("CONNS:", probe::connection_count().unwrap_or(0).to_string()),
        ]
    }
}

impl Panel for NetworkPanel {
    fn title(&self) -> &str {
        "NETWORK"
    }

    fn draw(&mut self, frame: &mut Compositor, _size: Size) {
        let mut y = CONTENT_TOP + 4;
        for (label, value) in Self::rows() {
            frame.label_value(Point::new(MARGIN, y), label, &value, &fonts::LABEL, &fonts::BODY);
            y += LINE_SPACING;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_rows_fit_above_footer() {
        let last = CONTENT_TOP + 4 + LINE_SPACING * 6 + fonts::BODY.character_size.height as i32;
        assert!(last <= 176 - super::super::FOOTER_HEIGHT);
    }

    #[test]
    fn test_labels_are_red() {
        let mut frame = Compositor::new(&Config::epd2in7b());
        frame.begin_frame();
        let size = frame.size();
        NetworkPanel.draw(&mut frame, size);
        let planes = frame.finalize();
        assert!(!planes.red.is_blank());
        assert!(!planes.black.is_blank());
    }
}
