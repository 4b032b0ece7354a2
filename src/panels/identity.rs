//! Host identity: name and address in large type for headless access

use embedded_graphics::prelude::{Point, Size};

use super::probe;
use super::{CONTENT_TOP, MARGIN, Panel, fonts, or_placeholder};
use crate::color::Layer;
use crate::compositor::Compositor;

const LARGE_STEP: i32 = 26;
const DIVIDER_GAP: i32 = 6;
const ROW_STEP: i32 = 18;

/// Hostname, IPv4 address, SSID and MAC
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityPanel;

impl Panel for IdentityPanel {
    fn title(&self) -> &str {
        "IDENTITY"
    }

    fn draw(&mut self, frame: &mut Compositor, _size: Size) {
        let mut y = CONTENT_TOP + 4;

        let host = or_placeholder(probe::hostname());
        frame.text_centered(y, &host, &fonts::LARGE, Layer::Black);
        y += LARGE_STEP;
        frame.hline(y, Layer::Red);
        y += DIVIDER_GAP;

        let ip = probe::ipv4_address().map_or_else(|| "No IP".to_owned(), |ip| ip.to_string());
        frame.text_centered(y, &ip, &fonts::LARGE, Layer::Black);
        y += LARGE_STEP;
        frame.hline(y, Layer::Red);
        y += DIVIDER_GAP;

        let ssid = or_placeholder(probe::ssid());
        frame.label_value(Point::new(MARGIN, y), "SSID:", &ssid, &fonts::LABEL, &fonts::BODY);
        y += ROW_STEP;

        let mac = or_placeholder(probe::mac_address());
        frame.label_value(Point::new(MARGIN, y), "MAC:", &mac, &fonts::LABEL, &fonts::BODY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_dividers_are_red() {
        let mut frame = Compositor::new(&Config::epd2in7b());
        frame.begin_frame();
        let size = frame.size();
        IdentityPanel.draw(&mut frame, size);
        let divider = CONTENT_TOP + 4 + LARGE_STEP;
        let red = frame.layer(Layer::Red);
        assert_eq!(red.luma(MARGIN as u32, divider as u32), Some(0));
        assert_eq!(red.luma(size.width / 2, divider as u32), Some(0));
    }
}
