//! Dashboard panels
//!
//! A [`Panel`] draws one screen onto a [`Compositor`]. Panels never touch
//! hardware; the scheduler composes them with [`compose`] and hands the
//! planes to a sink.
//!
//! Panels that are not full-bleed get the standard chrome: a red title
//! banner and a footer with page dots and the update time.

pub mod art;
pub mod chrome;
pub mod health;
pub mod identity;
pub mod network;
pub mod overview;
pub mod probe;
pub mod test_pattern;

use embedded_graphics::prelude::Size;

use crate::bitplane::Planes;
use crate::color::Layer;
use crate::compositor::Compositor;

pub use art::ArtPanel;
pub use health::HealthPanel;
pub use identity::IdentityPanel;
pub use network::NetworkPanel;
pub use overview::OverviewPanel;
pub use test_pattern::TestPatternPanel;

/// Font set shared by the panels
pub mod fonts {
    use embedded_graphics::mono_font::{MonoFont, ascii, iso_8859_1};

    /// Hero readings; includes the degree sign
    pub const HERO: MonoFont<'static> = iso_8859_1::FONT_10X20;
    /// Large single values
    pub const LARGE: MonoFont<'static> = ascii::FONT_10X20;
    /// Banner titles
    pub const TITLE: MonoFont<'static> = ascii::FONT_9X15_BOLD;
    /// Labels in label/value rows
    pub const LABEL: MonoFont<'static> = ascii::FONT_6X13_BOLD;
    /// Body text
    pub const BODY: MonoFont<'static> = ascii::FONT_7X13;
    /// Footnotes
    pub const SMALL: MonoFont<'static> = ascii::FONT_6X10;
}

/// Height of the title banner
pub const HEADER_HEIGHT: i32 = 22;
/// Height of the footer strip
pub const FOOTER_HEIGHT: i32 = 14;
/// First content row below the banner
pub const CONTENT_TOP: i32 = HEADER_HEIGHT + 2;
/// Left inset for content
pub const MARGIN: i32 = crate::compositor::MARGIN;
/// Shown wherever a reading is unavailable
pub const PLACEHOLDER: &str = "N/A";

/// One dashboard screen
pub trait Panel {
    /// Banner title
    fn title(&self) -> &str;

    /// Draw edge to edge, without banner or footer
    fn fullbleed(&self) -> bool {
        false
    }

    /// Draw the content; `size` is the logical canvas size
    fn draw(&mut self, frame: &mut Compositor, size: Size);
}

/// The six panels in display order
pub fn default_panels(seed: u64) -> Vec<Box<dyn Panel>> {
    vec![
        Box::new(OverviewPanel::new()),
        Box::new(IdentityPanel),
        Box::new(NetworkPanel),
        Box::new(HealthPanel),
        Box::new(TestPatternPanel),
        Box::new(ArtPanel::new(seed)),
    ]
}

fn footer_stamp() -> String {
    chrono::Local::now().format("Updated %H:%M").to_string()
}

/// Draw `panel` into a fresh frame, add chrome and finalize
pub fn compose(panel: &mut dyn Panel, frame: &mut Compositor, index: usize, total: usize) -> Planes {
    frame.begin_frame();
    let size = frame.size();
    if panel.fullbleed() {
        panel.draw(frame, size);
    } else {
        chrome::header(frame, panel.title());
        panel.draw(frame, size);
        chrome::footer(frame, index, total, &footer_stamp());
    }
    frame.finalize()
}

/// Frame shown in place of a panel that failed to draw
pub fn placeholder(frame: &mut Compositor, title: &str, index: usize, total: usize) -> Planes {
    frame.begin_frame();
    chrome::header(frame, title);
    let middle = (frame.size().height as i32 - fonts::LARGE.character_size.height as i32) / 2;
    frame.text_centered(middle, PLACEHOLDER, &fonts::LARGE, Layer::Red);
    chrome::footer(frame, index, total, &footer_stamp());
    frame.finalize()
}

/// `value` or the placeholder
pub(crate) fn or_placeholder<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_owned(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    struct Blank;

    impl Panel for Blank {
        fn title(&self) -> &str {
            "BLANK"
        }

        fn draw(&mut self, _frame: &mut Compositor, _size: Size) {}
    }

    struct Edge;

    impl Panel for Edge {
        fn title(&self) -> &str {
            "EDGE"
        }

        fn fullbleed(&self) -> bool {
            true
        }

        fn draw(&mut self, _frame: &mut Compositor, _size: Size) {}
    }

    #[test]
    fn test_default_panel_order() {
        let titles: Vec<String> = default_panels(1)
            .iter()
            .map(|p| p.title().to_owned())
            .collect();
        assert_eq!(
            titles,
            ["DASHBOARD", "IDENTITY", "NETWORK", "HEALTH", "TEST PATTERN", "ART"]
        );
        let fullbleed: Vec<bool> = default_panels(1).iter().map(|p| p.fullbleed()).collect();
        assert_eq!(fullbleed, [false, false, false, false, true, true]);
    }

    #[test]
    fn test_chrome_only_on_framed_panels() {
        let mut frame = Compositor::new(&Config::epd2in7b());
        let framed = compose(&mut Blank, &mut frame, 0, 6);
        assert!(!framed.red.is_blank());
        assert!(!framed.black.is_blank());

        let bare = compose(&mut Edge, &mut frame, 4, 6);
        assert!(bare.red.is_blank());
        assert!(bare.black.is_blank());
    }

    #[test]
    fn test_placeholder_has_banner() {
        let mut frame = Compositor::new(&Config::epd2in7b());
        let planes = placeholder(&mut frame, "HEALTH", 3, 6);
        assert!(!planes.red.is_blank());
    }

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder(Some(3)), "3");
        assert_eq!(or_placeholder::<u8>(None), "N/A");
    }
}
