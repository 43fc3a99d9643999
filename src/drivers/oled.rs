//! 128×64 monochrome OLED text display.
//!
//! [`TextDisplay`] renders status lines with `embedded-graphics` onto any
//! [`FrameSurface`] and pushes the frame after every call, so the panel
//! always shows exactly what the last `clear`/`draw_text` produced.
//! On target the surface is an SSD1306 in buffered graphics mode on I²C.

use core::fmt::Debug;

use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_6X10};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use log::warn;

use crate::app::ports::DisplayPort;

pub const WIDTH: u32 = 128;
pub const HEIGHT: u32 = 64;

/// A draw target whose contents only reach the panel on `flush_frame`.
pub trait FrameSurface: DrawTarget<Color = BinaryColor> {
    fn flush_frame(&mut self) -> Result<(), Self::Error>;
}

pub struct TextDisplay<S> {
    surface: S,
    failures: u32,
}

impl<S> TextDisplay<S>
where
    S: FrameSurface,
    S::Error: Debug,
{
    pub fn new(surface: S) -> Self {
        Self { surface, failures: 0 }
    }

    /// Draw or flush errors seen so far.  They never reach the domain.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn commit(&mut self, drawn: Result<(), S::Error>) {
        let result = drawn.and_then(|()| self.surface.flush_frame());
        if let Err(e) = result {
            self.failures = self.failures.saturating_add(1);
            warn!("oled: frame update failed: {:?}", e);
        }
    }
}

impl<S> DisplayPort for TextDisplay<S>
where
    S: FrameSurface,
    S::Error: Debug,
{
    fn clear(&mut self) {
        let drawn = self.surface.clear(BinaryColor::Off);
        self.commit(drawn);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let drawn = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
            .draw(&mut self.surface)
            .map(|_| ());
        self.commit(drawn);
    }
}

// ── SSD1306 ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub mod ssd1306_panel {
    use esp_idf_hal::i2c::I2cDriver;
    use ssd1306::mode::BufferedGraphicsMode;
    use ssd1306::prelude::*;
    use ssd1306::{I2CDisplayInterface, Ssd1306};

    use super::{FrameSurface, TextDisplay};
    use crate::error::SetupError;

    pub type Panel = Ssd1306<
        I2CInterface<I2cDriver<'static>>,
        DisplaySize128x64,
        BufferedGraphicsMode<DisplaySize128x64>,
    >;

    impl FrameSurface for Panel {
        fn flush_frame(&mut self) -> Result<(), Self::Error> {
            self.flush()
        }
    }

    /// Bring the panel up on an already-configured I²C bus.
    pub fn open(i2c: I2cDriver<'static>) -> Result<TextDisplay<Panel>, SetupError> {
        let interface = I2CDisplayInterface::new_custom_address(i2c, crate::pins::OLED_I2C_ADDR);
        let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        panel.init().map_err(|e| {
            log::error!("oled: SSD1306 init failed: {:?}", e);
            SetupError::DisplayInitFailed
        })?;
        Ok(TextDisplay::new(panel))
    }
}
