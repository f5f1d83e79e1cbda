//! Overlay drawing.
//!
//! Shapes and text are rasterized with `embedded-graphics` through a small
//! [`DrawTarget`] adapter over the RGB frame. Pixels outside the frame are
//! discarded.

use std::convert::Infallible;

use embedded_graphics::mono_font::{ascii::FONT_10X20, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};
use handsign_models::Hand;

use crate::Frame;

const CONNECTION_COLOR: Rgb888 = Rgb888::new(0, 255, 0);
const LANDMARK_COLOR: Rgb888 = Rgb888::new(255, 0, 0);
const CONNECTION_WIDTH: u32 = 2;
const LANDMARK_DIAMETER: u32 = 5;

/// Text appearance for [`draw_label`].
#[derive(Debug, Clone, Copy)]
pub struct LabelStyle {
    /// Integer upscale applied to the 10x20 bitmap font
    pub scale: u32,
    pub color: [u8; 3],
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            scale: 2,
            color: [255, 0, 0],
        }
    }
}

/// Draw `text` with its top-left corner at `(x, y)`.
pub fn draw_label(frame: &mut Frame, text: &str, x: i32, y: i32, style: LabelStyle) {
    let [r, g, b] = style.color;
    let character_style = MonoTextStyle::new(&FONT_10X20, Rgb888::new(r, g, b));
    let mut target = Canvas {
        frame,
        origin: Point::new(x, y),
        scale: style.scale.max(1) as i32,
    };
    match Text::with_baseline(text, Point::zero(), character_style, Baseline::Top).draw(&mut target) {
        Ok(_) => {}
        Err(infallible) => match infallible {},
    }
}

/// Draw the skeleton and keypoints of a detected hand.
pub fn draw_hand(frame: &mut Frame, hand: &Hand) {
    let (width, height) = frame.dimensions();
    let mut target = Canvas::new(frame);

    let line_style = PrimitiveStyle::with_stroke(CONNECTION_COLOR, CONNECTION_WIDTH);
    for (a, b) in hand.connections() {
        let (ax, ay) = a.to_pixel(width, height);
        let (bx, by) = b.to_pixel(width, height);
        match Line::new(Point::new(ax, ay), Point::new(bx, by))
            .into_styled(line_style)
            .draw(&mut target)
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }

    let marker_style = PrimitiveStyle::with_fill(LANDMARK_COLOR);
    for lm in &hand.landmarks {
        let (x, y) = lm.to_pixel(width, height);
        match Circle::with_center(Point::new(x, y), LANDMARK_DIAMETER)
            .into_styled(marker_style)
            .draw(&mut target)
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Draw target over a frame. Every incoming pixel covers a `scale` x `scale`
/// block offset by `origin`.
struct Canvas<'a> {
    frame: &'a mut Frame,
    origin: Point,
    scale: i32,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut Frame) -> Self {
        Self {
            frame,
            origin: Point::zero(),
            scale: 1,
        }
    }

    fn put(&mut self, x: i32, y: i32, color: Rgb888) {
        if x >= 0 && y >= 0 && (x as u32) < self.frame.width() && (y as u32) < self.frame.height() {
            self.frame
                .put_pixel(x as u32, y as u32, image::Rgb([color.r(), color.g(), color.b()]));
        }
    }
}

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        let scale = self.scale as u32;
        Size::new(self.frame.width() / scale, self.frame.height() / scale)
    }
}

impl DrawTarget for Canvas<'_> {
    type Color = Rgb888;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let base_x = self.origin.x + point.x * self.scale;
            let base_y = self.origin.y + point.y * self.scale;
            for dy in 0..self.scale {
                for dx in 0..self.scale {
                    self.put(base_x + dx, base_y + dy, color);
                }
            }
        }
        Ok(())
    }
}
