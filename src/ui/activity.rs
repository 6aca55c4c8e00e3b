/// Indeterminate progress indicator
/// Draws a block sliding across a track while a removal is running
use iced::widget::canvas;
use iced::{Point, Rectangle, Renderer, Size, Theme};

use crate::Message;

/// Fraction of the track covered by the moving block
const BLOCK_WIDTH: f32 = 0.25;

/// How far the block moves per animation tick
const STEP: f32 = 0.015;

/// Animation state for the activity bar
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivityBar {
    /// Position of the block's leading edge, 0.0..1.0 around the loop
    pub phase: f32,
    pub running: bool,
}

impl ActivityBar {
    pub fn start(&mut self) {
        self.running = true;
        self.phase = 0.0;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.phase = 0.0;
    }

    pub fn tick(&mut self) {
        if self.running {
            self.phase = (self.phase + STEP) % 1.0;
        }
    }

    /// Visible span of the block as fractions of the track width
    fn block_span(&self) -> (f32, f32) {
        // The block enters from the left and leaves on the right
        let travel = 1.0 + BLOCK_WIDTH;
        let right = self.phase * travel;
        let left = right - BLOCK_WIDTH;
        (left.max(0.0), right.min(1.0))
    }
}

impl canvas::Program<Message> for ActivityBar {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let palette = theme.extended_palette();

        frame.fill_rectangle(Point::ORIGIN, bounds.size(), palette.background.weak.color);

        if self.running {
            let (left, right) = self.block_span();
            if right > left {
                frame.fill_rectangle(
                    Point::new(left * bounds.width, 0.0),
                    Size::new((right - left) * bounds.width, bounds.height),
                    palette.primary.base.color,
                );
            }
        }

        vec![frame.into_geometry()]
    }
}
