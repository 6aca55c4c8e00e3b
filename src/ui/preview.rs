/// Before/after preview panes
use iced::widget::{column, container, image, text};
use iced::{Alignment, Element, Length};
use std::path::{Path, PathBuf};

use crate::imaging::Preview;
use crate::Message;

/// What a pane is currently showing
#[derive(Debug, Clone, Default)]
pub enum PaneContent {
    #[default]
    Empty,
    Loading,
    Ready(Preview),
    Unavailable(String),
}

/// One preview pane and the file it was asked to show
#[derive(Debug, Clone, Default)]
pub struct PreviewPane {
    source: Option<PathBuf>,
    content: PaneContent,
}

impl PreviewPane {
    /// Start showing `path`; the pixels arrive later via `loaded`
    pub fn request(&mut self, path: PathBuf) {
        self.source = Some(path);
        self.content = PaneContent::Loading;
    }

    pub fn clear(&mut self) {
        self.source = None;
        self.content = PaneContent::Empty;
    }

    /// Accept a finished render
    ///
    /// Renders for a path the pane no longer shows are dropped, so a slow
    /// preview of an earlier selection cannot replace a newer one.
    pub fn loaded(&mut self, path: &Path, result: Result<Preview, String>) -> bool {
        if self.source.as_deref() != Some(path) {
            tracing::debug!(path = %path.display(), "Dropping stale preview");
            return false;
        }
        self.content = match result {
            Ok(preview) => PaneContent::Ready(preview),
            Err(message) => {
                tracing::warn!(path = %path.display(), error = %message, "Preview failed");
                PaneContent::Unavailable(message)
            }
        };
        true
    }

    pub fn content(&self) -> &PaneContent {
        &self.content
    }

    /// Build the pane: a title over the image or a placeholder
    pub fn view<'a>(&'a self, title: String, placeholder: &'a str) -> Element<'a, Message> {
        let body: Element<'a, Message> = match self.content() {
            PaneContent::Empty => text(placeholder).into(),
            PaneContent::Loading => text("Loading...").into(),
            PaneContent::Ready(preview) => image(preview.handle.clone())
                .width(Length::Fixed(preview.width as f32))
                .height(Length::Fixed(preview.height as f32))
                .into(),
            PaneContent::Unavailable(message) => {
                text(format!("Preview unavailable: {message}")).size(12).into()
            }
        };

        column![
            text(title).size(16),
            container(body)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .width(Length::FillPortion(1))
        .into()
    }
}
