use iced::widget::{button, canvas, column, container, row, text};
use iced::{Alignment, Element, Length, Size, Subscription, Task, Theme};
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageLevel};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod imaging;
mod state;
mod ui;

use config::{AppConfig, IMAGE_EXTENSIONS};
use imaging::removal::run_removal;
use imaging::u2net::U2NetSegmenter;
use imaging::{ImageService, Preview};
use state::{Effect, Event, Notification, NotificationKind, Outcome, Session, Slot};
use ui::{ActivityBar, PreviewPane};

/// Main application state
struct BgRemover {
    /// Selected file, planned output and processing phase
    session: Session,
    /// Stateless wrapper around the model and file I/O
    service: ImageService,
    config: AppConfig,
    before: PreviewPane,
    after: PreviewPane,
    activity: ActivityBar,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Choose Image"
    ChooseImage,
    /// The file dialog closed
    FileChosen(Option<PathBuf>),
    /// User clicked "Remove Background"
    RemoveBackground,
    /// The background removal worker returned
    WorkerFinished(Result<PathBuf, String>),
    /// A preview finished rendering
    PreviewLoaded {
        slot: Slot,
        path: PathBuf,
        result: Result<Preview, String>,
    },
    /// A notification dialog was dismissed
    NotificationClosed,
    /// Animation frame for the activity bar
    Tick,
}

impl BgRemover {
    /// Create a new instance of the application with the U2-Net model
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let segmenter = Arc::new(U2NetSegmenter::new(config.model_path.clone()));
        tracing::info!(model = %config.model_path.display(), "Background Remover starting");
        (Self::with_service(config, ImageService::new(segmenter)), Task::none())
    }

    fn with_service(config: AppConfig, service: ImageService) -> Self {
        BgRemover {
            session: Session::new(),
            service,
            config,
            before: PreviewPane::default(),
            after: PreviewPane::default(),
            activity: ActivityBar::default(),
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let event = match message {
            Message::ChooseImage => Event::SelectRequested,
            Message::FileChosen(path) => Event::FileChosen(path),
            Message::RemoveBackground => Event::StartRequested,
            Message::WorkerFinished(result) => Event::WorkerFinished(result),
            Message::PreviewLoaded { slot, path, result } => {
                self.pane_mut(slot).loaded(&path, result);
                return Task::none();
            }
            Message::NotificationClosed => return Task::none(),
            Message::Tick => {
                self.activity.tick();
                return Task::none();
            }
        };

        let effects = self.session.handle(event);
        self.sync_activity();
        Task::batch(effects.into_iter().map(|effect| self.run_effect(effect)))
    }

    /// Turn one state-machine effect into UI work
    fn run_effect(&mut self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::OpenFileDialog => Task::perform(pick_image(), Message::FileChosen),
            Effect::RenderPreview { slot, path } => {
                self.pane_mut(slot).request(path.clone());
                let width = self.config.preview_width;
                Task::perform(
                    imaging::preview::load_preview(path.clone(), width),
                    move |result| Message::PreviewLoaded {
                        slot,
                        path: path.clone(),
                        result,
                    },
                )
            }
            Effect::ClearPreview(slot) => {
                self.pane_mut(slot).clear();
                Task::none()
            }
            Effect::Dispatch { input, output } => Task::perform(
                run_removal(self.service.clone(), input, output),
                Message::WorkerFinished,
            ),
            Effect::Notify(notification) => {
                Task::perform(show_notification(notification), |_| Message::NotificationClosed)
            }
        }
    }

    fn pane_mut(&mut self, slot: Slot) -> &mut PreviewPane {
        match slot {
            Slot::Before => &mut self.before,
            Slot::After => &mut self.after,
        }
    }

    /// Keep the activity bar running exactly while a worker is in flight
    fn sync_activity(&mut self) {
        match (self.session.is_processing(), self.activity.running) {
            (true, false) => self.activity.start(),
            (false, true) => self.activity.stop(),
            _ => {}
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let after_title = match self.session.output_path().and_then(|p| p.file_name()) {
            Some(name) => format!("After ({})", name.to_string_lossy()),
            None => "After".to_string(),
        };
        let previews = row![
            self.before.view("Before".to_string(), "No image yet"),
            self.after.view(after_title, "No result yet"),
        ]
        .spacing(10)
        .height(Length::Fill);

        let file_row = row![
            button("Choose Image")
                .on_press_maybe(self.session.can_select().then_some(Message::ChooseImage))
                .padding(10),
            text(self.session.file_label()),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let process = button("Remove Background")
            .on_press_maybe(self.session.can_process().then_some(Message::RemoveBackground))
            .padding(10);

        let content = column![
            previews,
            file_row,
            canvas(self.activity).width(Length::Fill).height(Length::Fixed(8.0)),
            container(process).center_x(Length::Fill),
            container(text(self.session.status_text()).size(14)).center_x(Length::Fill),
            container(text(self.failure_detail()).size(12)).center_x(Length::Fill),
        ]
        .spacing(12)
        .padding(10);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Message of the last failed run, shown under the status line
    fn failure_detail(&self) -> String {
        match self.session.last_outcome() {
            Some(Outcome::Failed(message)) => message.clone(),
            _ => String::new(),
        }
    }

    /// Only tick the animation while something is running
    fn subscription(&self) -> Subscription<Message> {
        if self.session.is_processing() {
            iced::time::every(Duration::from_millis(30)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    init_tracing();

    let config = AppConfig::default();
    let (width, height) = config.window_size;

    iced::application("Background Remover", BgRemover::update, BgRemover::view)
        .subscription(BgRemover::subscription)
        .theme(BgRemover::theme)
        .window_size(Size::new(width, height))
        .centered()
        .run_with(move || BgRemover::new(config))
}

/// Console logging, `info` unless RUST_LOG says otherwise
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Show the native file picker, restricted to common raster formats
async fn pick_image() -> Option<PathBuf> {
    AsyncFileDialog::new()
        .set_title("Choose Image")
        .add_filter("Image files", &IMAGE_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_file()
        .await
        .map(|file| file.path().to_path_buf())
}

/// Show a modal message box and wait for it to close
async fn show_notification(notification: Notification) {
    let level = match notification.kind {
        NotificationKind::Info => MessageLevel::Info,
        NotificationKind::Error => MessageLevel::Error,
    };

    AsyncMessageDialog::new()
        .set_level(level)
        .set_title(notification.title.as_str())
        .set_description(notification.body.as_str())
        .set_buttons(MessageButtons::Ok)
        .show()
        .await;
}
