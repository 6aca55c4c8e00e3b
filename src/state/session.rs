/// Session state and the transitions between its phases
///
/// The UI never mutates the session directly. It turns button presses,
/// dialog results and worker completions into `Event`s, feeds them to
/// `Session::handle`, and carries out the `Effect`s that come back.
/// That keeps every state change in one place and lets the whole machine
/// be tested without a window.

use std::path::{Path, PathBuf};

use crate::config::{OUTPUT_EXTENSION, OUTPUT_SUFFIX};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected yet
    Idle,
    /// A file is selected and no worker is running
    Ready,
    /// A worker is in flight
    Processing,
}

/// How the most recent dispatch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(PathBuf),
    Failed(String),
}

/// The two preview panes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// A modal message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

impl Notification {
    fn info(title: &str, body: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            title: title.to_string(),
            body: body.into(),
        }
    }

    fn error(body: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: "Error".to_string(),
            body: body.into(),
        }
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// User pressed "Choose Image"
    SelectRequested,
    /// The file dialog closed; `None` means it was cancelled
    FileChosen(Option<PathBuf>),
    /// User pressed "Remove Background"
    StartRequested,
    /// The worker returned, delivered on the UI thread
    WorkerFinished(Result<PathBuf, String>),
}

/// Work the UI has to carry out after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    OpenFileDialog,
    RenderPreview { slot: Slot, path: PathBuf },
    ClearPreview(Slot),
    /// Start the removal off the UI thread
    Dispatch { input: PathBuf, output: PathBuf },
    Notify(Notification),
}

/// The single process-lifetime record of what the user is working on
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    phase: Phase,
    /// The file picker is open and its answer has not arrived yet
    choosing: bool,
    last_outcome: Option<Outcome>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self {
            input_path: None,
            output_path: None,
            phase: Phase::Idle,
            choosing: false,
            last_outcome: None,
        }
    }

    /// Apply one event and return what the UI should do next
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::SelectRequested => {
                if self.is_processing() {
                    tracing::warn!("File selection requested while processing, ignoring");
                    return Vec::new();
                }
                if self.choosing {
                    tracing::debug!("File picker already open, ignoring");
                    return Vec::new();
                }
                self.choosing = true;
                vec![Effect::OpenFileDialog]
            }

            Event::FileChosen(None) => {
                tracing::debug!("File dialog cancelled");
                self.choosing = false;
                Vec::new()
            }

            Event::FileChosen(Some(path)) => {
                self.choosing = false;
                if self.is_processing() {
                    tracing::warn!(path = %path.display(), "File chosen while processing, ignoring");
                    return Vec::new();
                }

                tracing::info!(path = %path.display(), "Selected input image");
                self.input_path = Some(path.clone());
                self.output_path = None;
                self.last_outcome = None;
                self.phase = Phase::Ready;

                vec![
                    Effect::RenderPreview { slot: Slot::Before, path },
                    Effect::ClearPreview(Slot::After),
                ]
            }

            Event::StartRequested => self.start(),

            Event::WorkerFinished(result) => self.finish(result),
        }
    }

    fn start(&mut self) -> Vec<Effect> {
        // The pending selection would land mid-run and be lost
        if self.choosing {
            tracing::warn!("File picker open, ignoring start request");
            return Vec::new();
        }

        let Some(input) = self.input_path.clone() else {
            return vec![Effect::Notify(Notification::error("Select an image first!"))];
        };

        // Single-flight guard, independent of whether the button is disabled yet
        if self.is_processing() {
            tracing::warn!("Removal already running, ignoring start request");
            return Vec::new();
        }

        let output = output_path_for(&input);
        self.output_path = Some(output.clone());
        self.phase = Phase::Processing;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            "Dispatching background removal"
        );
        // The old result is about to be rewritten; don't let the pane read it
        vec![
            Effect::ClearPreview(Slot::After),
            Effect::Dispatch { input, output },
        ]
    }

    fn finish(&mut self, result: Result<PathBuf, String>) -> Vec<Effect> {
        if !self.is_processing() {
            tracing::warn!(?result, "Worker result arrived with no dispatch in flight, dropping");
            return Vec::new();
        }
        self.phase = Phase::Ready;

        match result {
            Ok(output) => {
                tracing::info!(output = %output.display(), "Background removal complete");
                self.output_path = Some(output.clone());
                self.last_outcome = Some(Outcome::Completed(output.clone()));

                let mut effects = Vec::with_capacity(3);
                if let Some(input) = self.input_path.clone() {
                    effects.push(Effect::RenderPreview { slot: Slot::Before, path: input });
                }
                effects.push(Effect::RenderPreview { slot: Slot::After, path: output });
                effects.push(Effect::Notify(Notification::info(
                    "Success",
                    "Background removed successfully!",
                )));
                effects
            }
            Err(message) => {
                tracing::warn!(error = %message, "Background removal failed");
                self.last_outcome = Some(Outcome::Failed(message.clone()));
                vec![Effect::Notify(Notification::error(format!(
                    "Something went wrong: {message}"
                )))]
            }
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn input_path(&self) -> Option<&Path> {
        self.input_path.as_deref()
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.phase == Phase::Processing
    }

    /// Whether "Choose Image" should be enabled
    pub fn can_select(&self) -> bool {
        !self.is_processing() && !self.choosing
    }

    /// Whether "Remove Background" should be enabled
    pub fn can_process(&self) -> bool {
        self.input_path.is_some() && !self.is_processing() && !self.choosing
    }

    /// Text for the status line
    pub fn status_text(&self) -> String {
        if self.is_processing() {
            return "Status: Processing...".to_string();
        }
        match self.last_outcome() {
            Some(Outcome::Completed(path)) => {
                format!("Status: Done! File saved to: {}", path.display())
            }
            Some(Outcome::Failed(_)) => "Status: Error!".to_string(),
            None => "Status: Ready".to_string(),
        }
    }

    /// Name of the selected file, for the label next to the button
    pub fn file_label(&self) -> String {
        self.input_path()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "No file selected".to_string())
    }
}

/// `{dir}/{stem}_no_bg.png` next to the input
pub fn output_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}.{OUTPUT_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_session(path: &str) -> Session {
        let mut session = Session::new();
        session.handle(Event::FileChosen(Some(PathBuf::from(path))));
        session
    }

    fn dispatch_of(effects: &[Effect]) -> Option<(PathBuf, PathBuf)> {
        effects.iter().find_map(|effect| match effect {
            Effect::Dispatch { input, output } => Some((input.clone(), output.clone())),
            _ => None,
        })
    }

    fn notification_of(effects: &[Effect]) -> Option<&Notification> {
        effects.iter().find_map(|effect| match effect {
            Effect::Notify(n) => Some(n),
            _ => None,
        })
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("/a/b/photo.jpg")),
            PathBuf::from("/a/b/photo_no_bg.png")
        );
        assert_eq!(
            output_path_for(Path::new("/a/b/archive.tar.gz")),
            PathBuf::from("/a/b/archive.tar_no_bg.png")
        );
        assert_eq!(
            output_path_for(Path::new("/a/b/noext")),
            PathBuf::from("/a/b/noext_no_bg.png")
        );
        // A PNG input still gets its own output file
        assert_eq!(
            output_path_for(Path::new("pic.png")),
            PathBuf::from("pic_no_bg.png")
        );
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.input_path().is_none());
        assert!(session.output_path().is_none());
        assert!(session.can_select());
        assert!(!session.can_process());
        assert_eq!(session.status_text(), "Status: Ready");
        assert_eq!(session.file_label(), "No file selected");
    }

    #[test]
    fn test_select_requested_opens_dialog() {
        let mut session = Session::new();
        assert_eq!(session.handle(Event::SelectRequested), vec![Effect::OpenFileDialog]);
    }

    #[test]
    fn test_choosing_file_makes_ready() {
        let mut session = Session::new();
        let effects = session.handle(Event::FileChosen(Some(PathBuf::from("/pics/cat.jpg"))));

        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.input_path(), Some(Path::new("/pics/cat.jpg")));
        assert!(session.can_process());
        assert_eq!(session.file_label(), "cat.jpg");
        assert_eq!(
            effects,
            vec![
                Effect::RenderPreview {
                    slot: Slot::Before,
                    path: PathBuf::from("/pics/cat.jpg")
                },
                Effect::ClearPreview(Slot::After),
            ]
        );
    }

    #[test]
    fn test_cancelled_dialog_changes_nothing() {
        let mut session = ready_session("/pics/cat.jpg");
        session.handle(Event::StartRequested);
        session.handle(Event::WorkerFinished(Ok(PathBuf::from("/pics/cat_no_bg.png"))));
        let before = session.clone();

        session.handle(Event::SelectRequested);
        let effects = session.handle(Event::FileChosen(None));

        assert!(effects.is_empty());
        assert_eq!(session, before);
        assert!(session.can_select());
    }

    #[test]
    fn test_second_select_while_picker_open_is_ignored() {
        let mut session = ready_session("/pics/cat.jpg");

        assert_eq!(session.handle(Event::SelectRequested), vec![Effect::OpenFileDialog]);
        assert!(!session.can_select());
        assert!(!session.can_process());

        assert!(session.handle(Event::SelectRequested).is_empty());
    }

    #[test]
    fn test_start_while_picker_open_keeps_new_selection() {
        let mut session = ready_session("/pics/cat.jpg");
        session.handle(Event::SelectRequested);

        let start = session.handle(Event::StartRequested);
        assert!(start.is_empty());
        assert!(!session.is_processing());

        let chosen = session.handle(Event::FileChosen(Some(PathBuf::from("/pics/dog.jpg"))));

        assert!(!chosen.is_empty());
        assert_eq!(session.input_path(), Some(Path::new("/pics/dog.jpg")));
        assert!(session.can_process());
        assert!(session.can_select());
    }

    #[test]
    fn test_start_while_picker_open_without_input_is_silent() {
        let mut session = Session::new();
        session.handle(Event::SelectRequested);

        assert!(session.handle(Event::StartRequested).is_empty());
    }

    #[test]
    fn test_start_clears_previous_result_preview() {
        let mut session = ready_session("/pics/cat.jpg");
        session.handle(Event::StartRequested);
        session.handle(Event::WorkerFinished(Ok(PathBuf::from("/pics/cat_no_bg.png"))));

        let effects = session.handle(Event::StartRequested);

        assert_eq!(effects.first(), Some(&Effect::ClearPreview(Slot::After)));
        assert!(dispatch_of(&effects).is_some());
    }

    #[test]
    fn test_start_without_input_notifies_error() {
        let mut session = Session::new();
        let effects = session.handle(Event::StartRequested);

        assert_eq!(session.phase(), Phase::Idle);
        assert!(dispatch_of(&effects).is_none());
        let notification = notification_of(&effects).unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(session.output_path().is_none());
    }

    #[test]
    fn test_start_dispatches_and_disables_actions() {
        let mut session = ready_session("/a/b/photo.jpg");
        let effects = session.handle(Event::StartRequested);

        assert_eq!(
            dispatch_of(&effects),
            Some((PathBuf::from("/a/b/photo.jpg"), PathBuf::from("/a/b/photo_no_bg.png")))
        );
        assert!(session.is_processing());
        assert!(!session.can_process());
        assert!(!session.can_select());
        assert_eq!(session.output_path(), Some(Path::new("/a/b/photo_no_bg.png")));
        assert_eq!(session.status_text(), "Status: Processing...");
    }

    #[test]
    fn test_second_start_while_processing_is_ignored() {
        let mut session = ready_session("/a/b/photo.jpg");
        session.handle(Event::StartRequested);

        let effects = session.handle(Event::StartRequested);

        assert!(effects.is_empty());
        assert!(session.is_processing());
    }

    #[test]
    fn test_selection_blocked_while_processing() {
        let mut session = ready_session("/a/b/photo.jpg");
        session.handle(Event::StartRequested);

        assert!(session.handle(Event::SelectRequested).is_empty());
        assert!(session
            .handle(Event::FileChosen(Some(PathBuf::from("/a/b/other.jpg"))))
            .is_empty());
        assert_eq!(session.input_path(), Some(Path::new("/a/b/photo.jpg")));
    }

    #[test]
    fn test_success_scenario() {
        let mut session = ready_session("/pics/cat.jpg");
        session.handle(Event::StartRequested);

        let effects = session.handle(Event::WorkerFinished(Ok(PathBuf::from("/pics/cat_no_bg.png"))));

        assert_eq!(session.phase(), Phase::Ready);
        assert!(session.can_process());
        assert!(session.can_select());
        assert!(session.status_text().contains("cat_no_bg.png"));
        assert_eq!(
            session.last_outcome(),
            Some(&Outcome::Completed(PathBuf::from("/pics/cat_no_bg.png")))
        );
        assert!(effects.contains(&Effect::RenderPreview {
            slot: Slot::Before,
            path: PathBuf::from("/pics/cat.jpg")
        }));
        assert!(effects.contains(&Effect::RenderPreview {
            slot: Slot::After,
            path: PathBuf::from("/pics/cat_no_bg.png")
        }));
        assert_eq!(notification_of(&effects).unwrap().kind, NotificationKind::Info);
    }

    #[test]
    fn test_failure_scenario() {
        let mut session = ready_session("/pics/broken.png");
        session.handle(Event::StartRequested);

        let effects = session.handle(Event::WorkerFinished(Err(
            "Inference error: cannot decode image".to_string(),
        )));

        assert_eq!(session.phase(), Phase::Ready);
        assert!(session.can_process());
        assert!(session.can_select());
        assert_eq!(session.status_text(), "Status: Error!");
        // The planned output path survives a failure
        assert_eq!(session.output_path(), Some(Path::new("/pics/broken_no_bg.png")));
        let notification = notification_of(&effects).unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(notification.body.contains("cannot decode image"));
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::RenderPreview { slot: Slot::After, .. })));
    }

    #[test]
    fn test_stray_worker_result_is_dropped() {
        let mut session = ready_session("/pics/cat.jpg");
        let before = session.clone();

        let effects = session.handle(Event::WorkerFinished(Ok(PathBuf::from("/pics/cat_no_bg.png"))));

        assert!(effects.is_empty());
        assert_eq!(session, before);
    }

    #[test]
    fn test_new_selection_clears_output() {
        let mut session = ready_session("/pics/cat.jpg");
        session.handle(Event::StartRequested);
        session.handle(Event::WorkerFinished(Ok(PathBuf::from("/pics/cat_no_bg.png"))));

        session.handle(Event::FileChosen(Some(PathBuf::from("/pics/dog.jpg"))));

        assert!(session.output_path().is_none());
        assert!(session.last_outcome().is_none());
        assert_eq!(session.status_text(), "Status: Ready");
    }

    #[test]
    fn test_rerun_after_completion_targets_same_output() {
        let mut session = ready_session("/pics/cat.jpg");
        let first = dispatch_of(&session.handle(Event::StartRequested));
        session.handle(Event::WorkerFinished(Ok(PathBuf::from("/pics/cat_no_bg.png"))));

        let second = dispatch_of(&session.handle(Event::StartRequested));

        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
