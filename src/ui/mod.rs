/// Widgets specific to this app
///
/// - Before/after preview panes (preview.rs)
/// - Indeterminate activity bar (activity.rs)

pub mod activity;
pub mod preview;

pub use activity::ActivityBar;
pub use preview::PreviewPane;
