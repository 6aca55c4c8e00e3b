/// Image service
///
/// This module handles:
/// - Scaled previews for the before/after panes (preview.rs)
/// - Removing the background and saving the result (removal.rs)
/// - The model seam and mask compositing (segmenter.rs)
/// - The U2-Net model itself (u2net.rs)

pub mod preview;
pub mod removal;
pub mod segmenter;
pub mod u2net;

pub use preview::Preview;
pub use removal::ImageService;
