pub mod badge;
pub mod format;
pub mod overlay;
pub mod popup;
pub mod sink;

pub use badge::Badge;
pub use overlay::OverlayView;
pub use popup::PopupView;
pub use sink::{PresentationSink, TerminalOverlay};
