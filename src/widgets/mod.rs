pub mod chain;
pub mod widget;

pub use chain::WidgetChain;
pub use widget::Widget;
