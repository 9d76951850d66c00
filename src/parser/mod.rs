pub mod eudract;
pub mod locator;

pub use eudract::HtmlTrialExtractor;
pub use locator::{FieldLocator, LabelLocator, TooltipLocator};
