pub mod boxes;
pub mod clock;
pub mod hover;
pub mod tooltip;

pub use boxes::{
    BOX_HEIGHT_FLOOR, BoxId, BoxMode, BoxStore, ContentType, FloatingBox, FloatingBoxGroup,
    distribute_heights,
};
pub use clock::{Clock, SystemClock, VirtualClock};
pub use hover::{HoverConfig, HoverController, HoverZone};
pub use tooltip::{LinkTooltip, TooltipContent};
