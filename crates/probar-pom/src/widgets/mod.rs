//! Leaf widgets: buttons, links, checkboxes and text inputs.
//!
//! Each widget is an [`Element`](crate::Element) with a default locator and
//! a few behaviors of its own. All of them dereference to their element, so
//! the generic accessors (`click`, `text`, `attribute`, ...) are available
//! directly, and all of them can be [`Collection`](crate::Collection)
//! children or parents of other elements.

mod button;
mod checkbox;
mod input;
mod link;

pub use button::Button;
pub use checkbox::Checkbox;
pub use input::Input;
pub use link::Link;
