//! Presentation layer for the user registry.
//!
//! The controller turns operator commands (submit, edit, delete, cancel)
//! into `service` calls and pushes the resulting state to a [`view::View`].
//! Nothing here touches a DOM; a host implements `View` and forwards its
//! events to [`controller::UserController`].

pub mod bootstrap;
pub mod controller;
pub mod html;
pub mod view;

pub use controller::UserController;
pub use html::HtmlView;
pub use view::{Alert, AlertKind, FormView, RowCommand, UserRow, View};
