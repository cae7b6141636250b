use models::{User, UserId};

pub const LABEL_SAVE: &str = "Save";
pub const LABEL_UPDATE: &str = "Update";
pub const EMPTY_MESSAGE: &str = "No users registered.";
pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this user?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

impl AlertKind {
    pub fn css_class(self) -> &'static str {
        match self {
            AlertKind::Success => "success",
            AlertKind::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

/// One table row. Edit and delete controls are keyed by `id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self { id: u.id, name: u.name.clone(), email: u.email.clone() }
    }
}

/// Command carried by a row's edit or delete control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowCommand {
    Edit(UserId),
    Delete(UserId),
}

impl RowCommand {
    /// Decode a clicked control from its class and `data-id` attribute.
    pub fn parse(class: &str, data_id: &str) -> Option<Self> {
        let id: UserId = data_id.trim().parse().ok()?;
        match class {
            "edit" => Some(RowCommand::Edit(id)),
            "delete" => Some(RowCommand::Delete(id)),
            _ => None,
        }
    }
}

/// Form state as it should be shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormView {
    /// Hidden record-id field; set only in edit mode.
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub submit_label: &'static str,
    pub cancel_visible: bool,
    /// Move focus to the name field.
    pub focus_name: bool,
}

impl FormView {
    pub fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            email: String::new(),
            submit_label: LABEL_SAVE,
            cancel_visible: false,
            focus_name: false,
        }
    }

    pub fn editing(user: &User) -> Self {
        Self {
            id: Some(user.id),
            name: user.name.clone(),
            email: user.email.clone(),
            submit_label: LABEL_UPDATE,
            cancel_visible: true,
            focus_name: true,
        }
    }
}

impl Default for FormView {
    fn default() -> Self { Self::blank() }
}

/// Rendering surface driven by the controller.
pub trait View {
    /// Replace the table body with `rows`; `rows` is never empty.
    fn render_table(&mut self, rows: &[UserRow]);
    /// Hide the table and show the empty-state placeholder.
    fn render_empty(&mut self);
    fn render_form(&mut self, form: &FormView);
    fn show_alert(&mut self, alert: &Alert);
    fn hide_alert(&mut self);
    /// Ask the operator a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_command_parses_known_controls() {
        assert_eq!(RowCommand::parse("edit", "1700000000000"), Some(RowCommand::Edit(1_700_000_000_000)));
        assert_eq!(RowCommand::parse("delete", " 7 "), Some(RowCommand::Delete(7)));
        assert_eq!(RowCommand::parse("archive", "7"), None);
        assert_eq!(RowCommand::parse("edit", "seven"), None);
    }

    #[test]
    fn blank_form_is_in_create_mode() {
        let f = FormView::default();
        assert_eq!(f.submit_label, LABEL_SAVE);
        assert!(!f.cancel_visible);
        assert_eq!(f.id, None);
    }
}
