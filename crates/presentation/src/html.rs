//! Markup rendering for hosts that display the registry in a browser.

use crate::view::{Alert, FormView, UserRow, View, EMPTY_MESSAGE};

/// `View` that keeps the latest markup and visibility flags for each region.
/// A host copies these into its page after every controller call.
#[derive(Debug, Clone)]
pub struct HtmlView {
    pub table_body: String,
    pub table_hidden: bool,
    pub empty_message: Option<&'static str>,
    pub form: FormView,
    /// Alert box markup while an alert is visible.
    pub alert: Option<String>,
    auto_confirm: bool,
}

impl HtmlView {
    /// `auto_confirm` answers every confirmation prompt.
    pub fn new(auto_confirm: bool) -> Self {
        Self {
            table_body: String::new(),
            table_hidden: true,
            empty_message: Some(EMPTY_MESSAGE),
            form: FormView::blank(),
            alert: None,
            auto_confirm,
        }
    }
}

impl Default for HtmlView {
    fn default() -> Self { Self::new(true) }
}

/// Escape text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render_row(row: &UserRow) -> String {
    format!(
        "<tr><td>{name}</td><td>{email}</td><td class=\"actions\">\
         <button class=\"edit\" data-id=\"{id}\">Edit</button>\
         <button class=\"delete\" data-id=\"{id}\">Delete</button></td></tr>",
        name = escape(&row.name),
        email = escape(&row.email),
        id = row.id,
    )
}

pub fn render_alert(alert: &Alert) -> String {
    format!("<div class=\"alert {}\">{}</div>", alert.kind.css_class(), escape(&alert.message))
}

impl View for HtmlView {
    fn render_table(&mut self, rows: &[UserRow]) {
        self.table_body = rows.iter().map(render_row).collect();
        self.table_hidden = false;
        self.empty_message = None;
    }

    fn render_empty(&mut self) {
        self.table_body.clear();
        self.table_hidden = true;
        self.empty_message = Some(EMPTY_MESSAGE);
    }

    fn render_form(&mut self, form: &FormView) {
        self.form = form.clone();
    }

    fn show_alert(&mut self, alert: &Alert) {
        self.alert = Some(render_alert(alert));
    }

    fn hide_alert(&mut self) {
        self.alert = None;
    }

    fn confirm(&mut self, _message: &str) -> bool {
        self.auto_confirm
    }
}
