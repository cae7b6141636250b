use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use models::UserId;
use service::{storage::UserRepository, ServiceError, UserService};

use crate::view::{Alert, AlertKind, FormView, RowCommand, UserRow, View, CONFIRM_DELETE};

pub const MSG_CREATED: &str = "User created successfully!";
pub const MSG_UPDATED: &str = "User updated successfully!";
pub const MSG_DELETED: &str = "User deleted successfully!";

#[derive(Clone, Debug)]
struct ActiveAlert {
    alert: Alert,
    expires_at: DateTime<Utc>,
}

/// Binds operator commands to the user service and keeps the view in sync.
///
/// The only UI state is `editing`: the id loaded into the form, or `None`
/// when the form creates new users.
pub struct UserController<R: UserRepository, V: View> {
    service: UserService<R>,
    view: V,
    editing: Option<UserId>,
    form: FormView,
    alert: Option<ActiveAlert>,
    alert_ttl: Duration,
}

impl<R: UserRepository, V: View> UserController<R, V> {
    pub fn new(service: UserService<R>, view: V, alert_ttl: Duration) -> Self {
        Self { service, view, editing: None, form: FormView::blank(), alert: None, alert_ttl }
    }

    /// Initial render: blank form and the current table.
    pub fn start(&mut self) {
        self.view.render_form(&self.form);
        self.render_list();
    }

    /// Form submission. Creates when not editing, updates otherwise.
    pub fn submit(&mut self, name: &str, email: &str) {
        let result = match self.editing {
            Some(id) => self.service.update(id, name, email).map(|_| MSG_UPDATED),
            None => self.service.create(name, email).map(|_| MSG_CREATED),
        };
        match result {
            Ok(msg) => {
                self.show_alert(AlertKind::Success, msg);
                self.clear_form();
                self.render_list();
            }
            Err(e) => {
                // keep what the operator typed
                self.form.name = name.to_string();
                self.form.email = email.to_string();
                self.form.focus_name = false;
                self.view.render_form(&self.form);
                self.report(&e);
            }
        }
    }

    /// Load a row into the form and enter edit mode.
    pub fn edit(&mut self, id: UserId) {
        match self.service.repository().find_by_id(id) {
            Some(user) => {
                debug!(user_id = id, "entering edit mode");
                self.editing = Some(id);
                self.form = FormView::editing(&user);
                self.view.render_form(&self.form);
            }
            None => self.report(&ServiceError::NotFound(service::user_service::MSG_USER_NOT_FOUND.into())),
        }
    }

    /// Delete a row after the operator confirms.
    pub fn delete(&mut self, id: UserId) {
        if !self.view.confirm(CONFIRM_DELETE) {
            debug!(user_id = id, "delete declined");
            return;
        }
        match self.service.delete(id) {
            Ok(()) => {
                if self.editing == Some(id) {
                    self.clear_form();
                }
                self.show_alert(AlertKind::Success, MSG_DELETED);
                self.render_list();
            }
            Err(e) => self.report(&e),
        }
    }

    /// Route a row button click.
    pub fn handle_row(&mut self, command: RowCommand) {
        match command {
            RowCommand::Edit(id) => self.edit(id),
            RowCommand::Delete(id) => self.delete(id),
        }
    }

    /// Leave edit mode without persisting anything.
    pub fn cancel(&mut self) {
        self.clear_form();
    }

    /// Hide the alert once its display time is over.
    pub fn tick(&mut self) {
        let now = self.service.clock().now();
        if self.alert.as_ref().is_some_and(|a| now >= a.expires_at) {
            self.alert = None;
            self.view.hide_alert();
        }
    }

    pub fn editing(&self) -> Option<UserId> { self.editing }

    pub fn form(&self) -> &FormView { &self.form }

    pub fn alert(&self) -> Option<&Alert> { self.alert.as_ref().map(|a| &a.alert) }

    pub fn service(&self) -> &UserService<R> { &self.service }

    pub fn view(&self) -> &V { &self.view }

    pub fn view_mut(&mut self) -> &mut V { &mut self.view }

    fn render_list(&mut self) {
        let rows: Vec<UserRow> = self.service.list().iter().map(UserRow::from).collect();
        if rows.is_empty() {
            self.view.render_empty();
        } else {
            self.view.render_table(&rows);
        }
    }

    fn clear_form(&mut self) {
        self.editing = None;
        self.form = FormView::blank();
        self.view.render_form(&self.form);
    }

    fn report(&mut self, e: &ServiceError) {
        warn!(code = e.code(), error = %e, "operation failed");
        self.show_alert(AlertKind::Error, e.user_message());
    }

    fn show_alert(&mut self, kind: AlertKind, message: &str) {
        let alert = Alert { kind, message: message.to_string() };
        let expires_at = self
            .service
            .clock()
            .now()
            .checked_add_signed(self.alert_ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.view.show_alert(&alert);
        self.alert = Some(ActiveAlert { alert, expires_at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;
    use service::storage::{kv_store::mock::SwitchableKvStore, KvUserRepository};
    use service::ManualClock;

    use crate::view::{LABEL_SAVE, LABEL_UPDATE};

    #[derive(Default)]
    struct RecordingView {
        rows: Option<Vec<UserRow>>,
        empty_shown: bool,
        form: Option<FormView>,
        alert: Option<Alert>,
        confirm_answer: bool,
        confirm_asked: Vec<String>,
    }

    impl View for RecordingView {
        fn render_table(&mut self, rows: &[UserRow]) {
            self.rows = Some(rows.to_vec());
            self.empty_shown = false;
        }
        fn render_empty(&mut self) {
            self.rows = None;
            self.empty_shown = true;
        }
        fn render_form(&mut self, form: &FormView) { self.form = Some(form.clone()); }
        fn show_alert(&mut self, alert: &Alert) { self.alert = Some(alert.clone()); }
        fn hide_alert(&mut self) { self.alert = None; }
        fn confirm(&mut self, message: &str) -> bool {
            self.confirm_asked.push(message.to_string());
            self.confirm_answer
        }
    }

    type Ctl = UserController<KvUserRepository<SwitchableKvStore>, RecordingView>;

    fn controller() -> (Ctl, Arc<ManualClock>, Arc<SwitchableKvStore>) {
        let clock = Arc::new(ManualClock::new(Utc.timestamp_millis_opt(1_700_000_000_000).single().unwrap()));
        let store = Arc::new(SwitchableKvStore::default());
        let svc = UserService::new(Arc::new(KvUserRepository::new(store.clone())), clock.clone());
        let view = RecordingView { confirm_answer: true, ..Default::default() };
        let mut ctl = UserController::new(svc, view, Duration::milliseconds(3000));
        ctl.start();
        (ctl, clock, store)
    }

    #[test]
    fn start_renders_empty_state_and_blank_form() {
        let (ctl, _, _) = controller();
        assert!(ctl.view().empty_shown);
        assert_eq!(ctl.view().form.as_ref().map(|f| f.submit_label), Some(LABEL_SAVE));
    }

    #[test]
    fn submit_creates_and_renders_row() {
        let (mut ctl, _, _) = controller();
        ctl.submit("Ana Silva", "ana@example.com");
        let rows = ctl.view().rows.clone().unwrap_or_default();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Ana Silva");
        assert_eq!(ctl.alert(), Some(&Alert { kind: AlertKind::Success, message: MSG_CREATED.into() }));
        assert_eq!(ctl.form(), &FormView::blank());
    }

    #[test]
    fn edit_then_submit_updates() {
        let (mut ctl, _, _) = controller();
        ctl.submit("Ana", "ana@example.com");
        let id = ctl.service().list()[0].id;

        ctl.edit(id);
        assert_eq!(ctl.editing(), Some(id));
        let form = ctl.view().form.clone().unwrap();
        assert_eq!(form.submit_label, LABEL_UPDATE);
        assert!(form.cancel_visible);
        assert_eq!(form.id, Some(id));
        assert_eq!(form.email, "ana@example.com");

        ctl.submit("Ana S.", "ana2@example.com");
        assert_eq!(ctl.editing(), None);
        assert_eq!(ctl.alert().map(|a| a.message.as_str()), Some(MSG_UPDATED));
        let rows = ctl.view().rows.clone().unwrap();
        assert_eq!(rows, vec![UserRow { id, name: "Ana S.".into(), email: "ana2@example.com".into() }]);
    }

    #[test]
    fn failed_submit_keeps_edit_mode_and_input() {
        let (mut ctl, _, _) = controller();
        ctl.submit("A", "a@x.io");
        ctl.submit("B", "b@x.io");
        let a = ctl.service().list()[0].id;

        ctl.edit(a);
        ctl.submit("A", "B@X.IO");
        assert_eq!(ctl.editing(), Some(a));
        let alert = ctl.alert().cloned().unwrap();
        assert_eq!(alert.kind, AlertKind::Error);
        let form = ctl.form();
        assert_eq!(form.email, "B@X.IO");
        assert_eq!(form.submit_label, LABEL_UPDATE);
    }

    #[test]
    fn cancel_leaves_edit_mode_without_saving() {
        let (mut ctl, _, _) = controller();
        ctl.submit("A", "a@x.io");
        let before = ctl.service().list();
        ctl.edit(before[0].id);
        ctl.cancel();
        assert_eq!(ctl.editing(), None);
        assert_eq!(ctl.view().form.clone(), Some(FormView::blank()));
        assert_eq!(ctl.service().list(), before);
    }

    #[test]
    fn delete_requires_confirmation() {
        let (mut ctl, _, _) = controller();
        ctl.submit("A", "a@x.io");
        let id = ctl.service().list()[0].id;

        ctl.view_mut().confirm_answer = false;
        ctl.delete(id);
        assert_eq!(ctl.service().list().len(), 1);
        assert_eq!(ctl.view().confirm_asked, vec![CONFIRM_DELETE.to_string()]);

        ctl.view_mut().confirm_answer = true;
        ctl.delete(id);
        assert!(ctl.service().list().is_empty());
        assert!(ctl.view().empty_shown);
        assert_eq!(ctl.alert().map(|a| a.message.as_str()), Some(MSG_DELETED));
    }

    #[test]
    fn row_commands_route_to_edit_and_delete() {
        let (mut ctl, _, _) = controller();
        ctl.submit("A", "a@x.io");
        let id = ctl.service().list()[0].id;
        ctl.handle_row(RowCommand::Edit(id));
        assert_eq!(ctl.editing(), Some(id));
        ctl.handle_row(RowCommand::Delete(id));
        assert!(ctl.service().list().is_empty());
    }

    #[test]
    fn deleting_the_edited_row_leaves_edit_mode() {
        let (mut ctl, _, _) = controller();
        ctl.submit("A", "a@x.io");
        let id = ctl.service().list()[0].id;
        ctl.edit(id);
        ctl.delete(id);
        assert_eq!(ctl.editing(), None);
        assert_eq!(ctl.form(), &FormView::blank());
    }

    #[test]
    fn edit_of_unknown_id_shows_error() {
        let (mut ctl, _, _) = controller();
        ctl.edit(99);
        assert_eq!(ctl.editing(), None);
        assert_eq!(ctl.alert().map(|a| a.kind), Some(AlertKind::Error));
    }

    #[test]
    fn persistence_failure_is_shown_not_panicked() {
        let (mut ctl, _, store) = controller();
        store.fail_writes(true);
        ctl.submit("A", "a@x.io");
        assert_eq!(ctl.alert().map(|a| a.kind), Some(AlertKind::Error));
        assert!(ctl.service().list().is_empty());
        assert_eq!(ctl.form().name, "A");
    }

    #[test]
    fn alert_dismisses_after_delay() {
        let (mut ctl, clock, _) = controller();
        ctl.submit("", "");
        assert!(ctl.view().alert.is_some());

        clock.advance(Duration::milliseconds(2999));
        ctl.tick();
        assert!(ctl.view().alert.is_some());

        clock.advance(Duration::milliseconds(1));
        ctl.tick();
        assert!(ctl.view().alert.is_none());
        assert!(ctl.alert().is_none());
    }

    #[test]
    fn unrepresentable_alert_expiry_saturates() {
        let clock = Arc::new(ManualClock::new(Utc.timestamp_millis_opt(1_700_000_000_000).single().unwrap()));
        let store = Arc::new(SwitchableKvStore::default());
        let svc = UserService::new(Arc::new(KvUserRepository::new(store)), clock.clone());
        let view = RecordingView { confirm_answer: true, ..Default::default() };
        let mut ctl = UserController::new(svc, view, Duration::days(1_000_000_000));
        ctl.start();

        ctl.submit("Ana", "ana@example.com");
        assert_eq!(ctl.alert().map(|a| a.kind), Some(AlertKind::Success));
        clock.advance(Duration::days(365));
        ctl.tick();
        assert!(ctl.alert().is_some());
    }

    #[test]
    fn newer_alert_restarts_timer() {
        let (mut ctl, clock, _) = controller();
        ctl.submit("", "");
        clock.advance(Duration::milliseconds(2000));
        ctl.submit("A", "a@x.io");
        clock.advance(Duration::milliseconds(2000));
        ctl.tick();
        assert_eq!(ctl.alert().map(|a| a.kind), Some(AlertKind::Success));
    }
}
