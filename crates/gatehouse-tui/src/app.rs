//! Application state for the gatehouse terminal client.
//!
//! `App` owns the session store, the screen for the current route and the
//! channel background requests report back on. Every navigation advances
//! the view generation, so results for screens already left are dropped.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use gatehouse_core::api::ApiClient;
use gatehouse_core::auth::{
    self, guard, BootstrapOutcome, BootstrapPolicy, GuardDecision, SessionStore, ViewGeneration,
    ViewScope,
};
use gatehouse_core::config::Config;
use gatehouse_core::forms::{
    check_reset_token, confirm_account, CreateAccountForm, Field, FieldErrors, ForgotPasswordForm,
    FormError, FormOutcome, LoginForm, NewPasswordForm, Notice, RegisterForm, ResetTokenStatus,
};
use gatehouse_core::routes::Route;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A screen has at most one request in flight, plus bootstrap.
const CHANNEL_BUFFER_SIZE: usize = 32;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// A submittable form together with its typed-in values.
#[derive(Debug, Clone)]
pub enum FormState {
    Login(LoginForm),
    Register(RegisterForm),
    CreateAccount(CreateAccountForm),
    ForgotPassword(ForgotPasswordForm),
    NewPassword { token: String, form: NewPasswordForm },
}

impl FormState {
    fn for_route(route: &Route) -> Option<Self> {
        match route {
            Route::Login => Some(FormState::Login(LoginForm::default())),
            Route::Register => Some(FormState::Register(RegisterForm::default())),
            Route::CreateAccount => Some(FormState::CreateAccount(CreateAccountForm::default())),
            Route::ForgotPassword => Some(FormState::ForgotPassword(ForgotPasswordForm::default())),
            Route::NewPassword(token) => Some(FormState::NewPassword {
                token: token.clone(),
                form: NewPasswordForm::default(),
            }),
            Route::ConfirmAccount(_) | Route::Home => None,
        }
    }

    /// Fields in display order.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            FormState::Login(_) => &[Field::Email, Field::Password],
            FormState::Register(_) => &[Field::Name, Field::Email, Field::Password],
            FormState::CreateAccount(_) => {
                &[Field::Name, Field::Email, Field::Password, Field::Confirm]
            }
            FormState::ForgotPassword(_) => &[Field::Email],
            FormState::NewPassword { .. } => &[Field::Password, Field::Confirm],
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match (self, field) {
            (FormState::Login(f), Field::Email) => &f.email,
            (FormState::Login(f), Field::Password) => &f.password,
            (FormState::Register(f), Field::Name) => &f.name,
            (FormState::Register(f), Field::Email) => &f.email,
            (FormState::Register(f), Field::Password) => &f.password,
            (FormState::CreateAccount(f), Field::Name) => &f.name,
            (FormState::CreateAccount(f), Field::Email) => &f.email,
            (FormState::CreateAccount(f), Field::Password) => &f.password,
            (FormState::CreateAccount(f), Field::Confirm) => &f.confirm,
            (FormState::ForgotPassword(f), Field::Email) => &f.email,
            (FormState::NewPassword { form, .. }, Field::Password) => &form.password,
            (FormState::NewPassword { form, .. }, Field::Confirm) => &form.confirm,
            _ => "",
        }
    }

    fn value_mut(&mut self, field: Field) -> Option<&mut String> {
        match (self, field) {
            (FormState::Login(f), Field::Email) => Some(&mut f.email),
            (FormState::Login(f), Field::Password) => Some(&mut f.password),
            (FormState::Register(f), Field::Name) => Some(&mut f.name),
            (FormState::Register(f), Field::Email) => Some(&mut f.email),
            (FormState::Register(f), Field::Password) => Some(&mut f.password),
            (FormState::CreateAccount(f), Field::Name) => Some(&mut f.name),
            (FormState::CreateAccount(f), Field::Email) => Some(&mut f.email),
            (FormState::CreateAccount(f), Field::Password) => Some(&mut f.password),
            (FormState::CreateAccount(f), Field::Confirm) => Some(&mut f.confirm),
            (FormState::ForgotPassword(f), Field::Email) => Some(&mut f.email),
            (FormState::NewPassword { form, .. }, Field::Password) => Some(&mut form.password),
            (FormState::NewPassword { form, .. }, Field::Confirm) => Some(&mut form.confirm),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        match self {
            FormState::Login(f) => f.validate().map(drop),
            FormState::Register(f) => f.validate().map(drop),
            FormState::CreateAccount(f) => f.validate().map(drop),
            FormState::ForgotPassword(f) => f.validate().map(drop),
            FormState::NewPassword { form, .. } => form.validate().map(drop),
        }
    }

    async fn submit(
        self,
        api: ApiClient,
        store: SessionStore,
        scope: ViewScope,
    ) -> Result<FormOutcome, FormError> {
        match self {
            FormState::Login(f) => f.submit(&api, &store, &scope).await,
            FormState::Register(f) => f.submit(&api, &store, &scope).await,
            FormState::CreateAccount(f) => f.submit(&api, &store, &scope).await,
            FormState::ForgotPassword(f) => f.submit(&api, &scope).await,
            FormState::NewPassword { token, form } => form.submit(&api, &token, &scope).await,
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            FormState::Login(_) => "Login",
            FormState::Register(_) => "Register",
            FormState::CreateAccount(_) => "Create account",
            FormState::ForgotPassword(_) => "Send instructions",
            FormState::NewPassword { .. } => "Save password",
        }
    }

    pub fn busy_label(&self) -> &'static str {
        match self {
            FormState::Login(_) => "Logging in...",
            FormState::Register(_) | FormState::CreateAccount(_) => "Creating account...",
            FormState::ForgotPassword(_) => "Sending...",
            FormState::NewPassword { .. } => "Saving...",
        }
    }
}

/// Reset-link validity, checked when the new-password screen opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    Checking,
    Valid,
    Invalid,
}

/// One selectable row on a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Field(Field),
    Submit,
    Link(&'static str, Route),
    SignOut,
}

/// Everything rendered for the current route.
#[derive(Debug, Clone)]
pub struct Screen {
    pub route: Route,
    pub form: Option<FormState>,
    pub token_check: Option<TokenCheck>,
    pub focus: usize,
    pub errors: FieldErrors,
    pub notice: Option<Notice>,
    /// A request started from this screen has not settled.
    pub pending: bool,
}

impl Screen {
    pub fn new(route: Route) -> Self {
        let token_check = matches!(route, Route::NewPassword(_)).then_some(TokenCheck::Checking);
        Self {
            form: FormState::for_route(&route),
            route,
            token_check,
            focus: 0,
            errors: FieldErrors::default(),
            notice: None,
            pending: false,
        }
    }

    /// The form, if it is currently shown. A reset form stays hidden until
    /// its link checks out, and for good once it does not.
    pub fn visible_form(&self) -> Option<&FormState> {
        match self.token_check {
            None | Some(TokenCheck::Valid) => self.form.as_ref(),
            Some(TokenCheck::Checking) | Some(TokenCheck::Invalid) => None,
        }
    }

    pub fn items(&self) -> Vec<Item> {
        let mut items = Vec::new();
        if let Some(form) = self.visible_form() {
            items.extend(form.fields().iter().copied().map(Item::Field));
            items.push(Item::Submit);
        }
        if self.route == Route::Home {
            items.push(Item::SignOut);
        }
        items.extend(self.route.links().into_iter().map(|(label, route)| Item::Link(label, route)));
        items
    }

    pub fn focused(&self) -> Option<Item> {
        self.items().get(self.focus).cloned()
    }

    pub fn focus_next(&mut self) {
        let count = self.items().len();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_prev(&mut self) {
        let count = self.items().len();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    /// Type `c` into the focused field, within its length limit.
    pub fn push_char(&mut self, c: char) {
        let Some(Item::Field(field)) = self.focused() else {
            return;
        };
        if let Some(value) = self.form.as_mut().and_then(|f| f.value_mut(field)) {
            if field.accepts(value.chars().count(), c) {
                value.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        let Some(Item::Field(field)) = self.focused() else {
            return;
        };
        if let Some(value) = self.form.as_mut().and_then(|f| f.value_mut(field)) {
            value.pop();
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned requests. Screen-bound results carry the
/// scope they were started under.
#[derive(Debug)]
pub enum TaskResult {
    Bootstrap(BootstrapOutcome),
    Submitted(ViewScope, Result<FormOutcome, FormError>),
    ResetTokenChecked(ViewScope, Result<ResetTokenStatus, FormError>),
    AccountConfirmed(ViewScope, Result<Notice, FormError>),
}

/// Main application state container
pub struct App {
    pub api: ApiClient,
    pub store: SessionStore,
    policy: BootstrapPolicy,

    pub state: AppState,
    pub screen: Screen,
    generation: ViewGeneration,
    scope: ViewScope,

    task_rx: Option<mpsc::Receiver<TaskResult>>,
    task_tx: mpsc::Sender<TaskResult>,

    pub status_message: Option<String>,
}

impl App {
    /// Create the application from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let api = config.api_client()?;
        let store = SessionStore::new(config.token_store()?);
        debug!(base_url = api.base_url(), "App created");
        Ok(Self::with_parts(api, store, config.bootstrap_policy()))
    }

    pub fn with_parts(api: ApiClient, store: SessionStore, policy: BootstrapPolicy) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let generation = ViewGeneration::new();
        let scope = generation.scope();

        Self {
            api,
            store,
            policy,
            state: AppState::Normal,
            screen: Screen::new(Route::Login),
            generation,
            scope,
            task_rx: Some(rx),
            task_tx: tx,
            status_message: None,
        }
    }

    /// Hand the result receiver to the event loop. Returns `None` once taken.
    pub fn take_task_receiver(&mut self) -> Option<mpsc::Receiver<TaskResult>> {
        self.task_rx.take()
    }

    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if tx.send(result).await.is_err() {
            warn!("Task result dropped, event loop has exited");
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Rehydrate the session in the background. Only the first call per
    /// store does anything.
    pub fn start_bootstrap(&self) {
        let api = self.api.clone();
        let store = self.store.clone();
        let tx = self.task_tx.clone();
        let policy = self.policy;

        tokio::spawn(async move {
            let outcome = auth::bootstrap(&api, &store, policy).await;
            Self::send_result(&tx, TaskResult::Bootstrap(outcome)).await;
        });
    }

    pub fn sign_out(&mut self) {
        if let Err(e) = self.store.sign_out() {
            error!(error = %e, "Sign-out could not remove the saved token");
            self.status_message =
                Some("Signed out, but the saved token could not be removed".to_string());
        }
        self.enforce_guard();
    }

    /// Apply the route guard to the current screen.
    pub fn enforce_guard(&mut self) {
        let decision = guard::decide(&self.screen.route, &self.store.snapshot());
        if let GuardDecision::Redirect(route) = decision {
            info!(to = route.title(), "Guard redirect");
            self.navigate(route);
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Leave the current screen and open `route`.
    pub fn navigate(&mut self, route: Route) {
        debug!(screen = route.title(), "Navigating");
        self.scope = self.generation.advance();
        self.screen = Screen::new(route);
        self.status_message = None;
        self.start_screen();
        self.enforce_guard();
    }

    /// Kick off the request a screen runs as soon as it opens.
    fn start_screen(&mut self) {
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let scope = self.scope.clone();

        match &self.screen.route {
            Route::NewPassword(token) => {
                let token = token.clone();
                tokio::spawn(async move {
                    let result = check_reset_token(&api, &token, &scope).await;
                    Self::send_result(&tx, TaskResult::ResetTokenChecked(scope, result)).await;
                });
            }
            Route::ConfirmAccount(token) => {
                let token = token.clone();
                self.screen.pending = true;
                tokio::spawn(async move {
                    let result = confirm_account(&api, &token, &scope).await;
                    Self::send_result(&tx, TaskResult::AccountConfirmed(scope, result)).await;
                });
            }
            _ => {}
        }
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// Validate the visible form and, if it passes, submit it in the
    /// background. A second submit while one is pending is ignored.
    pub fn submit(&mut self) {
        if self.screen.pending {
            return;
        }
        let Some(form) = self.screen.visible_form().cloned() else {
            return;
        };

        self.screen.notice = None;
        if let Err(errors) = form.validate() {
            debug!(count = errors.len(), "Form has invalid fields");
            self.screen.errors = errors;
            return;
        }
        self.screen.errors = FieldErrors::default();
        self.screen.pending = true;

        let api = self.api.clone();
        let store = self.store.clone();
        let tx = self.task_tx.clone();
        let scope = self.scope.clone();

        tokio::spawn(async move {
            let result = form.submit(api, store, scope.clone()).await;
            Self::send_result(&tx, TaskResult::Submitted(scope, result)).await;
        });
    }

    /// Act on the focused item: advance from a field, submit, follow a link
    /// or sign out.
    pub fn activate(&mut self) {
        match self.screen.focused() {
            Some(Item::Field(_)) => self.screen.focus_next(),
            Some(Item::Submit) => self.submit(),
            Some(Item::Link(_, route)) => self.navigate(route),
            Some(Item::SignOut) => self.sign_out(),
            None => {}
        }
    }

    // =========================================================================
    // Background results
    // =========================================================================

    pub fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Bootstrap(outcome) => self.process_bootstrap(outcome),
            TaskResult::Submitted(scope, result) => {
                if !self.is_current(&scope) {
                    return;
                }
                self.screen.pending = false;
                match result {
                    Ok(FormOutcome::Navigate(route)) => self.navigate(route),
                    Ok(FormOutcome::Notice(notice)) => self.screen.notice = Some(notice),
                    Err(e) => self.show_error(e),
                }
            }
            TaskResult::ResetTokenChecked(scope, result) => {
                if !self.is_current(&scope) {
                    return;
                }
                match result {
                    Ok(ResetTokenStatus::Valid(_)) => {
                        self.screen.token_check = Some(TokenCheck::Valid);
                        self.screen.focus = 0;
                    }
                    Ok(ResetTokenStatus::Invalid(notice)) => {
                        self.screen.token_check = Some(TokenCheck::Invalid);
                        self.screen.notice = Some(notice);
                        self.screen.focus = 0;
                    }
                    Err(e) => self.show_error(e),
                }
            }
            TaskResult::AccountConfirmed(scope, result) => {
                if !self.is_current(&scope) {
                    return;
                }
                self.screen.pending = false;
                match result {
                    Ok(notice) => self.screen.notice = Some(notice),
                    Err(e) => self.show_error(e),
                }
            }
        }
    }

    fn process_bootstrap(&mut self, outcome: BootstrapOutcome) {
        match &outcome {
            BootstrapOutcome::Rejected(e) => {
                self.status_message = Some(e.user_message());
            }
            BootstrapOutcome::AlreadyRan => return,
            BootstrapOutcome::Anonymous
            | BootstrapOutcome::Authenticated
            | BootstrapOutcome::Superseded => {}
        }

        match outcome.redirect() {
            Some(route) => self.navigate(route),
            None => self.enforce_guard(),
        }
    }

    fn is_current(&self, scope: &ViewScope) -> bool {
        let live = scope.is_live() && scope.id() == self.scope.id();
        if !live {
            debug!(scope = scope.id(), "Dropping result for a screen already left");
        }
        live
    }

    fn show_error(&mut self, e: FormError) {
        match &e {
            FormError::Stale => {
                debug!("Stale result ignored");
                return;
            }
            FormError::Invalid(errors) => self.screen.errors = errors.clone(),
            FormError::Api(_) => error!(error = %e, "Request failed"),
        }
        self.screen.notice = e.notice();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use gatehouse_core::auth::{MemoryTokenStore, TokenStore};
    use gatehouse_core::forms::NoticeKind;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn app_for(server: &MockServer, tokens: Arc<MemoryTokenStore>) -> App {
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).expect("client");
        App::with_parts(api, SessionStore::new(tokens), BootstrapPolicy::default())
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.screen.push_char(c);
        }
    }

    async fn settle(app: &mut App, rx: &mut mpsc::Receiver<TaskResult>) {
        let result = rx.recv().await.expect("task result");
        app.process_task_result(result);
    }

    #[test]
    fn test_screen_items() {
        let login = Screen::new(Route::Login);
        assert_eq!(
            login.items(),
            vec![
                Item::Field(Field::Email),
                Item::Field(Field::Password),
                Item::Submit,
                Item::Link("Create account", Route::CreateAccount),
                Item::Link("Did you forget your password?", Route::ForgotPassword),
            ]
        );

        let home = Screen::new(Route::Home);
        assert_eq!(home.items(), vec![Item::SignOut]);
    }

    #[test]
    fn test_reset_form_hidden_until_checked() {
        let mut screen = Screen::new(Route::NewPassword("tok".to_string()));
        assert!(screen.visible_form().is_none());
        assert!(!screen.items().contains(&Item::Submit));

        screen.token_check = Some(TokenCheck::Valid);
        assert!(screen.visible_form().is_some());
        assert_eq!(screen.items()[0], Item::Field(Field::Password));
    }

    #[test]
    fn test_focus_wraps() {
        let mut screen = Screen::new(Route::ForgotPassword);
        let count = screen.items().len();
        screen.focus_prev();
        assert_eq!(screen.focus, count - 1);
        screen.focus_next();
        assert_eq!(screen.focus, 0);
    }

    #[test]
    fn test_typing_respects_limits() {
        let mut screen = Screen::new(Route::Login);
        for _ in 0..300 {
            screen.push_char('a');
        }
        screen.push_char('\t');
        let form = screen.form.as_ref().expect("form");
        assert_eq!(form.value(Field::Email).chars().count(), 254);

        screen.pop_char();
        let form = screen.form.as_ref().expect("form");
        assert_eq!(form.value(Field::Email).chars().count(), 253);
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut app = app_for(&server, Arc::new(MemoryTokenStore::default()));
        type_text(&mut app, "ada@example.com");
        app.screen.focus_next();
        type_text(&mut app, "abc");
        app.submit();

        assert!(!app.screen.pending);
        assert!(app.screen.errors.get(Field::Password).is_some());
    }

    #[tokio::test]
    async fn test_login_navigates_home() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "t", "subjectId": "u1", "email": "ada@example.com"
            })))
            .mount(&server)
            .await;

        let tokens = Arc::new(MemoryTokenStore::default());
        let mut app = app_for(&server, tokens.clone());
        let mut rx = app.take_task_receiver().expect("receiver");

        type_text(&mut app, "ada@example.com");
        app.screen.focus_next();
        type_text(&mut app, "secret1");
        app.screen.focus_next();
        app.activate();
        assert!(app.screen.pending);

        settle(&mut app, &mut rx).await;
        assert_eq!(app.screen.route, Route::Home);
        assert_eq!(tokens.load().expect("load"), Some("t".to_string()));
    }

    #[tokio::test]
    async fn test_login_failure_shows_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "msg": "Wrong password"
            })))
            .mount(&server)
            .await;

        let mut app = app_for(&server, Arc::new(MemoryTokenStore::default()));
        let mut rx = app.take_task_receiver().expect("receiver");

        type_text(&mut app, "ada@example.com");
        app.screen.focus_next();
        type_text(&mut app, "secret1");
        app.submit();
        settle(&mut app, &mut rx).await;

        assert_eq!(app.screen.route, Route::Login);
        assert!(!app.screen.pending);
        assert_eq!(app.screen.notice, Some(Notice::error("Wrong password")));
    }

    #[tokio::test]
    async fn test_result_for_left_screen_is_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/forgot-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"msg": "Sent"})))
            .mount(&server)
            .await;

        let mut app = app_for(&server, Arc::new(MemoryTokenStore::default()));
        let mut rx = app.take_task_receiver().expect("receiver");

        app.navigate(Route::ForgotPassword);
        type_text(&mut app, "ada@example.com");
        app.submit();
        app.navigate(Route::Register);

        settle(&mut app, &mut rx).await;
        assert_eq!(app.screen.route, Route::Register);
        assert!(app.screen.notice.is_none());
    }

    #[tokio::test]
    async fn test_home_redirects_when_anonymous() {
        let server = MockServer::start().await;
        let mut app = app_for(&server, Arc::new(MemoryTokenStore::default()));
        let mut rx = app.take_task_receiver().expect("receiver");

        // Loading: the guard holds the protected screen.
        app.navigate(Route::Home);
        assert_eq!(app.screen.route, Route::Home);

        app.start_bootstrap();
        settle(&mut app, &mut rx).await;
        assert_eq!(app.screen.route, Route::Login);
    }

    #[tokio::test]
    async fn test_bootstrap_then_sign_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "u1", "email": "ada@example.com", "name": "Ada"
            })))
            .mount(&server)
            .await;

        let tokens = Arc::new(MemoryTokenStore::with_token("t"));
        let mut app = app_for(&server, tokens.clone());
        let mut rx = app.take_task_receiver().expect("receiver");

        app.start_bootstrap();
        settle(&mut app, &mut rx).await;
        assert_eq!(app.screen.route, Route::Home);
        assert_eq!(app.screen.focused(), Some(Item::SignOut));

        app.activate();
        assert_eq!(app.screen.route, Route::Login);
        assert_eq!(tokens.load().expect("load"), None);
    }

    #[tokio::test]
    async fn test_invalid_reset_link_hides_form() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/forgot-password/old"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"msg": "Invalid token"})))
            .mount(&server)
            .await;

        let mut app = app_for(&server, Arc::new(MemoryTokenStore::default()));
        let mut rx = app.take_task_receiver().expect("receiver");

        app.navigate(Route::NewPassword("old".to_string()));
        settle(&mut app, &mut rx).await;

        assert_eq!(app.screen.token_check, Some(TokenCheck::Invalid));
        assert!(app.screen.visible_form().is_none());
        app.submit();
        assert!(!app.screen.pending);
        let notice = app.screen.notice.as_ref().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn test_confirm_account_on_open() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/confirm/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "msg": "Account confirmed"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut app = app_for(&server, Arc::new(MemoryTokenStore::default()));
        let mut rx = app.take_task_receiver().expect("receiver");

        app.navigate(Route::ConfirmAccount("abc".to_string()));
        assert!(app.screen.pending);
        settle(&mut app, &mut rx).await;

        assert!(!app.screen.pending);
        assert_eq!(app.screen.notice, Some(Notice::success("Account confirmed")));
    }
}
