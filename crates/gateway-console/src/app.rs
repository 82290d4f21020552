//! Main application state and frame loop.
//!
//! Port calls block, so every session operation runs on a worker thread.
//! The session (and the form, while submitting) moves into the worker and
//! comes back through `task_result`, which is polled each frame. The UI
//! renders from `SessionView`, a snapshot taken whenever the session returns.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::Address;
use eframe::egui;
use tracing::{debug, error, info, warn};
use web_time::Instant;

use gateway_console_core::{display_value, ConnectOutcome, MethodForm, NetworkFile, SessionEffect};

use crate::bridge::{ConsoleBridge, ConsoleSession};
use crate::ui;

const BUILD_INFO: &str = concat!("build ", env!("GIT_HASH"), " (", env!("BUILD_TIME"), ")");
const IN_FLIGHT_REPAINT: Duration = Duration::from_millis(250);

/// Results handed back by worker threads.
enum TaskResult {
    Started(eyre::Result<ConsoleSession>),
    Connected {
        session: ConsoleSession,
        outcome: ConnectOutcome,
    },
    Refreshed {
        session: ConsoleSession,
    },
    Polled {
        session: ConsoleSession,
        effects: Vec<SessionEffect>,
    },
    Submitted {
        session: ConsoleSession,
        form: MethodForm,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Starting,
    Connecting,
    Refreshing,
    Polling,
    Submitting,
}

/// User actions that need the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Connect,
    Refresh,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    Run,
    Queue,
    Ignore,
}

/// A background poll holds the session only briefly, so clicks made while
/// it runs wait for it instead of being dropped.
fn dispatch_for(task: Option<Task>, session_ready: bool) -> Dispatch {
    match task {
        None if session_ready => Dispatch::Run,
        Some(Task::Polling) => Dispatch::Queue,
        _ => Dispatch::Ignore,
    }
}

/// What the frame needs to know about the session.
#[derive(Debug, Clone, Default)]
struct SessionView {
    has_provider: bool,
    chain_id: Option<u64>,
    network: Option<NetworkFile>,
    account: Option<Address>,
    has_contract: bool,
    threshold: Option<String>,
}

impl SessionView {
    fn of(session: &ConsoleSession) -> Self {
        Self {
            has_provider: session.provider().is_some(),
            chain_id: session.chain_id(),
            network: session.network(),
            account: session.first_account(),
            has_contract: session.contracts().gateway_manager.is_some(),
            threshold: session
                .gateway_manager_data()
                .threshold
                .as_ref()
                .map(display_value),
        }
    }
}

pub struct App {
    bridge: ConsoleBridge,
    session: Option<ConsoleSession>,
    form: Option<MethodForm>,
    view: SessionView,
    task: Option<Task>,
    queued_action: Option<Action>,
    task_result: Arc<Mutex<Option<TaskResult>>>,
    last_provider_poll: Instant,
    startup_error: Option<String>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, bridge: ConsoleBridge) -> Self {
        let mut app = Self {
            bridge,
            session: None,
            form: None,
            view: SessionView::default(),
            task: None,
            queued_action: None,
            task_result: Arc::new(Mutex::new(None)),
            last_provider_poll: Instant::now(),
            startup_error: None,
        };
        app.start_session(&cc.egui_ctx);
        app
    }

    fn provider_poll_interval(&self) -> Duration {
        Duration::from_millis(self.bridge.config().provider_poll_interval_ms)
    }

    fn spawn_task<F>(&mut self, ctx: &egui::Context, task: Task, work: F)
    where
        F: FnOnce() -> TaskResult + Send + 'static,
    {
        debug!(?task, "starting worker task");
        self.task = Some(task);
        let result = Arc::clone(&self.task_result);
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let output = work();
            match result.lock() {
                Ok(mut guard) => *guard = Some(output),
                Err(e) => error!(error = %e, "task result slot poisoned"),
            }
            ctx.request_repaint();
        });
    }

    fn request(&mut self, ctx: &egui::Context, action: Action) {
        match dispatch_for(self.task, self.session.is_some()) {
            Dispatch::Run => self.run(ctx, action),
            Dispatch::Queue => {
                debug!(?action, "waiting for provider poll");
                self.queued_action = Some(action);
            }
            Dispatch::Ignore => {}
        }
    }

    fn run(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::Connect => self.connect(ctx),
            Action::Refresh => self.refresh(ctx),
            Action::Submit => self.submit(ctx),
        }
    }

    fn can_act(&self) -> bool {
        self.queued_action.is_none()
            && dispatch_for(self.task, self.session.is_some()) != Dispatch::Ignore
    }

    fn start_session(&mut self, ctx: &egui::Context) {
        let bridge = self.bridge.clone();
        self.spawn_task(ctx, Task::Starting, move || {
            TaskResult::Started(bridge.start_session())
        });
    }

    fn connect(&mut self, ctx: &egui::Context) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        self.spawn_task(ctx, Task::Connecting, move || {
            let outcome = session.connect();
            TaskResult::Connected { session, outcome }
        });
    }

    fn refresh(&mut self, ctx: &egui::Context) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        self.spawn_task(ctx, Task::Refreshing, move || {
            if let Err(e) = session.load_contract_data() {
                error!(error = %e, "failed to refresh contract data");
            }
            TaskResult::Refreshed { session }
        });
    }

    fn poll_provider(&mut self, ctx: &egui::Context) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        self.last_provider_poll = Instant::now();
        self.spawn_task(ctx, Task::Polling, move || {
            let effects = session.poll_provider();
            TaskResult::Polled { session, effects }
        });
    }

    fn submit(&mut self, ctx: &egui::Context) {
        if self.session.is_none() || self.form.is_none() {
            return;
        }
        let (Some(session), Some(mut form)) = (self.session.take(), self.form.take()) else {
            return;
        };
        self.spawn_task(ctx, Task::Submitting, move || {
            match session.provider() {
                Some(provider) => form.submit(provider, &session.abi, session.first_account()),
                None => warn!("submit without a provider"),
            }
            TaskResult::Submitted { session, form }
        });
    }

    /// Drops the session, which tears down its provider subscription, and
    /// starts over.
    fn reload(&mut self, ctx: &egui::Context, chain_id: u64) {
        info!(chain_id, "reloading console for new chain");
        self.session = None;
        self.form = None;
        self.queued_action = None;
        self.view = SessionView::default();
        self.start_session(ctx);
    }

    fn install(&mut self, session: ConsoleSession) {
        self.view = SessionView::of(&session);
        self.session = Some(session);
    }

    fn check_task_result(&mut self, ctx: &egui::Context) {
        let result = match self.task_result.lock() {
            Ok(mut guard) => guard.take(),
            Err(e) => {
                error!(error = %e, "task result slot poisoned");
                None
            }
        };
        let Some(result) = result else {
            return;
        };
        self.task = None;

        match result {
            TaskResult::Started(Ok(session)) => {
                self.startup_error = None;
                self.form = ConsoleBridge::threshold_form(&session);
                self.install(session);
            }
            TaskResult::Started(Err(e)) => {
                error!(error = %format!("{e:#}"), "failed to start session");
                self.startup_error = Some(format!("{e:#}"));
            }
            TaskResult::Connected { session, outcome } => {
                debug!(?outcome, "connect finished");
                self.install(session);
            }
            TaskResult::Refreshed { session } => self.install(session),
            TaskResult::Polled { session, effects } => {
                self.install(session);
                if let Some(SessionEffect::Reload { chain_id }) = effects.last().copied() {
                    self.reload(ctx, chain_id);
                } else if let Some(action) = self.queued_action.take() {
                    self.run(ctx, action);
                }
            }
            TaskResult::Submitted { session, form } => {
                self.form = Some(form);
                self.install(session);
            }
        }
    }

    fn poll_form(&mut self, ctx: &egui::Context) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.poll() {
            ctx.request_repaint();
        }
        if form.in_flight() > 0 {
            ctx.request_repaint_after(IN_FLIGHT_REPAINT);
        }
    }

    fn schedule_provider_poll(&mut self, ctx: &egui::Context) {
        let interval = self.provider_poll_interval();
        if self.task.is_none()
            && self.session.is_some()
            && self.last_provider_poll.elapsed() >= interval
        {
            self.poll_provider(ctx);
        }
        ctx.request_repaint_after(interval);
    }

    /// Busy with something the user asked for. Background polls don't count.
    fn is_busy(&self) -> bool {
        matches!(self.task, Some(task) if task != Task::Polling)
    }

    fn render_disconnected(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.label(egui::RichText::new(concat!("v", env!("CARGO_PKG_VERSION"))).strong());
        ui.label(egui::RichText::new(BUILD_INFO).small().weak());
        ui.add_space(8.0);

        if self.session.is_some() && !self.view.has_provider {
            ui::warning_message(ui, "No wallet provider detected. Please install a wallet.");
            ui.add_space(4.0);
        }

        if ui::primary_button_enabled(ui, "Connect", self.can_act()).clicked() {
            self.request(ctx, Action::Connect);
        }
    }

    fn render_connected(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, account: Address) {
        ui.label(format!("Connected. {account}"));
        if let Some(chain_id) = self.view.chain_id {
            ui.label(egui::RichText::new(format!("chain {chain_id}")).small().weak());
        }
        ui.add_space(8.0);

        let threshold = self.view.threshold.as_deref().unwrap_or("null");
        ui.label(format!("threshold: {threshold}"));
        if ui::secondary_button_enabled(ui, "refresh", self.can_act()).clicked() {
            self.request(ctx, Action::Refresh);
        }
        ui.add_space(12.0);

        if !self.view.has_contract {
            let chain = self
                .view
                .chain_id
                .map_or_else(|| "unknown".to_owned(), |id| id.to_string());
            ui::warning_message(ui, &format!("No GatewayManager deployment for chain {chain}."));
            return;
        }
        self.render_form(ui, ctx);
    }

    fn render_form(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let network = self.view.network;
        let can_submit = self.can_act();
        let Some(form) = self.form.as_mut() else {
            ui::card(ui, |ui| ui::loading_spinner(ui, "Submitting..."));
            return;
        };

        let mut submit = false;
        ui::card(ui, |ui| {
            ui::styled_heading(ui, form.description());
            ui::status_block(ui, form.status(), network);
            ui.add_space(6.0);

            let edits: Vec<(usize, String)> = form
                .fields()
                .iter()
                .enumerate()
                .filter_map(|(i, field)| ui::arg_input(ui, i, field).map(|value| (i, value)))
                .collect();
            for (i, value) in edits {
                form.update_field(i, value);
            }

            ui.add_space(6.0);
            submit = ui::primary_button_enabled(ui, "submit", can_submit).clicked();
        });

        if submit {
            self.request(ctx, Action::Submit);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.check_task_result(ctx);
        self.poll_form(ctx);
        self.schedule_provider_poll(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui::styled_heading(ui, "Gateway Console");
                if self.is_busy() {
                    ui.add_space(10.0);
                    ui.spinner();
                }
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(10.0);
                if let Some(err) = self.startup_error.clone() {
                    ui::error_message(ui, &err);
                    ui.add_space(8.0);
                }
                if self.session.is_none() && self.task == Some(Task::Starting) {
                    ui::loading_spinner(ui, "Loading wallet, accounts and contract...");
                    return;
                }
                match self.view.account {
                    Some(account) => self.render_connected(ui, ctx, account),
                    None => self.render_disconnected(ui, ctx),
                }
                ui.add_space(20.0);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{dispatch_for, Dispatch, Task};

    #[test]
    fn idle_session_runs_actions_now() {
        assert_eq!(dispatch_for(None, true), Dispatch::Run);
    }

    #[test]
    fn background_poll_queues_actions() {
        assert_eq!(dispatch_for(Some(Task::Polling), false), Dispatch::Queue);
    }

    #[test]
    fn user_tasks_and_missing_session_ignore_actions() {
        assert_eq!(dispatch_for(None, false), Dispatch::Ignore);
        for task in [
            Task::Starting,
            Task::Connecting,
            Task::Refreshing,
            Task::Submitting,
        ] {
            assert_eq!(dispatch_for(Some(task), false), Dispatch::Ignore);
        }
    }
}
