use super::run_config::RunConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRequestKind {
    Start,
    Stop,
}

impl RunRequestKind {
    pub fn label(self) -> &'static str {
        match self {
            RunRequestKind::Start => "start",
            RunRequestKind::Stop => "stop",
        }
    }

    fn target(self) -> bool {
        matches!(self, RunRequestKind::Start)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunCommand {
    Start(RunConfig),
    Stop,
}

impl RunCommand {
    pub fn kind(&self) -> RunRequestKind {
        match self {
            RunCommand::Start(_) => RunRequestKind::Start,
            RunCommand::Stop => RunRequestKind::Stop,
        }
    }
}

/// What the toggle control should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl RunPhase {
    pub fn label(self) -> &'static str {
        match self {
            RunPhase::Stopped => "stopped",
            RunPhase::Starting => "starting",
            RunPhase::Running => "running",
            RunPhase::Stopping => "stopping",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestInFlight;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCompletion {
    pub kind: RunRequestKind,
    pub changed: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    kind: RunRequestKind,
    observations_at_issue: u64,
}

/// Client-side shadow of the backend's running flag.
///
/// Local intent (an issued start/stop) and confirmed state (the latest
/// observation on the `state` topic) are tracked separately. Observations
/// always overwrite the shadow; a request success only flips it when no
/// observation arrived while the request was in flight.
#[derive(Debug, Clone, Default)]
pub struct RunStateReconciler {
    running: bool,
    confirmed: Option<bool>,
    observations: u64,
    pending: Option<Pending>,
}

impl RunStateReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn confirmed(&self) -> Option<bool> {
        self.confirmed
    }

    pub fn in_flight(&self) -> Option<RunRequestKind> {
        self.pending.map(|pending| pending.kind)
    }

    pub fn phase(&self) -> RunPhase {
        match (self.pending.map(|pending| pending.kind), self.running) {
            (Some(RunRequestKind::Start), _) => RunPhase::Starting,
            (Some(RunRequestKind::Stop), _) => RunPhase::Stopping,
            (None, true) => RunPhase::Running,
            (None, false) => RunPhase::Stopped,
        }
    }

    /// Label for the toggle control: the action a press would take.
    pub fn toggle_label(&self) -> &'static str {
        if self.running {
            "Stop"
        } else {
            "Start"
        }
    }

    /// Which request a toggle press maps to in the current state.
    pub fn toggle_kind(&self) -> RunRequestKind {
        if self.running {
            RunRequestKind::Stop
        } else {
            RunRequestKind::Start
        }
    }

    /// Records that `command` is about to be sent. Only one request may be in
    /// flight at a time.
    pub fn begin(&mut self, command: &RunCommand) -> Result<(), RequestInFlight> {
        if self.pending.is_some() {
            return Err(RequestInFlight);
        }
        self.pending = Some(Pending {
            kind: command.kind(),
            observations_at_issue: self.observations,
        });
        Ok(())
    }

    /// Resolves the in-flight request. Failures leave the shadow untouched.
    pub fn complete(&mut self, kind: RunRequestKind, result: Result<(), String>) -> RunCompletion {
        let pending = self.pending.filter(|pending| pending.kind == kind);
        if pending.is_some() {
            self.pending = None;
        }
        match result {
            Ok(()) => {
                let superseded = pending
                    .map(|pending| self.observations > pending.observations_at_issue)
                    .unwrap_or(true);
                if superseded {
                    return RunCompletion {
                        kind,
                        changed: false,
                        error: None,
                    };
                }
                let previous = self.running;
                self.running = kind.target();
                RunCompletion {
                    kind,
                    changed: previous != self.running,
                    error: None,
                }
            }
            Err(error) => RunCompletion {
                kind,
                changed: false,
                error: Some(error),
            },
        }
    }

    /// Applies an authoritative observation unconditionally. Returns whether
    /// the shown state changed.
    pub fn observe(&mut self, running: bool) -> bool {
        self.observations += 1;
        self.confirmed = Some(running);
        let previous = self.running;
        self.running = running;
        previous != running
    }
}
