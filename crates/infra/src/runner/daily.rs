use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use tracing::{info, warn};

use clinicops_agents::{AgentKind, AgentSet, ClinicRepository};

use super::sink::AgentReportSink;

/// A daily UTC time at which one agent kind sweeps every clinic.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RunWindow {
    pub hour: u32,
    pub minute: u32,
    pub kind: AgentKind,
}

impl RunWindow {
    pub const fn new(hour: u32, minute: u32, kind: AgentKind) -> Self {
        Self { hour, minute, kind }
    }

    fn reached(&self, now: DateTime<Utc>) -> bool {
        (now.hour(), now.minute()) >= (self.hour, self.minute)
    }
}

/// Config for the daily agent runner.
#[derive(Debug, Clone)]
pub struct DailyAgentRunner {
    pub windows: Vec<RunWindow>,
    /// How often the loop checks the clock, triggers and shutdown.
    pub tick: Duration,
}

impl Default for DailyAgentRunner {
    fn default() -> Self {
        Self {
            windows: vec![
                RunWindow::new(7, 0, AgentKind::Appointment),
                RunWindow::new(7, 5, AgentKind::Revenue),
                RunWindow::new(7, 10, AgentKind::Case),
                RunWindow::new(7, 15, AgentKind::Inventory),
            ],
            tick: Duration::from_millis(250),
        }
    }
}

/// Handle for the running daily runner (shutdown + trigger hook).
#[derive(Debug)]
pub struct DailyAgentRunnerHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl DailyAgentRunnerHandle {
    /// Run every window's sweep now, outside the schedule.
    ///
    /// Triggers are coalesced: if one is already pending this is a no-op.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the runner thread and wait for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Tally of one sweep over all clinics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SweepSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl DailyAgentRunner {
    /// Spawn the runner on a dedicated thread.
    ///
    /// - Schedule: each window fires once per UTC day once its time is reached;
    ///   windows already past at startup wait for the next day
    /// - Manual: `handle.trigger()` sweeps every window's agent immediately
    /// - Failures: logged per clinic; the sweep moves on to the next clinic
    pub fn spawn<R, S>(
        &self,
        name: &'static str,
        agents: Arc<AgentSet<R>>,
        sink: Arc<S>,
    ) -> std::io::Result<DailyAgentRunnerHandle>
    where
        R: ClinicRepository,
        S: AgentReportSink,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

        let cfg = self.clone();
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || runner_loop(name, cfg, shutdown_rx, trigger_rx, agents, sink))?;

        Ok(DailyAgentRunnerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            join: Some(join),
        })
    }
}

#[derive(Debug)]
struct WindowState {
    window: RunWindow,
    last_fired: Option<NaiveDate>,
}

fn arm(windows: &[RunWindow], now: DateTime<Utc>) -> Vec<WindowState> {
    windows
        .iter()
        .map(|w| WindowState {
            window: *w,
            last_fired: w.reached(now).then(|| now.date_naive()),
        })
        .collect()
}

fn due(states: &mut [WindowState], now: DateTime<Utc>) -> Vec<AgentKind> {
    let today = now.date_naive();
    states
        .iter_mut()
        .filter(|s| s.window.reached(now) && s.last_fired != Some(today))
        .map(|s| {
            s.last_fired = Some(today);
            s.window.kind
        })
        .collect()
}

fn runner_loop<R, S>(
    name: &'static str,
    cfg: DailyAgentRunner,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    agents: Arc<AgentSet<R>>,
    sink: Arc<S>,
) where
    R: ClinicRepository,
    S: AgentReportSink,
{
    info!(runner = name, windows = cfg.windows.len(), "daily agent runner started");

    let clock = Arc::clone(&agents.context().clock);
    let mut states = arm(&cfg.windows, clock.now());

    loop {
        match shutdown_rx.try_recv() {
            Ok(()) | Err(mpsc::TryRecvError::Disconnected) => break,
            Err(mpsc::TryRecvError::Empty) => {}
        }

        let mut kinds = due(&mut states, clock.now());

        // Drain to coalesce repeated triggers.
        let mut triggered = false;
        while trigger_rx.try_recv().is_ok() {
            triggered = true;
        }
        if triggered {
            kinds = cfg.windows.iter().map(|w| w.kind).collect();
        }

        if kinds.is_empty() {
            thread::sleep(cfg.tick);
            continue;
        }

        for kind in kinds {
            sweep(&agents, sink.as_ref(), kind);
        }
    }

    info!(runner = name, "daily agent runner stopped");
}

/// Run one agent kind for every clinic, sequentially.
///
/// A clinic whose run fails is logged and skipped.
pub fn sweep<R, S>(agents: &AgentSet<R>, sink: &S, kind: AgentKind) -> SweepSummary
where
    R: ClinicRepository,
    S: AgentReportSink + ?Sized,
{
    let clinics = match agents.context().repo.list_clinics() {
        Ok(c) => c,
        Err(e) => {
            warn!(agent = kind.type_name(), error = %e, "failed to list clinics for scheduled run");
            return SweepSummary::default();
        }
    };

    info!(agent = kind.type_name(), clinics = clinics.len(), "scheduled sweep started");

    let mut summary = SweepSummary::default();
    for clinic in clinics {
        match agents.run(kind, &clinic.id) {
            Ok(report) => {
                summary.succeeded += 1;
                sink.emit(&clinic.id, report);
            }
            Err(e) => {
                summary.failed += 1;
                warn!(
                    agent = kind.type_name(),
                    clinic = %clinic.id,
                    error = %e,
                    "scheduled run failed; continuing"
                );
            }
        }
    }

    info!(
        agent = kind.type_name(),
        succeeded = summary.succeeded,
        failed = summary.failed,
        "scheduled sweep finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    #[test]
    fn windows_fire_once_per_day_in_order() {
        let cfg = DailyAgentRunner::default();
        let mut states = arm(&cfg.windows, at(6, 0));

        assert!(due(&mut states, at(6, 59)).is_empty());
        assert_eq!(due(&mut states, at(7, 0)), [AgentKind::Appointment]);
        assert!(due(&mut states, at(7, 1)).is_empty());
        assert_eq!(
            due(&mut states, at(7, 12)),
            [AgentKind::Revenue, AgentKind::Case]
        );
        assert_eq!(due(&mut states, at(23, 0)), [AgentKind::Inventory]);

        let next_day = Utc.with_ymd_and_hms(2025, 6, 3, 7, 0, 0).unwrap();
        assert_eq!(due(&mut states, next_day), [AgentKind::Appointment]);
    }

    #[test]
    fn windows_already_past_at_startup_wait_for_tomorrow() {
        let cfg = DailyAgentRunner::default();
        let mut states = arm(&cfg.windows, at(7, 7));

        assert!(due(&mut states, at(7, 8)).is_empty());
        assert_eq!(due(&mut states, at(7, 10)), [AgentKind::Case]);
    }
}
