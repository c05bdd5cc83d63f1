// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use khora_core::module::{EntryPointTable, LoadError, LoadedModule, ModuleLoader};
use khora_core::time::{Clock, TickSource};
use khora_core::watch::{ChangeMonitor, ChangeSignal};
use khora_telemetry::ReportOnce;

use super::{ReloadConfig, ReloadOutcome, ReloadState};

/// Owns the active game module and swaps it when its artifact changes.
///
/// The table is only reachable through `&self` and replacing it needs
/// `&mut self`, so no caller can hold on to a table across a swap. Loader and
/// monitor errors stop here: [`ReloadController::poll`] never fails.
///
/// The quiet period is measured on a [`Clock`] over `S`, rebased on every
/// change signal.
pub struct ReloadController<L: ModuleLoader, M: ChangeMonitor, S: TickSource> {
    loader: L,
    monitor: M,
    active: LoadedModule<L::Handle>,
    artifact: PathBuf,
    config: ReloadConfig,
    state: ReloadState,
    quiet: Clock<S>,
    monitor_errors: ReportOnce,
    reloads: u64,
    failed_reloads: u64,
}

impl<L: ModuleLoader, M: ChangeMonitor, S: TickSource> ReloadController<L, M, S> {
    /// Performs the initial load of the artifact watched by `monitor`.
    ///
    /// # Errors
    ///
    /// Returns the [`LoadError`] of the initial load. There is no previous
    /// module to fall back to, so callers treat it as fatal.
    pub fn new(
        mut loader: L,
        monitor: M,
        config: ReloadConfig,
        ticks: S,
    ) -> Result<Self, LoadError> {
        let artifact = monitor.path().to_path_buf();
        let active = loader.load(&artifact)?;
        log::info!(
            "Initial module loaded from {} (generation {})",
            artifact.display(),
            active.generation()
        );

        Ok(Self {
            loader,
            monitor,
            active,
            artifact,
            config,
            state: ReloadState::Loaded,
            quiet: Clock::new(ticks),
            monitor_errors: ReportOnce::new(),
            reloads: 0,
            failed_reloads: 0,
        })
    }

    /// The entry points of the active module.
    pub fn table(&self) -> &EntryPointTable {
        self.active.table()
    }

    /// The active module.
    pub fn active(&self) -> &LoadedModule<L::Handle> {
        &self.active
    }

    /// The watched artifact path.
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Current state.
    pub fn state(&self) -> ReloadState {
        self.state
    }

    /// Successful reloads since construction, the initial load excluded.
    pub fn reloads(&self) -> u64 {
        self.reloads
    }

    /// Failed reload attempts since construction.
    pub fn failed_reloads(&self) -> u64 {
        self.failed_reloads
    }

    /// The loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Consumes one monitor signal and, if the artifact has settled, reloads.
    ///
    /// Runs to completion: on return the active table is either the previous
    /// one, untouched, or a fully constructed new one.
    pub fn poll(&mut self) -> ReloadOutcome {
        match self.monitor.poll() {
            ChangeSignal::Modified | ChangeSignal::Deleted => {
                self.rearm_monitor_errors();
                self.begin_settling();
            }
            ChangeSignal::Error(message) => {
                let artifact = &self.artifact;
                self.monitor_errors.report(|| {
                    log::warn!(
                        "Watching {} failed, treating as no change: {message}",
                        artifact.display()
                    )
                });
            }
            ChangeSignal::None => {}
        }

        if self.state != ReloadState::Settling {
            return ReloadOutcome::Idle;
        }
        if self.quiet.peek() < self.config.quiet_period || !artifact_ready(&self.artifact) {
            return ReloadOutcome::Settling;
        }
        self.reload()
    }

    /// Unloads the active module through the loader.
    pub fn shutdown(self) {
        let Self {
            mut loader, active, ..
        } = self;
        log::info!("Unloading module generation {}", active.generation());
        loader.unload(active);
    }

    /// A real change means the watch works again; the next error is news.
    fn rearm_monitor_errors(&mut self) {
        if self.monitor_errors.occurrences() == 0 {
            return;
        }
        let suppressed = self.monitor_errors.reset();
        log::info!(
            "Watching {} recovered ({suppressed} repeated errors not logged)",
            self.artifact.display()
        );
    }

    fn begin_settling(&mut self) {
        if self.state != ReloadState::Settling {
            log::debug!(
                "{} changed; waiting for it to settle",
                self.artifact.display()
            );
        }
        self.state = ReloadState::Settling;
        self.quiet.tick();
    }

    fn reload(&mut self) -> ReloadOutcome {
        match self.loader.load(&self.artifact) {
            Ok(module) => {
                let generation = module.generation();
                let previous = mem::replace(&mut self.active, module);
                self.loader.unload(previous);
                self.reloads += 1;
                self.state = ReloadState::Loaded;
                log::info!(
                    "Reloaded {} (generation {generation})",
                    self.artifact.display()
                );
                ReloadOutcome::Reloaded { generation }
            }
            Err(e) => {
                self.failed_reloads += 1;
                self.state = ReloadState::LoadedWithError;
                log::error!(
                    "Reload failed, keeping generation {}: {e}",
                    self.active.generation()
                );
                ReloadOutcome::Failed
            }
        }
    }
}

impl<L: ModuleLoader, M: ChangeMonitor, S: TickSource> std::fmt::Debug
    for ReloadController<L, M, S>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadController")
            .field("artifact", &self.artifact)
            .field("state", &self.state)
            .field("generation", &self.active.generation())
            .field("reloads", &self.reloads)
            .field("failed_reloads", &self.failed_reloads)
            .finish_non_exhaustive()
    }
}

/// A load is only worth attempting once the artifact exists and has bytes.
fn artifact_ready(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|metadata| metadata.is_file() && metadata.len() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;

    use khora_core::time::ManualTicks;

    struct NullLoader {
        fail: bool,
        loads: u64,
    }

    impl ModuleLoader for NullLoader {
        type Handle = ();

        fn load(&mut self, path: &Path) -> Result<LoadedModule<()>, LoadError> {
            if self.fail {
                return Err(LoadError::Open {
                    path: path.to_path_buf(),
                    reason: "scripted failure".to_string(),
                });
            }
            self.loads += 1;
            // SAFETY: the default table holds no function pointers.
            Ok(unsafe {
                LoadedModule::new(EntryPointTable::defaults(), (), path.to_path_buf(), self.loads)
            })
        }

        fn unload(&mut self, module: LoadedModule<()>) {
            module.into_handle();
        }
    }

    struct QueueMonitor {
        path: PathBuf,
        signals: Rc<RefCell<VecDeque<ChangeSignal>>>,
    }

    impl ChangeMonitor for QueueMonitor {
        fn poll(&mut self) -> ChangeSignal {
            self.signals.borrow_mut().pop_front().unwrap_or_default()
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    fn controller(
        path: &Path,
        quiet_period: Duration,
    ) -> (
        ReloadController<NullLoader, QueueMonitor, ManualTicks>,
        Rc<RefCell<VecDeque<ChangeSignal>>>,
        ManualTicks,
    ) {
        let signals = Rc::new(RefCell::new(VecDeque::new()));
        let monitor = QueueMonitor {
            path: path.to_path_buf(),
            signals: signals.clone(),
        };
        let loader = NullLoader {
            fail: false,
            loads: 0,
        };
        let ticks = ManualTicks::new();
        let config = ReloadConfig { quiet_period };
        let controller = ReloadController::new(loader, monitor, config, ticks.clone()).unwrap();
        (controller, signals, ticks)
    }

    /// Initial load failures surface from the constructor.
    #[test]
    fn initial_load_failure_is_returned() {
        let monitor = QueueMonitor {
            path: PathBuf::from("game.so"),
            signals: Rc::default(),
        };
        let loader = NullLoader {
            fail: true,
            loads: 0,
        };
        let result =
            ReloadController::new(loader, monitor, ReloadConfig::default(), ManualTicks::new());
        assert!(matches!(result, Err(LoadError::Open { .. })));
    }

    /// A change waits for the quiet period before reloading.
    #[test]
    fn reload_waits_for_the_quiet_period() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("game.so");
        fs::write(&artifact, b"module").unwrap();
        let (mut controller, signals, ticks) = controller(&artifact, Duration::from_millis(40));

        signals.borrow_mut().push_back(ChangeSignal::Modified);
        assert_eq!(controller.poll(), ReloadOutcome::Settling);
        assert_eq!(controller.state(), ReloadState::Settling);

        ticks.advance(Duration::from_millis(39));
        assert_eq!(controller.poll(), ReloadOutcome::Settling);

        ticks.advance(Duration::from_millis(1));
        assert_eq!(
            controller.poll(),
            ReloadOutcome::Reloaded { generation: 2 }
        );
        assert_eq!(controller.state(), ReloadState::Loaded);
        assert_eq!(controller.poll(), ReloadOutcome::Idle);
    }

    /// Every further change restarts the quiet period.
    #[test]
    fn further_changes_restart_the_quiet_period() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("game.so");
        fs::write(&artifact, b"module").unwrap();
        let (mut controller, signals, ticks) = controller(&artifact, Duration::from_millis(250));

        signals.borrow_mut().push_back(ChangeSignal::Modified);
        assert_eq!(controller.poll(), ReloadOutcome::Settling);

        for _ in 0..4 {
            ticks.advance(Duration::from_millis(200));
            signals.borrow_mut().push_back(ChangeSignal::Modified);
            assert_eq!(controller.poll(), ReloadOutcome::Settling);
        }
        // 800 ms since the first change, but only 200 ms since the last one.
        assert_eq!(controller.loader().loads, 1);

        ticks.advance(Duration::from_millis(49));
        assert_eq!(controller.poll(), ReloadOutcome::Settling);
        ticks.advance(Duration::from_millis(1));
        assert_eq!(
            controller.poll(),
            ReloadOutcome::Reloaded { generation: 2 }
        );
    }

    /// While the artifact is gone the controller keeps settling silently.
    #[test]
    fn deleted_artifact_keeps_settling() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("game.so");
        fs::write(&artifact, b"module").unwrap();
        let (mut controller, signals, _ticks) = controller(&artifact, Duration::ZERO);

        fs::remove_file(&artifact).unwrap();
        signals.borrow_mut().push_back(ChangeSignal::Deleted);
        for _ in 0..20 {
            assert_eq!(controller.poll(), ReloadOutcome::Settling);
        }
        assert_eq!(controller.failed_reloads(), 0);

        // An empty file is still not ready.
        fs::write(&artifact, b"").unwrap();
        assert_eq!(controller.poll(), ReloadOutcome::Settling);

        fs::write(&artifact, b"rebuilt").unwrap();
        assert_eq!(
            controller.poll(),
            ReloadOutcome::Reloaded { generation: 2 }
        );
    }

    /// Monitor errors never move the controller out of its state.
    #[test]
    fn monitor_errors_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("game.so");
        fs::write(&artifact, b"module").unwrap();
        let (mut controller, signals, _ticks) = controller(&artifact, Duration::ZERO);

        for _ in 0..3 {
            signals
                .borrow_mut()
                .push_back(ChangeSignal::Error("queue overflow".into()));
        }
        for _ in 0..3 {
            assert_eq!(controller.poll(), ReloadOutcome::Idle);
        }
        assert_eq!(controller.state(), ReloadState::Loaded);
        assert_eq!(controller.monitor_errors.occurrences(), 3);
    }

    /// A change after a run of monitor errors re-arms error reporting.
    #[test]
    fn change_rearms_monitor_error_reporting() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("game.so");
        fs::write(&artifact, b"module").unwrap();
        let (mut controller, signals, _ticks) = controller(&artifact, Duration::from_secs(60));

        signals.borrow_mut().extend([
            ChangeSignal::Error("queue overflow".into()),
            ChangeSignal::Error("queue overflow".into()),
            ChangeSignal::Modified,
            ChangeSignal::Error("queue overflow".into()),
        ]);
        controller.poll();
        controller.poll();
        assert_eq!(controller.monitor_errors.occurrences(), 2);

        controller.poll();
        assert_eq!(controller.monitor_errors.occurrences(), 0);
        assert_eq!(controller.state(), ReloadState::Settling);

        controller.poll();
        assert_eq!(controller.monitor_errors.occurrences(), 1);
    }
}
