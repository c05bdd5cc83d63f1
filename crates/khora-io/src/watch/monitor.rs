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

//! A [`ChangeMonitor`] fed by the platform's native file notifications.

use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, TryRecvError};
use khora_core::watch::{ChangeMonitor, ChangeSignal};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::WatchError;

/// Watches a single file through `notify`.
///
/// The backend delivers events from its own thread into a channel; [`poll`]
/// only drains that channel, so it never blocks. When the file disappears the
/// watch goes stale, and every later poll checks whether the path exists
/// again. Once it does, the watch is re-established on the new file and the
/// poll reports [`ChangeSignal::Modified`].
///
/// A path can also be replaced without the old file going away, for example
/// when another hard link keeps it alive. The backend then only reports an
/// attribute change on the old file. To catch that, the identity of the
/// watched file is recorded with the watch and compared against the path
/// after every change.
///
/// [`poll`]: ChangeMonitor::poll
pub struct NotifyMonitor {
    path: PathBuf,
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    watching: bool,
    identity: Option<FileIdentity>,
}

/// Device and inode of a file, where the platform exposes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileIdentity {
    device: u64,
    inode: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    fn of(path: &Path) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;

        let metadata = std::fs::metadata(path).ok()?;
        Some(Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn of(_path: &Path) -> Option<Self> {
        None
    }
}

impl NotifyMonitor {
    /// Starts watching `path`, which must exist.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] if the notification backend cannot be created or
    /// refuses the path.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, WatchError> {
        let path = path.into();
        let (tx, events) = crossbeam_channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // The receiver only goes away with the monitor itself.
            let _ = tx.send(res);
        })
        .map_err(|source| WatchError::Backend { source })?;

        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Watch {
                path: path.clone(),
                source,
            })?;
        log::info!("Watching {} for changes", path.display());
        let identity = FileIdentity::of(&path);

        Ok(Self {
            path,
            watcher,
            events,
            watching: true,
            identity,
        })
    }

    /// Whether the watch is currently attached to an existing file.
    pub fn is_watching(&self) -> bool {
        self.watching
    }

    fn drain(&mut self) -> ChangeSignal {
        let mut signal = ChangeSignal::None;
        loop {
            match self.events.try_recv() {
                Ok(Ok(event)) => signal = signal.merge(classify(&event)),
                Ok(Err(e)) => signal = signal.merge(ChangeSignal::Error(e.to_string())),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    signal = signal.merge(ChangeSignal::Error(
                        "notification channel disconnected".to_string(),
                    ));
                    break;
                }
            }
        }
        signal
    }

    fn rewatch(&mut self) -> ChangeSignal {
        match self.watcher.watch(&self.path, RecursiveMode::NonRecursive) {
            Ok(()) => {
                self.watching = true;
                self.identity = FileIdentity::of(&self.path);
                log::info!("Re-established watch on {}", self.path.display());
                ChangeSignal::Modified
            }
            Err(e) => ChangeSignal::Error(e.to_string()),
        }
    }
}

impl ChangeMonitor for NotifyMonitor {
    fn poll(&mut self) -> ChangeSignal {
        let mut signal = self.drain();

        if signal.is_change() && self.watching {
            let current = FileIdentity::of(&self.path);
            let replaced = self.identity.is_some() && current != self.identity;
            if signal == ChangeSignal::Deleted || replaced {
                // A stale watch may linger in the backend; drop it before re-adding.
                let _ = self.watcher.unwatch(&self.path);
                self.watching = false;
                if replaced {
                    log::debug!("{} was replaced; re-watching it", self.path.display());
                }
            }
            if current.is_none() && self.identity.is_some() {
                signal = ChangeSignal::Deleted;
            }
        }

        if !self.watching && self.path.exists() {
            return self.rewatch();
        }
        signal
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for NotifyMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyMonitor")
            .field("path", &self.path)
            .field("watching", &self.watching)
            .finish_non_exhaustive()
    }
}

/// Maps a backend event on the watched file to a signal.
fn classify(event: &Event) -> ChangeSignal {
    match event.kind {
        EventKind::Create(_) => ChangeSignal::Modified,
        EventKind::Modify(ModifyKind::Name(_)) => ChangeSignal::Deleted,
        EventKind::Modify(_) => ChangeSignal::Modified,
        EventKind::Remove(_) => ChangeSignal::Deleted,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => ChangeSignal::None,
    }
}
