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

//! Fatal errors that carry the source location that raised them.

use std::error::Error;
use std::fmt;
use std::panic::Location;

/// An unrecoverable error tagged with the file and line that gave up on it.
///
/// Binaries log it with [`FatalError::log`] and exit with a non-zero code.
#[derive(Debug)]
pub struct FatalError {
    location: &'static Location<'static>,
    error: anyhow::Error,
}

impl FatalError {
    /// Wraps `error`, recording the caller's location.
    #[track_caller]
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            location: Location::caller(),
            error: error.into(),
        }
    }

    /// Where the error was raised.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// The wrapped error.
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    /// Writes the error to the log at `error` level.
    pub fn log(&self) {
        log::error!("{self}");
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {:#}",
            self.location.file(),
            self.location.line(),
            self.error
        )
    }
}

impl Error for FatalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let source: &(dyn Error + 'static) = self.error.as_ref();
        Some(source)
    }
}

/// Converts a failed `Result` into a [`FatalError`] raised at the call site.
pub trait OrFatal<T> {
    /// Tags the error with the caller's location.
    #[track_caller]
    fn or_fatal(self) -> Result<T, FatalError>;
}

impl<T, E> OrFatal<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    #[track_caller]
    fn or_fatal(self) -> Result<T, FatalError> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(FatalError::new(error)),
        }
    }
}
