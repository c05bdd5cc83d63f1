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

//! # Khora Telemetry
//!
//! Logging setup and reporting helpers shared by the runtime crates:
//! logger installation, once-only reporting of repeating conditions,
//! location-tagged fatal errors and frame timing statistics.

#![warn(missing_docs)]

pub mod fatal;
pub mod frame;
pub mod logging;
pub mod report;

pub use fatal::{FatalError, OrFatal};
pub use frame::{FrameSummary, FrameTelemetry};
pub use report::ReportOnce;
