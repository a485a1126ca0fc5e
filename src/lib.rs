// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowlog: reversible edit operations for a collaboratively edited workflow graph.
//!
//! Editor gestures become [`ops::Operation`]s. Each one is paired with its inverse in an
//! [`ops::OperationEntry`] kept by a per-session [`history::History`], and translated into
//! a [`collab::CollaborativePayload`] for peers.

pub mod collab;
pub mod history;
pub mod model;
pub mod ops;
pub mod session;

pub use collab::{to_collaborative_payload, Broadcaster, CollaborativePayload, NoopBroadcaster};
pub use history::{History, HistoryConfig, HistoryError};
pub use model::WorkflowGraph;
pub use ops::{apply_operation, create_operation_entry, invert, Operation, OperationEntry};
pub use session::EditorSession;
