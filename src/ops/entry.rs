// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Operation;
use crate::model::EntryId;

/// A recorded edit: the forward operation paired with the operation that undoes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationEntry {
    id: EntryId,
    operation: Operation,
    inverse: Operation,
    created_at: DateTime<Utc>,
}

impl OperationEntry {
    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn inverse(&self) -> &Operation {
        &self.inverse
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Pairs `operation` with its `inverse` under a fresh id and timestamp.
///
/// The pair is stored as given; no check is made that `inverse` actually undoes
/// `operation`. Timestamps are strictly increasing within a process, so entries created in
/// quick succession still order by creation.
pub fn create_operation_entry(operation: Operation, inverse: Operation) -> OperationEntry {
    OperationEntry {
        id: EntryId::generate(),
        operation,
        inverse,
        created_at: next_timestamp(),
    }
}

static LAST_TIMESTAMP_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

fn next_timestamp() -> DateTime<Utc> {
    let now = Utc::now().timestamp_micros();
    let previous = LAST_TIMESTAMP_MICROS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or(now);
    let micros = now.max(previous.saturating_add(1));
    DateTime::from_timestamp_micros(micros).unwrap_or_else(Utc::now)
}
