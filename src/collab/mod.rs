// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Collaboration wire messages and the transport seam they are handed to.

mod payload;

use tokio::sync::mpsc::UnboundedSender;

pub use payload::{to_collaborative_payload, CollabTarget, CollabVerb, CollaborativePayload};

/// Outbound side of the real-time collaboration channel.
///
/// Fire-and-forget: implementations must not block, and delivery failures are the
/// transport's concern, never reported back to the editor.
pub trait Broadcaster {
    fn broadcast(&self, message: CollaborativePayload);
}

/// Broadcaster for sessions with no peers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn broadcast(&self, _message: CollaborativePayload) {}
}

impl Broadcaster for UnboundedSender<CollaborativePayload> {
    fn broadcast(&self, message: CollaborativePayload) {
        if let Err(err) = self.send(message) {
            tracing::debug!(
                operation = err.0.operation.as_str(),
                target = err.0.target.as_str(),
                "collaboration channel closed; message dropped"
            );
        }
    }
}

impl<B: Broadcaster + ?Sized> Broadcaster for &B {
    fn broadcast(&self, message: CollaborativePayload) {
        (**self).broadcast(message);
    }
}
