// SPDX-License-Identifier: MPL-2.0
//! Toast notification system for user feedback.
//!
//! Notifications appear temporarily to report validation failures, auth
//! results and settings problems without blocking interaction.
//!
//! # Components
//!
//! - [`Notification`] - message key, severity and timing
//! - [`Manager`] - queuing and lifecycle management
//!
//! Success/info toasts last ~3s, warnings ~5s, errors until dismissed. At most
//! three are visible; the rest wait in a queue.

mod manager;
mod notification;

pub use manager::{Manager, MAX_VISIBLE};
pub use notification::{Notification, NotificationId, Severity};
