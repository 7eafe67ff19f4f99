// SPDX-License-Identifier: MPL-2.0
//! `agrisaathi` is the client core of the AgriSaathi farming assistant.
//!
//! It holds the state behind the onboarding screens: the language picker and
//! translated UI strings, login and signup with their form checks, toast
//! notifications, and the placeholder assistant chat.

pub mod app;
pub mod auth;
pub mod chat;
pub mod error;
pub mod forms;
pub mod i18n;
pub mod notifications;
