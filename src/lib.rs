//! Live Deck - presenter-driven slide sessions mirrored to followers.
//!
//! A presenter starts a live session for a rendered deck and receives a
//! four-digit key plus a secret token. Followers attach by key and receive
//! the current deck and page, then every change, as a push stream.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
