// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Editing core for personal configuration files.
//!
//! Confkeep is the engine behind a small editor for dotfiles and other
//! configuration files. It provides three things:
//!
//! 1. [`syntax`]: pattern-based highlighting for the many flavors of
//!    configuration file, including content-type classification by file name,
//!    search overlays, and comment toggling.
//! 2. [`session`]: an editing session that owns the buffer and schedules
//!    highlight passes so large files stay responsive while typing.
//! 3. [`history`]: a per-file snapshot history backed by Git, kept separate
//!    from the live copy of each file.
//!
//! Reading and writing the live configuration files is left to the caller.

pub mod config;
pub mod history;
pub mod path;
pub mod session;
pub mod syntax;
