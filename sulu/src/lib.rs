// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod api;
pub mod app_state;
pub mod bootstrap;
pub mod collaboration;
pub mod config;
pub mod events;
pub mod hash;
pub mod public;
pub mod routing;
pub mod runtime_paths;
pub mod store;
pub mod structure;
pub mod tags;
pub mod trash;
pub mod util;
pub mod webspace;
pub mod xml;
