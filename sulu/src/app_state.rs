// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;
use std::time::Duration;

use crate::collaboration::CollaborationRegistry;
use crate::config::ValidatedConfig;
use crate::events::{ActivityLog, EventDispatcher};
use crate::routing::{PathCleanup, ResourceLocatorStrategy, RouteRepository, YamlRouteRepository};
use crate::runtime_paths::RuntimePaths;
use crate::structure::{StructureFactory, XmlStructureLoader};
use crate::tags::TagRepository;
use crate::trash::{TagTrashItemHandler, TrashManager};
use crate::webspace::{RequestAnalyzer, WebspaceManager};

pub type BootError = Box<dyn std::error::Error + Send + Sync>;

pub struct AppState {
    pub config: Arc<ValidatedConfig>,
    pub runtime_paths: RuntimePaths,
    pub analyzer: RequestAnalyzer,
    pub routes: Arc<ResourceLocatorStrategy>,
    pub structures: Arc<StructureFactory>,
    pub tags: Arc<TagRepository>,
    pub trash: Arc<TrashManager>,
    pub events: Arc<EventDispatcher>,
    pub activities: Arc<ActivityLog>,
    pub collaboration: Arc<CollaborationRegistry>,
}

impl AppState {
    /// Loads webspaces and state files below the runtime root.
    pub fn load(config: Arc<ValidatedConfig>, runtime_paths: RuntimePaths) -> Result<Self, BootError> {
        let webspaces = Arc::new(WebspaceManager::load(&runtime_paths.webspaces_dir)?);
        let repository: Arc<dyn RouteRepository> =
            Arc::new(YamlRouteRepository::new(runtime_paths.routes_file())?);
        let tags = Arc::new(TagRepository::open(runtime_paths.tags_file())?);
        let events = Arc::new(EventDispatcher::new());
        let trash = TrashManager::open(runtime_paths.trash_file(), events.clone())?;
        Self::assemble(config, runtime_paths, webspaces, repository, tags, trash, events)
    }

    pub fn assemble(
        config: Arc<ValidatedConfig>,
        runtime_paths: RuntimePaths,
        webspaces: Arc<WebspaceManager>,
        repository: Arc<dyn RouteRepository>,
        tags: Arc<TagRepository>,
        trash: TrashManager,
        events: Arc<EventDispatcher>,
    ) -> Result<Self, BootError> {
        let activities = Arc::new(ActivityLog::default());
        events.subscribe(activities.clone());

        let routes = Arc::new(ResourceLocatorStrategy::new(
            repository,
            PathCleanup::from_config(&config.path_cleanup),
            events.clone(),
        )?);
        let structures = Arc::new(StructureFactory::new(
            runtime_paths.structure_paths.clone(),
            Arc::new(XmlStructureLoader::from_config(&config.structures)),
            Some(runtime_paths.structure_cache_dir()),
        ));
        let trash = Arc::new(trash.with_handler(Arc::new(TagTrashItemHandler::new(tags.clone()))));
        let collaboration = Arc::new(CollaborationRegistry::new(Duration::from_secs(
            config.collaboration.threshold_seconds,
        )));

        Ok(Self {
            config,
            runtime_paths,
            analyzer: RequestAnalyzer::new(webspaces),
            routes,
            structures,
            tags,
            trash,
            events,
            activities,
            collaboration,
        })
    }

    pub fn webspaces(&self) -> &WebspaceManager {
        self.analyzer.manager()
    }
}
