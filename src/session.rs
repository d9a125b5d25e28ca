//! Browsing session: the current tree plus navigation and selection state.
//!
//! Every mutation goes through the same sequence: hand validated paths to
//! the file mutator, rebuild the tree from the store, then reconcile the
//! navigation path and the selection against the new tree.

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::error::TreeError;
use crate::moves::{DeletePlan, MoveValidator};
use crate::selection::{SelectionKey, SelectionModel};
use crate::store::{FileMutator, MutationOutcome, RecordStore};
use crate::tree::paths::{join_segments, split_segments};
use crate::tree::{child_entries, ChildEntries, NavigationPath, NodeId, Tree};

#[derive(Debug, Default)]
pub struct Session {
    tree: Tree,
    navigation: NavigationPath,
    selection: SelectionModel,
}

impl Session {
    /// Build the initial tree from the store, positioned at the root
    pub fn load(store: &impl RecordStore) -> Result<Self> {
        let mut session = Self::default();
        session.rebuild(store)?;
        Ok(session)
    }

    /// Rebuild from a fresh snapshot and reconcile navigation and selection
    #[instrument(skip_all)]
    pub fn rebuild(&mut self, store: &impl RecordStore) -> Result<()> {
        let records = store.snapshot()?;
        let viewed = split_segments(&self.tree.node(self.current()).full_path);
        self.tree = Tree::from_snapshot(&records);

        // The root may have moved, so re-locate the viewed folder by its full
        // path rather than by names relative to the root
        let surviving = (0..=viewed.len())
            .rev()
            .find_map(|len| self.tree.find_folder(&join_segments(&viewed[..len])));
        match surviving {
            Some(node) => self.navigation = NavigationPath::of(&self.tree, node),
            None => self.navigation.reset(),
        }
        if self.tree.node(self.current()).full_path != join_segments(&viewed) {
            debug!(path = %self.navigation, "viewed folder changed on rebuild");
        }

        let dropped = self.selection.retain_existing(&self.tree);
        if dropped > 0 {
            debug!(dropped, "stale selection keys dropped");
        }
        Ok(())
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn navigation(&self) -> &NavigationPath {
        &self.navigation
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Folder currently being viewed
    pub fn current(&self) -> NodeId {
        self.navigation
            .resolve(&self.tree)
            .unwrap_or_else(|_| self.tree.root())
    }

    pub fn entries(&self) -> ChildEntries<'_> {
        child_entries(&self.tree, self.current())
    }

    pub fn breadcrumb(&self) -> Vec<NodeId> {
        self.navigation.breadcrumb(&self.tree).unwrap_or_default()
    }

    /// Open a child folder of the current folder
    pub fn enter(&mut self, name: &str) -> Result<NodeId, TreeError> {
        let child = self
            .tree
            .child(self.current(), name)
            .ok_or_else(|| TreeError::StaleNavigation {
                segment: name.to_string(),
                depth: self.navigation.depth(),
            })?;
        self.navigation.enter(name);
        Ok(child)
    }

    pub fn up(&mut self) -> bool {
        self.navigation.up()
    }

    /// Jump back to a breadcrumb entry; depth 0 is the root
    pub fn to_depth(&mut self, depth: usize) {
        self.navigation.truncate(depth);
    }

    pub fn reset(&mut self) {
        self.navigation.reset();
    }

    /// Navigate to a folder given either an absolute path or a path
    /// relative to the root (`2024/sub`)
    pub fn open(&mut self, path: &str) -> Result<NodeId, TreeError> {
        let node = if path.starts_with('/') {
            self.tree
                .find_folder(path)
                .ok_or_else(|| TreeError::UnknownItem {
                    path: path.to_string(),
                })?
        } else {
            NavigationPath::parse(path).resolve(&self.tree)?
        };
        self.navigation = NavigationPath::of(&self.tree, node);
        Ok(node)
    }

    pub fn select(&mut self, key: SelectionKey) {
        self.selection.insert(key);
    }

    pub fn toggle(&mut self, key: SelectionKey) {
        self.selection.toggle(key);
    }

    /// Folder checkbox: select or deselect the folder and everything in it
    pub fn toggle_folder(&mut self, node: NodeId) {
        self.selection.toggle_subtree(&self.tree, node);
    }

    /// "Select all" for the items listed in the current folder
    pub fn toggle_all_in_view(&mut self) {
        let current = self.current();
        self.selection.toggle_all_in(&self.tree, current);
    }

    pub fn all_in_view_selected(&self) -> bool {
        self.selection.all_in_view_selected(&self.tree, self.current())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn can_move_into(&self, destination: &str) -> bool {
        MoveValidator::new(&self.tree).can_move_into(self.selection.iter(), destination)
    }

    /// Selection key of the folder or leaf at an absolute path
    pub fn key_for_path(&self, path: &str) -> Result<SelectionKey, TreeError> {
        let unknown = || TreeError::UnknownItem {
            path: path.to_string(),
        };
        if let Some(node) = self.tree.find_folder(path) {
            return SelectionKey::for_node(&self.tree, node).ok_or_else(unknown);
        }
        self.tree
            .find_leaf(path)
            .map(SelectionKey::for_leaf)
            .ok_or_else(unknown)
    }

    /// Move the selection into `destination`.
    ///
    /// Afterwards the session shows the destination folder (the root when
    /// it is not part of the rebuilt tree) and the selection is cleared.
    #[instrument(skip(self, store, mutator))]
    pub fn move_selected(
        &mut self,
        store: &impl RecordStore,
        mutator: &impl FileMutator,
        destination: &str,
    ) -> Result<MutationOutcome> {
        let plan = MoveValidator::new(&self.tree)
            .plan(&self.selection, destination)
            .ok_or_else(|| TreeError::InvalidMoveTarget {
                destination: destination.to_string(),
            })?;

        if !plan.skipped.is_empty() {
            debug!(skipped = plan.skipped.len(), "items already in destination");
        }
        if plan.is_empty() {
            info!("nothing to move");
            return Ok(MutationOutcome::default());
        }

        let outcome = mutator.move_paths(&plan.items, &plan.destination);
        self.rebuild(store)?;

        match self.tree.find_folder(&plan.destination) {
            Some(node) => self.navigation = NavigationPath::of(&self.tree, node),
            None => self.navigation.reset(),
        }
        self.selection.clear();

        info!(moved = outcome.count, errors = outcome.errors.len(), "move applied");
        Ok(outcome)
    }

    /// Copy the selection into `destination`, then open the destination.
    /// Rejected destinations are the same as for moves, but items already
    /// inside `destination` are copied next to themselves.
    #[instrument(skip(self, store, mutator))]
    pub fn copy_selected(
        &mut self,
        store: &impl RecordStore,
        mutator: &impl FileMutator,
        destination: &str,
    ) -> Result<MutationOutcome> {
        let plan = MoveValidator::new(&self.tree)
            .plan_copy(&self.selection, destination)
            .ok_or_else(|| TreeError::InvalidMoveTarget {
                destination: destination.to_string(),
            })?;
        if plan.is_empty() {
            info!("nothing to copy");
            return Ok(MutationOutcome::default());
        }

        let outcome = mutator.copy_paths(&plan.items, &plan.destination);
        self.rebuild(store)?;

        match self.tree.find_folder(&plan.destination) {
            Some(node) => self.navigation = NavigationPath::of(&self.tree, node),
            None => self.navigation.reset(),
        }
        self.selection.clear();

        info!(copied = outcome.count, errors = outcome.errors.len(), "copy applied");
        Ok(outcome)
    }

    /// Delete the selection; with `physically == false` only the records go
    #[instrument(skip(self, store, mutator))]
    pub fn delete_selected(
        &mut self,
        store: &impl RecordStore,
        mutator: &impl FileMutator,
        physically: bool,
    ) -> Result<MutationOutcome> {
        let plan = DeletePlan::from_selection(&self.tree, &self.selection);
        if plan.items.is_empty() {
            info!("nothing to delete");
            return Ok(MutationOutcome::default());
        }

        let outcome = mutator.delete_paths(&plan.items, physically);
        self.rebuild(store)?;
        self.selection.clear();

        info!(deleted = outcome.count, errors = outcome.errors.len(), "delete applied");
        Ok(outcome)
    }
}
