//! Static instantiation: materialize every statically named descendant of a
//! schema node as a managed container.
//!
//! The walk is an explicit stack holding the current descent path. A frame
//! is pushed when its container has been created, bound and linked into its
//! parent, and popped once all of its static children are done. On failure
//! the frames still on the stack are unwound deepest first: each container
//! is removed and unlinked from its parent, and the parent is persisted.

use std::sync::Arc;

use shapetree_container::{BindingOrigin, Container};
use shapetree_rdf::{Prefixes, Term};
use shapetree_store::Storage;
use shapetree_types::InstancePath;
use url::Url;

use crate::error::{SchemaError, SchemaResult};
use crate::tree::RemoteShapeTree;

struct Frame {
    container: Container,
    path: InstancePath,
    /// Static children not yet created, consumed from the back.
    pending: Vec<(Term, String)>,
}

impl RemoteShapeTree {
    /// Create a managed container at `root` bound to this schema at
    /// `instance_path`, link it into `parent`, then do the same for every
    /// static child of `node`, recursively.
    ///
    /// Errors that are not already recognized schema errors are reported as
    /// [`SchemaError::Structure`] naming the container that failed.
    pub async fn instantiate_static(
        &self,
        node: &Term,
        root: &Url,
        instance_path: InstancePath,
        parent: &Container,
    ) -> SchemaResult<Container> {
        let storage = Arc::clone(parent.storage());
        let prefixes = parent.prefixes().map_err(|e| structure(root, e.into()))?;
        let pending = self.pending_children(node).map_err(|e| structure(root, e))?;

        let first = self
            .create(&storage, &prefixes, root, instance_path.clone(), parent)
            .await
            .map_err(|e| structure(root, e))?;
        let mut stack = vec![Frame {
            container: first,
            path: instance_path,
            pending,
        }];

        loop {
            let Some(top) = stack.last_mut() else {
                return Err(SchemaError::Structure {
                    root: root.to_string(),
                    message: "instantiation stack emptied early".to_string(),
                });
            };
            let Some((child, label)) = top.pending.pop() else {
                // Every static child is done; the frame leaves the descent path.
                if let Some(done) = stack.pop() {
                    if stack.is_empty() {
                        tracing::info!(root = %root, schema = %self.url, "instantiated shape tree");
                        return Ok(done.container);
                    }
                }
                continue;
            };

            let step = async {
                let id = top.container.id().join(&format!("{label}/"))?;
                let path = top.path.join(&label)?;
                let pending = self.pending_children(&child)?;
                let container = self
                    .create(&storage, &prefixes, &id, path.clone(), &top.container)
                    .await?;
                Ok::<_, SchemaError>(Frame {
                    container,
                    path,
                    pending,
                })
            };
            match step.await {
                Ok(frame) => stack.push(frame),
                Err(e) => {
                    let failed = top
                        .container
                        .id()
                        .join(&format!("{label}/"))
                        .map(|u| u.to_string())
                        .unwrap_or_else(|_| label.clone());
                    let error = structure_named(failed, e);
                    unwind(stack, parent).await;
                    return Err(error);
                }
            }
        }
    }

    /// Static container children of `node`, reversed so popping yields
    /// identifier order. Static resources are left for clients to create.
    fn pending_children(&self, node: &Term) -> SchemaResult<Vec<(Term, String)>> {
        let mut children = Vec::new();
        for (child, label) in self.static_children(node)? {
            let step = self.step(&child)?;
            if step.expects_type.map_or(true, |t| t.is_container()) {
                children.push((child, label));
            }
        }
        children.reverse();
        Ok(children)
    }

    /// Create, bind and link one container. Undoes its own partial work on failure.
    async fn create(
        &self,
        storage: &Arc<dyn Storage>,
        prefixes: &Prefixes,
        id: &Url,
        path: InstancePath,
        parent: &Container,
    ) -> SchemaResult<Container> {
        let container = Container::open(Arc::clone(storage), id, prefixes).await?;
        let container = match container
            .into_managed(&self.url, path, BindingOrigin::Planted)
            .await
        {
            Ok(managed) => managed,
            Err(e) => {
                if let Err(cleanup) = storage.remove_container(id).await {
                    tracing::warn!(id = %id, error = %cleanup, "could not remove partially created container");
                }
                return Err(e.into());
            }
        };
        let linked = async {
            parent.add_member(id).await?;
            parent.write().await
        };
        if let Err(e) = linked.await {
            compensate(&container, parent).await;
            return Err(e.into());
        }
        tracing::debug!(id = %id, parent = %parent.id(), "created managed container");
        Ok(container)
    }
}

/// Remove `container` and its link from `parent`, logging anything that fails.
async fn compensate(container: &Container, parent: &Container) {
    let id = container.id();
    if let Err(e) = container.remove().await {
        tracing::warn!(id = %id, error = %e, "rollback: could not remove container");
    }
    if let Err(e) = parent.remove_member(id).await {
        tracing::warn!(id = %id, error = %e, "rollback: could not unlink container");
    }
    if let Err(e) = parent.write().await {
        tracing::warn!(parent = %parent.id(), error = %e, "rollback: could not persist parent");
    }
}

/// Unwind every frame, deepest first.
async fn unwind(mut stack: Vec<Frame>, outer: &Container) {
    while let Some(frame) = stack.pop() {
        let parent = stack.last().map(|f| &f.container).unwrap_or(outer);
        tracing::debug!(id = %frame.container.id(), "rolling back");
        compensate(&frame.container, parent).await;
    }
}

fn structure(root: &Url, error: SchemaError) -> SchemaError {
    structure_named(root.to_string(), error)
}

fn structure_named(root: String, error: SchemaError) -> SchemaError {
    if error.is_managed() {
        error
    } else {
        SchemaError::Structure {
            root,
            message: error.to_string(),
        }
    }
}
