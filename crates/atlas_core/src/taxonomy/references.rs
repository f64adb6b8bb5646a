//! Advisory check of builder node references against the catalog.

use crate::model::project::{NodeType, Project};
use crate::taxonomy::catalog::Catalog;
use crate::taxonomy::entity::EntityKind;
use serde::Serialize;

/// A node whose `refId` does not name a catalog entry of the expected kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    pub node_id: String,
    pub node_type: NodeType,
    pub ref_id: String,
}

fn accepts(node_type: NodeType, kind: EntityKind) -> bool {
    match node_type {
        NodeType::Task => kind.is_task(),
        NodeType::Data => kind == EntityKind::DataArtifact,
        NodeType::Constraint => kind == EntityKind::Constraint,
        NodeType::Touchpoint => kind == EntityKind::Touchpoint,
        NodeType::Annotation | NodeType::Actor => true,
    }
}

/// Lists nodes in `project` whose reference does not resolve.
///
/// Annotation and actor nodes carry free-form references and are skipped.
/// The result never affects whether a project is valid.
pub fn unresolved_references(catalog: &Catalog, project: &Project) -> Vec<UnresolvedReference> {
    project
        .data
        .nodes
        .iter()
        .filter(|node| !matches!(node.node_type, NodeType::Annotation | NodeType::Actor))
        .filter(|node| {
            !catalog
                .entity(&node.ref_id)
                .is_some_and(|entity| accepts(node.node_type, entity.kind()))
        })
        .map(|node| UnresolvedReference {
            node_id: node.id.clone(),
            node_type: node.node_type,
            ref_id: node.ref_id.clone(),
        })
        .collect()
}
