use atlas_core::metadata::MAX_DESCRIPTION_CHARS;
use atlas_core::model::taxonomy::TaskType;
use atlas_core::{
    build_route_metadata, render_metadata_json, unresolved_references, BuilderNode, Catalog,
    EntityKind, NodeType, Project,
};
use std::collections::HashSet;

#[test]
fn builtin_catalog_passes_validation() {
    let catalog = Catalog::builtin().unwrap();
    catalog.validate().unwrap();

    for kind in EntityKind::ALL {
        assert!(catalog.count_of(kind) > 0, "no {} records", kind.as_str());
    }
}

#[test]
fn every_task_sits_in_a_known_layer_with_matching_type() {
    let catalog = Catalog::builtin().unwrap();
    for layer in catalog.ordered_layers() {
        for task in catalog.tasks_in_layer(&layer.id) {
            assert_eq!(task.core().task_type, task.expected_type());
        }
    }
    let total: usize = catalog
        .layers
        .iter()
        .map(|layer| catalog.tasks_in_layer(&layer.id).count())
        .sum();
    assert_eq!(total, catalog.tasks().count());
    assert_eq!(
        catalog.task("review-output").unwrap().core().task_type,
        TaskType::Human
    );
}

#[test]
fn relations_are_navigable_both_ways() {
    let catalog = Catalog::builtin().unwrap();
    for task in catalog.tasks() {
        let source = &task.core().id;
        for relation in catalog.relations_from(source) {
            let incoming = catalog.relations_to(&relation.target_id);
            assert!(incoming.iter().any(|(core, _)| &core.id == source));
        }
    }
}

#[test]
fn metadata_has_one_unique_route_per_entity() {
    let catalog = Catalog::builtin().unwrap();
    let routes = build_route_metadata(catalog);

    let entity_routes = routes
        .iter()
        .filter(|route| route.path.matches('/').count() == 2)
        .count();
    assert_eq!(entity_routes, catalog.entity_count());

    let unique: HashSet<&str> = routes.iter().map(|route| route.path.as_str()).collect();
    assert_eq!(unique.len(), routes.len());
    assert!(routes
        .iter()
        .all(|route| route.description.chars().count() <= MAX_DESCRIPTION_CHARS));

    let rendered: serde_json::Value =
        serde_json::from_str(&render_metadata_json(&routes).unwrap()).unwrap();
    assert_eq!(rendered.as_object().unwrap().len(), routes.len());
}

#[test]
fn unresolved_references_are_advisory() {
    let catalog = Catalog::builtin().unwrap();
    let mut project = Project::new("Draft");
    project.data.nodes.push(BuilderNode {
        id: "n1".to_string(),
        node_type: NodeType::Data,
        ref_id: "not-an-artifact".to_string(),
        x: 1.0,
        y: 2.0,
    });

    let unresolved = unresolved_references(catalog, &project);
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].ref_id, "not-an-artifact");

    let value = serde_json::to_value(&project).unwrap();
    assert!(atlas_core::validate_project(&value).is_ok());
}
