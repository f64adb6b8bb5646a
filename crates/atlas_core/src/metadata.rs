//! Per-route page metadata derived from the catalog.
//!
//! # Invariants
//! - One route per static page and one per catalog entity; paths are unique.
//! - Descriptions are at most [`MAX_DESCRIPTION_CHARS`] characters.
//! - Output is a pure function of the catalog.

use crate::taxonomy::{Catalog, EntityRef};
use serde::Serialize;
use serde_json::{Map, Value};

pub const SITE_NAME: &str = "AI Interaction Atlas";
pub const MAX_DESCRIPTION_CHARS: usize = 160;
const ELLIPSIS: &str = "...";

const STATIC_PAGES: &[(&str, &str, &str)] = &[
    (
        "/",
        SITE_NAME,
        "A shared vocabulary of AI, human and system tasks for designing AI-powered products and workflows.",
    ),
    (
        "/builder",
        "Workflow Builder",
        "Assemble workflow diagrams from atlas tasks, data artifacts, constraints and touchpoints, and save them locally.",
    ),
    (
        "/examples",
        "Examples",
        "Worked product examples showing how atlas tasks combine into complete AI interaction flows.",
    ),
    (
        "/about",
        "About",
        "Why the atlas exists and how its layers, tasks and relations are organized.",
    ),
];

/// Metadata for one server-rendered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMeta {
    pub path: String,
    pub title: String,
    pub description: String,
}

/// Builds metadata for every static page followed by every catalog entity.
pub fn build_route_metadata(catalog: &Catalog) -> Vec<RouteMeta> {
    let pages = STATIC_PAGES.iter().map(|(path, title, description)| RouteMeta {
        path: (*path).to_string(),
        title: page_title(title),
        description: truncate_description(description),
    });
    pages.chain(catalog.entities().map(entity_route)).collect()
}

/// Renders routes as a JSON object keyed by path.
pub fn render_metadata_json(routes: &[RouteMeta]) -> serde_json::Result<String> {
    let mut object = Map::new();
    for route in routes {
        let mut entry = Map::new();
        entry.insert("title".to_string(), Value::String(route.title.clone()));
        entry.insert(
            "description".to_string(),
            Value::String(route.description.clone()),
        );
        object.insert(route.path.clone(), Value::Object(entry));
    }
    serde_json::to_string_pretty(&Value::Object(object))
}

fn entity_route(entity: EntityRef<'_>) -> RouteMeta {
    RouteMeta {
        path: format!("/{}/{}", entity.kind().route_segment(), entity.slug()),
        title: page_title(entity.name()),
        description: truncate_description(entity.description()),
    }
}

fn page_title(name: &str) -> String {
    if name == SITE_NAME {
        name.to_string()
    } else {
        format!("{name} | {SITE_NAME}")
    }
}

/// Collapses whitespace and cuts at a word boundary, appending an ellipsis
/// when anything was dropped.
pub fn truncate_description(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_DESCRIPTION_CHARS {
        return collapsed;
    }

    let budget = MAX_DESCRIPTION_CHARS - ELLIPSIS.len();
    let prefix: String = collapsed.chars().take(budget).collect();
    // The char right after the prefix decides whether the cut landed between words.
    let cut_between_words = collapsed.chars().nth(budget) == Some(' ');
    let kept = if cut_between_words {
        prefix.as_str()
    } else {
        prefix
            .rfind(' ')
            .map_or(prefix.as_str(), |space| &prefix[..space])
    };
    let kept = kept.trim_end_matches(|c: char| c == ',' || c == ';' || c == ':' || c == ' ');
    format!("{kept}{ELLIPSIS}")
}
