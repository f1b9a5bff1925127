//! Model-visible tool names and their way back to a session

use std::collections::{HashMap, HashSet};

use crate::mcp::SourcedItem;
use crate::types::Tool;

/// Where a model-visible tool name really lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRoute {
    /// Pool index of the owning session
    pub source: usize,
    /// Name the server knows the tool by
    pub name: String,
}

/// Routing table for one agent run
///
/// Names advertised by more than one session get a `__<sessionIndex>` suffix;
/// unique names pass through unchanged. A suffixed name that another server
/// already uses natively gets a further `_<n>` until it is free, so every
/// tool stays reachable.
#[derive(Debug, Clone, Default)]
pub struct ToolRoutes {
    tools: Vec<Tool>,
    routes: HashMap<String, ToolRoute>,
}

impl ToolRoutes {
    pub fn build(catalog: &[SourcedItem]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in catalog.iter().filter(|e| e.item.is_tool()) {
            *counts.entry(entry.item.name()).or_default() += 1;
        }
        let is_shared = |name: &str| counts.get(name).copied().unwrap_or(0) > 1;

        // Unique names are claimed up front so suffixes never shadow them
        let mut taken: HashSet<String> = counts
            .keys()
            .filter(|name| !is_shared(name))
            .map(|name| name.to_string())
            .collect();

        let mut table = Self::default();
        for entry in catalog {
            let Some(mut tool) = entry.item.as_tool() else {
                continue;
            };

            let original = tool.name.clone();
            if is_shared(&original) {
                tool.name = free_name(&mut taken, format!("{}__{}", original, entry.source.index));
            }

            table.routes.insert(
                tool.name.clone(),
                ToolRoute {
                    source: entry.source.index,
                    name: original,
                },
            );
            table.tools.push(tool);
        }
        table
    }

    /// Definitions to offer the model
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn resolve(&self, visible_name: &str) -> Option<&ToolRoute> {
        self.routes.get(visible_name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Claim `candidate`, or the first `candidate_<n>` nobody holds
fn free_name(taken: &mut HashSet<String>, candidate: String) -> String {
    let mut name = candidate.clone();
    let mut n = 1;
    while taken.contains(&name) {
        name = format!("{}_{}", candidate, n);
        n += 1;
    }
    taken.insert(name.clone());
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::{CatalogItem, SessionTag};
    use serde_json::json;

    fn entry(index: usize, item: CatalogItem) -> SourcedItem {
        SourcedItem {
            source: SessionTag {
                index,
                label: format!("server-{}", index),
            },
            item,
        }
    }

    fn tool(name: &str) -> CatalogItem {
        CatalogItem::tool(name, "", json!({"type": "object"}))
    }

    #[test]
    fn test_unique_names_pass_through() {
        let routes = ToolRoutes::build(&[
            entry(0, tool("create_note")),
            entry(0, tool("delete_note")),
            entry(1, tool("search")),
        ]);

        let names: Vec<_> = routes.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["create_note", "delete_note", "search"]);
        assert_eq!(
            routes.resolve("search"),
            Some(&ToolRoute { source: 1, name: "search".to_string() })
        );
    }

    #[test]
    fn test_collisions_are_suffixed() {
        let routes = ToolRoutes::build(&[entry(0, tool("search")), entry(1, tool("search"))]);

        assert!(routes.resolve("search").is_none());
        assert_eq!(routes.resolve("search__0").unwrap().source, 0);
        assert_eq!(routes.resolve("search__1").unwrap().source, 1);
        assert_eq!(routes.resolve("search__1").unwrap().name, "search");
    }

    #[test]
    fn test_suffix_clash_with_native_name_stays_routable() {
        let routes = ToolRoutes::build(&[
            entry(0, tool("search")),
            entry(1, tool("search")),
            entry(2, tool("search__1")),
        ]);

        let names: Vec<_> = routes.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["search__0", "search__1_1", "search__1"]);
        assert_eq!(
            routes.resolve("search__1"),
            Some(&ToolRoute { source: 2, name: "search__1".to_string() })
        );
        assert_eq!(
            routes.resolve("search__1_1"),
            Some(&ToolRoute { source: 1, name: "search".to_string() })
        );
        assert_eq!(routes.resolve("search__0").unwrap().source, 0);
    }

    #[test]
    fn test_same_session_repeats_a_name() {
        let routes = ToolRoutes::build(&[entry(0, tool("search")), entry(0, tool("search"))]);

        assert_eq!(routes.len(), 2);
        assert!(routes.resolve("search__0").is_some());
        assert!(routes.resolve("search__0_1").is_some());
    }

    #[test]
    fn test_non_tools_are_not_offered() {
        let routes = ToolRoutes::build(&[
            entry(0, CatalogItem::Prompt {
                name: "summarize".to_string(),
                description: None,
                arguments: Vec::new(),
            }),
            entry(0, tool("create_note")),
        ]);
        assert_eq!(routes.len(), 1);
        assert!(routes.resolve("summarize").is_none());
    }
}
