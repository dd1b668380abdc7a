//! Topological ordering of plugins by their declared dependencies.
//!
//! Plugins are visited depth-first in registration order, so a plugin's
//! dependencies always precede it and otherwise unrelated plugins keep their
//! relative order. Id-less plugins cannot be depended on and stay at their
//! registration position.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::CliError;
use crate::plugin::Plugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

struct Visitor<'a> {
    plugins: &'a [Plugin],
    by_id: HashMap<&'a str, usize>,
    marks: HashMap<&'a str, Mark>,
    sorted: Vec<Plugin>,
}

impl<'a> Visitor<'a> {
    fn visit(&mut self, position: usize, path: &mut Vec<&'a str>) -> Result<(), CliError> {
        let plugins = self.plugins;
        let Some(plugin) = plugins.get(position) else {
            return Ok(());
        };
        let Some(id) = plugin.id() else {
            return Ok(());
        };

        match self.marks.get(id) {
            Some(Mark::Visited) => return Ok(()),
            Some(Mark::Visiting) => {
                path.push(id);
                return Err(CliError::CircularDependency {
                    chain: path.join(" -> "),
                });
            }
            None => {}
        }

        self.marks.insert(id, Mark::Visiting);
        path.push(id);
        for dependency in plugin.dependencies() {
            match self.by_id.get(dependency.id()).copied() {
                Some(dependency_position) => self.visit(dependency_position, path)?,
                None if dependency.is_optional() => {
                    debug!(
                        plugin = id,
                        dependency = dependency.id(),
                        "optional dependency not installed"
                    );
                }
                None => {
                    return Err(CliError::MissingDependency {
                        dependency: dependency.id().to_owned(),
                        plugin: id.to_owned(),
                    });
                }
            }
        }
        path.pop();
        self.marks.insert(id, Mark::Visited);
        self.sorted.push(plugin.clone());
        Ok(())
    }
}

/// Orders `plugins` so every plugin follows its dependencies.
///
/// When two plugins share an id the first registration wins and the later
/// one is dropped with a warning.
///
/// # Errors
///
/// Returns [`CliError::MissingDependency`] when a required dependency is not
/// installed and [`CliError::CircularDependency`] when dependencies form a
/// cycle.
///
/// # Examples
///
/// ```
/// use weft::{plugin, resolve_dependencies};
///
/// let sorted = resolve_dependencies(&[
///     plugin("c").dependency("b").build(),
///     plugin("b").dependency("a").build(),
///     plugin("a").build(),
/// ])
/// .expect("acyclic");
/// let ids: Vec<_> = sorted.iter().filter_map(|p| p.id()).collect();
/// assert_eq!(ids, ["a", "b", "c"]);
/// ```
pub fn resolve_dependencies(plugins: &[Plugin]) -> Result<Vec<Plugin>, CliError> {
    let mut by_id = HashMap::new();
    for (position, plugin) in plugins.iter().enumerate() {
        let Some(id) = plugin.id() else {
            continue;
        };
        if by_id.contains_key(id) {
            warn!(plugin = id, "duplicate plugin id; keeping the first registration");
        } else {
            by_id.insert(id, position);
        }
    }

    let mut visitor = Visitor {
        plugins,
        by_id,
        marks: HashMap::new(),
        sorted: Vec::with_capacity(plugins.len()),
    };
    for (position, plugin) in plugins.iter().enumerate() {
        match plugin.id() {
            None => visitor.sorted.push(plugin.clone()),
            Some(id) if visitor.by_id.get(id) == Some(&position) => {
                visitor.visit(position, &mut Vec::new())?;
            }
            Some(_) => {}
        }
    }
    Ok(visitor.sorted)
}
