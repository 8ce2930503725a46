//! objectClass hierarchy sorting
//!
//! Turns the client-supplied objectClass values into the full, ordered
//! chain the directory stores: `top` first, then every ancestor and
//! requested class with each class after its parent.
//!
//! ## Placement
//!
//! After the ancestor closure is built, classes are placed one at a time.
//! A class is eligible once its parent has been placed; among eligible
//! classes the lowest `order_rank` goes first, ties broken by the
//! case-folded name. This yields one deterministic order for any input
//! permutation, and a class whose parent can never be placed (a cycle) is
//! reported instead of looping.

use crate::errors::{Result, SchemaError};
use crate::schema::names::TOP;
use crate::schema::{ClassRecord, SchemaView};

/// Ordered objectClass chain, `top` first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassChain {
    classes: Vec<String>,
}

impl ClassChain {
    pub fn as_slice(&self) -> &[String] {
        &self.classes
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.classes.last().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn into_values(self) -> Vec<String> {
        self.classes
    }
}

struct ChainNode<'s> {
    class: &'s ClassRecord,
    placed: bool,
}

/// Sort objectClass values into a complete parent-before-child chain
///
/// Without a schema the values are kept as given and prefixed with `top`,
/// which is what lets the schema partition itself be loaded.
///
/// # Errors
///
/// - `UnknownClass` / `DefunctClass` for a value the schema rejects
/// - `MissingTopClass` if the schema has no `top`
/// - `MissingParentClass` when an ancestor is not in the schema
/// - `UnplaceableClass` when the parent links never reach `top`
pub fn sort_object_classes<'s>(
    schema: Option<&'s dyn SchemaView>,
    values: &[String],
) -> Result<ClassChain> {
    let Some(schema) = schema else {
        return Ok(bootstrap_chain(values));
    };

    let top = schema
        .resolve_class(TOP)
        .ok_or(SchemaError::MissingTopClass)?;

    let mut working: Vec<ChainNode<'s>> = Vec::with_capacity(values.len());
    for value in values {
        let class = resolve_live_class(schema, value)?;
        if class.is_top() || holds(&working, &class.name) {
            continue;
        }
        working.push(ChainNode {
            class,
            placed: false,
        });
    }

    // The vector grows while it is walked; ancestors get their own turn.
    let mut idx = 0;
    while idx < working.len() {
        let class = working[idx].class;
        idx += 1;
        if class.parent_name.eq_ignore_ascii_case(TOP) || holds(&working, &class.parent_name) {
            continue;
        }
        let parent = schema.resolve_class(&class.parent_name).ok_or_else(|| {
            SchemaError::MissingParentClass {
                name: class.name.clone(),
                parent: class.parent_name.clone(),
            }
        })?;
        if parent.is_top() {
            continue;
        }
        working.push(ChainNode {
            class: parent,
            placed: false,
        });
    }

    let mut sorted: Vec<&ClassRecord> = Vec::with_capacity(working.len() + 1);
    sorted.push(top);
    while let Some(next) = next_eligible(&working, &sorted) {
        working[next].placed = true;
        sorted.push(working[next].class);
    }

    if let Some(stuck) = working.iter().find(|n| !n.placed) {
        return Err(SchemaError::UnplaceableClass {
            name: stuck.class.name.clone(),
        });
    }

    Ok(ClassChain {
        classes: sorted.into_iter().map(|c| c.name.clone()).collect(),
    })
}

/// Check that every value names a live class
///
/// # Errors
///
/// `UnknownClass` or `DefunctClass` for the first offending value.
pub fn validate_class_names(schema: &dyn SchemaView, values: &[String]) -> Result<()> {
    for value in values {
        resolve_live_class(schema, value)?;
    }
    Ok(())
}

/// Most specific structural class of a chain
///
/// Chains are parent-first, so this is the last structural entry.
pub fn last_structural_class<'s>(
    schema: &'s dyn SchemaView,
    chain: &ClassChain,
) -> Option<&'s ClassRecord> {
    chain
        .iter()
        .filter_map(|name| schema.resolve_class(name))
        .filter(|class| class.is_structural())
        .last()
}

fn resolve_live_class<'s>(schema: &'s dyn SchemaView, name: &str) -> Result<&'s ClassRecord> {
    let class = schema
        .resolve_class(name)
        .ok_or_else(|| SchemaError::UnknownClass {
            name: name.to_string(),
        })?;
    if class.is_defunct {
        return Err(SchemaError::DefunctClass {
            name: class.name.clone(),
        });
    }
    Ok(class)
}

fn holds(working: &[ChainNode<'_>], name: &str) -> bool {
    working
        .iter()
        .any(|n| n.class.name.eq_ignore_ascii_case(name))
}

fn next_eligible(working: &[ChainNode<'_>], sorted: &[&ClassRecord]) -> Option<usize> {
    working
        .iter()
        .enumerate()
        .filter(|(_, n)| {
            !n.placed
                && sorted
                    .iter()
                    .any(|p| p.name.eq_ignore_ascii_case(&n.class.parent_name))
        })
        .min_by(|(_, a), (_, b)| {
            a.class
                .order_rank
                .cmp(&b.class.order_rank)
                .then_with(|| {
                    a.class
                        .name
                        .to_ascii_lowercase()
                        .cmp(&b.class.name.to_ascii_lowercase())
                })
        })
        .map(|(idx, _)| idx)
}

// Client values stay as given, duplicates included; only `top` moves to the front.
fn bootstrap_chain(values: &[String]) -> ClassChain {
    let classes = std::iter::once(TOP.to_string())
        .chain(
            values
                .iter()
                .filter(|value| !value.eq_ignore_ascii_case(TOP))
                .cloned(),
        )
        .collect();
    ClassChain { classes }
}
