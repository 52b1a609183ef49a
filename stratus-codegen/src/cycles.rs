//! Initialization cycle breaking.
//!
//! A static initialized through `Other.to_ref()` forces `Other` first, so
//! two statics referring to each other directly would deadlock their
//! `LazyLock`s. Every back edge found by a depth-first walk is rewritten
//! into a by-name reference, which needs no initialization.

use std::collections::HashMap;

use crate::lower::Decl;

/// A rewritten edge: `from` now refers to `to` by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenEdge {
    pub from: String,
    pub to: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

/// Break every initialization cycle among `decls`, returning the edges
/// that were rewritten in the order they were found.
pub(crate) fn break_cycles(decls: &mut [Decl]) -> Vec<BrokenEdge> {
    let index: HashMap<String, usize> = decls
        .iter()
        .enumerate()
        .map(|(i, decl)| (decl.ident.clone(), i))
        .collect();

    let mut marks: Vec<Option<Mark>> = vec![None; decls.len()];
    let mut broken = Vec::new();

    let roots: Vec<usize> = (0..decls.len())
        .filter(|&i| decls[i].top_level)
        .chain((0..decls.len()).filter(|&i| !decls[i].top_level))
        .collect();
    for root in roots {
        if marks[root].is_none() {
            visit(decls, &index, root, &mut marks, &mut broken);
        }
    }

    for edge in &broken {
        tracing::debug!(from = %edge.from, to = %edge.to, "broke initialization cycle");
    }
    broken
}

fn visit(
    decls: &mut [Decl],
    index: &HashMap<String, usize>,
    node: usize,
    marks: &mut [Option<Mark>],
    broken: &mut Vec<BrokenEdge>,
) {
    marks[node] = Some(Mark::Visiting);

    let mut edges: Vec<(String, bool)> = Vec::new();
    for (ident, breakable) in decls[node].body.direct_references() {
        if !edges.iter().any(|(seen, _)| seen == ident) {
            edges.push((ident.to_string(), breakable));
        }
    }

    for (ident, breakable) in edges {
        let Some(&next) = index.get(&ident) else {
            continue;
        };
        match marks[next] {
            Some(Mark::Visiting) if breakable => {
                decls[node].body.demote(&ident);
                broken.push(BrokenEdge {
                    from: decls[node].ident.clone(),
                    to: ident,
                });
            }
            Some(Mark::Visiting) => {
                tracing::warn!(
                    from = %decls[node].ident,
                    to = %ident,
                    "initialization cycle through a flattened value"
                );
            }
            Some(Mark::Done) => {}
            None => visit(decls, index, next, marks, broken),
        }
    }

    marks[node] = Some(Mark::Done);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{expr::Expr, lower::FileGroup};

    fn decl(ident: &str, refs: &[&str]) -> Decl {
        let fields = refs
            .iter()
            .map(|target| {
                (
                    "value".to_string(),
                    Expr::Ref {
                        target: target.to_string(),
                        ident: Some(target.to_string()),
                    },
                )
            })
            .collect();
        Decl {
            ident: ident.to_string(),
            type_path: "Thing".to_string(),
            body: Expr::Struct {
                type_path: "Thing".to_string(),
                fields,
            },
            docs: Vec::new(),
            comment: None,
            group: FileGroup::Params,
            module: None,
            top_level: true,
        }
    }

    fn remaining_edges(decls: &[Decl]) -> Vec<(String, String)> {
        decls
            .iter()
            .flat_map(|d| {
                d.body
                    .direct_references()
                    .into_iter()
                    .map(|(to, _)| (d.ident.clone(), to.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_two_cycle_breaks_later_edge() {
        let mut decls = vec![decl("Queue", &["Topic"]), decl("Topic", &["Queue"])];
        let broken = break_cycles(&mut decls);

        assert_eq!(
            broken,
            vec![BrokenEdge {
                from: "Topic".into(),
                to: "Queue".into()
            }]
        );
        assert_eq!(
            remaining_edges(&decls),
            vec![("Queue".to_string(), "Topic".to_string())]
        );
    }

    #[test]
    fn test_acyclic_untouched() {
        let mut decls = vec![
            decl("A", &["B", "C"]),
            decl("B", &["C"]),
            decl("C", &[]),
        ];
        assert!(break_cycles(&mut decls).is_empty());
        assert_eq!(remaining_edges(&decls).len(), 3);
    }

    #[test]
    fn test_self_reference() {
        let mut decls = vec![decl("Loop", &["Loop"])];
        assert_eq!(break_cycles(&mut decls).len(), 1);
        assert!(remaining_edges(&decls).is_empty());
    }

    #[test]
    fn test_long_cycle_breaks_once() {
        let mut decls = vec![
            decl("A", &["B"]),
            decl("B", &["C"]),
            decl("C", &["A"]),
        ];
        let broken = break_cycles(&mut decls);
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].from, "C");
        assert_eq!(remaining_edges(&decls).len(), 2);
    }
}
