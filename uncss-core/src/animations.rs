//! Keyframes pruning: drop `@keyframes` blocks whose name no surviving
//! declaration animates.
//!
//! Runs over the already-filtered tree, so an animation referenced only
//! by removed rules counts as unreferenced. Vendor-prefixed variants
//! (`@-webkit-keyframes` and friends) share the same name space.

use crate::filter::{UnusedKind, UnusedRule};
use crate::stylesheet::{Node, Stylesheet};
use std::collections::HashSet;
use tracing::trace;

/// Collect the animation names referenced by surviving declarations.
///
/// Both the `animation-name` longhand and the `animation` shorthand are
/// read; for the shorthand only the first token of each comma-separated
/// segment is taken, matching how authors overwhelmingly write it. Bodies
/// of `@keyframes` blocks themselves are not scanned.
pub fn used_animations(sheet: &Stylesheet) -> HashSet<String> {
    let mut names = HashSet::new();
    scan(&sheet.nodes, &mut names);
    names
}

fn scan(nodes: &[Node], names: &mut HashSet<String>) {
    for node in nodes {
        match node {
            Node::Rule(rule) => {
                for declaration in &rule.declarations {
                    if declaration.property.ends_with("animation-name") {
                        for name in declaration.value.split(',') {
                            let name = name.trim();
                            if !name.is_empty() {
                                names.insert(name.to_string());
                            }
                        }
                    } else if declaration.property.ends_with("animation") {
                        for segment in declaration.value.split(',') {
                            if let Some(name) = segment.split_whitespace().next() {
                                names.insert(name.to_string());
                            }
                        }
                    }
                }
            }
            Node::AtRule(at) if at.is_keyframes() => {}
            Node::AtRule(at) => scan(&at.children, names),
            Node::Comment(_) => {}
        }
    }
}

/// Remove `@keyframes` blocks whose name is not in `used`, in place.
/// Appends one removal record per dropped block.
pub fn prune_keyframes(
    sheet: &mut Stylesheet,
    used: &HashSet<String>,
    unused: &mut Vec<UnusedRule>,
) {
    prune(&mut sheet.nodes, used, unused);
}

fn prune(nodes: &mut Vec<Node>, used: &HashSet<String>, unused: &mut Vec<UnusedRule>) {
    nodes.retain_mut(|node| match node {
        Node::AtRule(at) if at.is_keyframes() => {
            let keep = used.contains(at.params.as_str());
            if !keep {
                trace!(name = %at.params, "removing unreferenced keyframes block");
                unused.push(UnusedRule {
                    kind: UnusedKind::Keyframes,
                    selectors: vec![at.params.clone()],
                    position: at.position,
                });
            }
            keep
        }
        Node::AtRule(at) if at.is_conditional() => {
            prune(&mut at.children, used, unused);
            true
        }
        _ => true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_stylesheet;

    #[test]
    fn test_longhand_animation_name() {
        let sheet = parse_stylesheet(".a { animation-name: spin, fade; }").unwrap();
        let names = used_animations(&sheet);
        assert!(names.contains("spin"));
        assert!(names.contains("fade"));
    }

    #[test]
    fn test_shorthand_takes_first_token_per_segment() {
        let sheet =
            parse_stylesheet(".a { animation: spin 2s linear infinite, fade 1s ease; }").unwrap();
        let names = used_animations(&sheet);
        assert_eq!(names.len(), 2);
        assert!(names.contains("spin"));
        assert!(names.contains("fade"));
    }

    #[test]
    fn test_vendor_prefixed_properties_are_read() {
        let sheet = parse_stylesheet(".a { -webkit-animation-name: spin; }").unwrap();
        assert!(used_animations(&sheet).contains("spin"));
    }

    #[test]
    fn test_references_inside_media_groups_count() {
        let sheet = parse_stylesheet("@media screen { .a { animation: fade 1s; } }").unwrap();
        assert!(used_animations(&sheet).contains("fade"));
    }

    #[test]
    fn test_keyframe_bodies_are_not_scanned() {
        let sheet =
            parse_stylesheet("@keyframes outer { from { animation-name: inner; } }").unwrap();
        assert!(used_animations(&sheet).is_empty());
    }

    #[test]
    fn test_prune_drops_unreferenced_block() {
        let mut sheet = parse_stylesheet(
            ".a { animation: spin 2s; } @keyframes spin { from {} } @keyframes fade { from {} }",
        )
        .unwrap();
        let names = used_animations(&sheet);
        let mut unused = Vec::new();
        prune_keyframes(&mut sheet, &names, &mut unused);
        let css = sheet.to_css();
        assert!(css.contains("@keyframes spin"));
        assert!(!css.contains("@keyframes fade"));
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].kind, UnusedKind::Keyframes);
        assert_eq!(unused[0].selectors, vec!["fade"]);
    }

    #[test]
    fn test_prune_reaches_into_media_groups() {
        let mut sheet =
            parse_stylesheet("@media screen { @keyframes fade { from {} } }").unwrap();
        let mut unused = Vec::new();
        prune_keyframes(&mut sheet, &HashSet::new(), &mut unused);
        assert!(!sheet.to_css().contains("@keyframes"));
        // The group itself stays; only the filter pass prunes empty groups.
        assert!(sheet.to_css().contains("@media screen"));
    }

    #[test]
    fn test_vendor_prefixed_keyframes_share_the_name() {
        let mut sheet = parse_stylesheet(
            ".a { animation-name: spin; } @-webkit-keyframes spin { from {} }",
        )
        .unwrap();
        let names = used_animations(&sheet);
        let mut unused = Vec::new();
        prune_keyframes(&mut sheet, &names, &mut unused);
        assert!(sheet.to_css().contains("@-webkit-keyframes spin"));
    }
}
