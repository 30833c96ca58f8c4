use crate::raw::{RawParams, RawValue};
use crate::{InputItem, InputTree};
use tracing::trace;

/// Builds an input tree from a query or body collection.
///
/// Every level is visited in reverse insertion order, so the resulting trees
/// iterate last-submitted key first. Empty values are kept as empty items.
pub fn build_tree(raw: &RawParams) -> InputTree {
    let mut tree = InputTree::new();

    for (key, value) in raw.iter().rev() {
        match value {
            RawValue::Scalar(value) => {
                tree.insert(key, InputItem::new(key, value.as_str()));
            }
            RawValue::Map(nested) => {
                tree.insert(key, build_tree(nested));
            }
        }
    }

    trace!(keys = tree.len(), "built input tree level");
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputNode;

    fn item<'a>(tree: &'a InputTree, key: &str) -> Option<&'a InputItem> {
        tree.get(key).and_then(InputNode::as_item)
    }

    #[test]
    fn empty_input() {
        assert!(build_tree(&RawParams::new()).is_empty());
    }

    #[test]
    fn flat_input_is_one_level() {
        let raw: RawParams = [("name", "Zava"), ("city", "Hangzhou"), ("empty", "")].into_iter().collect();
        let tree = build_tree(&raw);

        assert_eq!(tree.len(), 3);
        for (key, value) in &raw {
            let item = item(&tree, key).unwrap();
            assert_eq!(item.key(), key);
            assert_eq!(Some(item.value()), value.as_scalar());
        }
    }

    #[test]
    fn nested_input() {
        let raw = RawParams::from_urlencoded("a[b][0]=x&a[b][1]=y");
        let tree = build_tree(&raw);

        let b = tree.get("a").and_then(|a| a.get("b")).and_then(InputNode::as_tree).unwrap();
        let expected: InputTree = [("0", InputItem::new("0", "x")), ("1", InputItem::new("1", "y"))].into_iter().collect();
        assert_eq!(b, &expected);
    }

    #[test]
    fn levels_are_built_in_reverse_order() {
        let raw = RawParams::from_urlencoded("first=1&second=2&third[a]=3&third[b]=4");
        let tree = build_tree(&raw);

        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["third", "second", "first"]);

        let third = tree.get("third").and_then(InputNode::as_tree).unwrap();
        assert_eq!(third.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn empty_value_still_produces_item() {
        let raw = RawParams::from_urlencoded("blank=");
        let tree = build_tree(&raw);

        assert_eq!(item(&tree, "blank"), Some(&InputItem::new("blank", "")));
    }
}
