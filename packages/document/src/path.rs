//! Index-path addressing.
//!
//! Blocks are addressed by their position: a path is a walk through the
//! `children` vectors starting at the document root, so `[1, 0]` is the
//! first child of the second top-level block. The empty path addresses
//! nothing. Paths are positional and go stale whenever siblings shift;
//! callers re-resolve instead of caching, and a miss is `None`, never a
//! panic. Deep copies are plain `Document::clone()`.

use crate::block::{Block, Document};

/// Resolves a path to the block it addresses.
pub fn find_by_path<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Block> {
    let (first, rest) = path.split_first()?;
    let mut current = doc.blocks.get(*first)?;
    for index in rest {
        current = current.children()?.get(*index)?;
    }
    Some(current)
}

pub fn find_by_path_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Option<&'a mut Block> {
    let (first, rest) = path.split_first()?;
    let mut current = doc.blocks.get_mut(*first)?;
    for index in rest {
        current = current.children_mut()?.get_mut(*index)?;
    }
    Some(current)
}

/// Returns the vector that holds the addressed slot: the document root
/// for single-element paths, otherwise the children of the addressed
/// node's parent. Every intermediate node must be a Toggle. The final
/// index is not bounds-checked, so the result can also receive an insert
/// one place past the end.
pub fn parent_array_of_mut<'a>(
    doc: &'a mut Document,
    path: &[usize],
) -> Option<&'a mut Vec<Block>> {
    if path.is_empty() {
        return None;
    }
    let mut vec = &mut doc.blocks;
    for index in &path[..path.len() - 1] {
        vec = vec.get_mut(*index)?.children_mut()?;
    }
    Some(vec)
}

/// Children of the block at `parent`, or the document root for `None`.
/// `None` is returned when the parent is missing or cannot hold children.
pub fn children_of_mut<'a>(
    doc: &'a mut Document,
    parent: Option<&[usize]>,
) -> Option<&'a mut Vec<Block>> {
    match parent {
        None => Some(&mut doc.blocks),
        Some(path) => find_by_path_mut(doc, path)?.children_mut(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    fn sample() -> Document {
        decode("a\n> t\n  b\n  c")
    }

    #[test]
    fn test_find_by_path_hits() {
        let doc = sample();
        assert_eq!(find_by_path(&doc, &[0]).unwrap().content(), "a");
        assert_eq!(find_by_path(&doc, &[1]).unwrap().content(), "t");
        assert_eq!(find_by_path(&doc, &[1, 0]).unwrap().content(), "b");
        assert_eq!(find_by_path(&doc, &[1, 1]).unwrap().content(), "c");
    }

    #[test]
    fn test_find_by_path_misses() {
        let doc = sample();
        assert!(find_by_path(&doc, &[]).is_none());
        assert!(find_by_path(&doc, &[5]).is_none());
        assert!(find_by_path(&doc, &[1, 5]).is_none());
        // Plain lines have no children to walk into.
        assert!(find_by_path(&doc, &[0, 0]).is_none());
    }

    #[test]
    fn test_find_by_path_mut_edits_in_place() {
        let mut doc = sample();
        *find_by_path_mut(&mut doc, &[1, 0]).unwrap().content_mut() = "edited".to_string();
        assert_eq!(find_by_path(&doc, &[1, 0]).unwrap().content(), "edited");
    }

    #[test]
    fn test_parent_array_of_mut() {
        let mut doc = sample();
        assert_eq!(parent_array_of_mut(&mut doc, &[0]).unwrap().len(), 2);
        assert_eq!(parent_array_of_mut(&mut doc, &[1, 0]).unwrap().len(), 2);
        assert!(parent_array_of_mut(&mut doc, &[]).is_none());
        // Intermediate node is a Line, not a Toggle.
        assert!(parent_array_of_mut(&mut doc, &[0, 0]).is_none());
        // The last index may point one past the end (insert position).
        assert!(parent_array_of_mut(&mut doc, &[1, 2]).is_some());
    }

    #[test]
    fn test_children_of_mut() {
        let mut doc = sample();
        assert_eq!(children_of_mut(&mut doc, None).unwrap().len(), 2);
        assert_eq!(children_of_mut(&mut doc, Some(&[1])).unwrap().len(), 2);
        assert!(children_of_mut(&mut doc, Some(&[0])).is_none());
        assert!(children_of_mut(&mut doc, Some(&[9])).is_none());
    }
}
