//! Path segmentation and common-root inference.
//!
//! Paths are compared as sequences of non-empty `/`-separated segments, so
//! `/a/b`, `a/b` and `a//b/` all denote the same folder.

use crate::records::PathRecord;

/// Split a path into its non-empty segments
pub fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Segments of the folder containing a leaf (the filename is dropped)
pub fn parent_segments(path: &str) -> Vec<String> {
    let mut segments = split_segments(path);
    segments.pop();
    segments
}

/// Join segments into a root-relative full path (no leading slash)
pub fn join_segments(segments: &[String]) -> String {
    segments.join("/")
}

fn shared_prefix(a: Vec<String>, b: &[String]) -> Vec<String> {
    let len = a
        .iter()
        .zip(b.iter())
        .take_while(|(x, y)| x == y)
        .count();
    let mut a = a;
    a.truncate(len);
    a
}

/// Longest prefix shared by every sequence; empty for no sequences.
///
/// Longest-common-prefix is associative and commutative, so folding gives
/// the same answer for any ordering of the input.
pub fn common_prefix<I>(sequences: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    sequences
        .into_iter()
        .reduce(|acc, next| shared_prefix(acc, &next))
        .unwrap_or_default()
}

/// Common root of a set of leaf records: the longest shared prefix of their
/// parent-segment sequences.
pub fn common_root<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a PathRecord>,
{
    common_prefix(records.into_iter().map(|r| parent_segments(&r.path)))
}

/// Segments remaining after removing `root`, or `None` if `segments` does not
/// start with `root`.
pub fn strip_root<'a>(segments: &'a [String], root: &[String]) -> Option<&'a [String]> {
    if segments.len() >= root.len() && segments[..root.len()] == *root {
        Some(&segments[root.len()..])
    } else {
        None
    }
}

/// True if `ancestor` equals `path` or is one of its ancestors, in segment terms
pub fn is_ancestor_or_self(ancestor: &str, path: &str) -> bool {
    let ancestor = split_segments(ancestor);
    let path = split_segments(path);
    strip_root(&path, &ancestor).is_some()
}

/// Same folder, in segment terms
pub fn same_path(a: &str, b: &str) -> bool {
    split_segments(a) == split_segments(b)
}
