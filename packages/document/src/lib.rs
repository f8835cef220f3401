pub mod block;
pub mod decode;
pub mod encode;
pub mod path;

pub use block::{Block, BlockKind, Document};
pub use decode::decode;
pub use encode::encode;
pub use path::{children_of_mut, find_by_path, find_by_path_mut, parent_array_of_mut};

/// Canonical form of persisted text: decode then encode.
///
/// Useful for comparing externally supplied text against a tree's own
/// encoding without tripping over indent width or trailing whitespace.
pub fn normalize(text: &str) -> String {
    encode(&decode(text))
}
