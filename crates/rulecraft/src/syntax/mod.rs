//! Input positions and the match tree.

pub mod cursor;
pub mod line_col;
pub mod match_tree;
pub mod text;
pub mod visitor;

pub use cursor::Cursor;
pub use line_col::{LineCol, LineIndex, line_col_from_offset};
pub use match_tree::{Capture, Match};
pub use text::Span;
pub use visitor::{MatchVisitor, MatchWalker};
