//! Binary codec for markup fragment node trees.
//!
//! A parsed document fragment is a tree of [`Node`]s: each node has a
//! [`NodeType`] tag, an opaque data payload, ordered [`Attribute`]s and an
//! ordered [`NodeList`] of children. This crate packs such trees into a flat
//! byte buffer and unpacks them again, so fragments can be cached or moved
//! between processes without re-parsing the markup.
//!
//! # Format
//!
//! Every node carries a version byte and its total encoded length, including
//! all descendants. Decoding checks each declared length against the bytes
//! actually available and actually consumed, which makes truncated or corrupt
//! input fail cleanly and lets [`RawNodes`] skip whole subtrees by length
//! alone. Integers are little-endian on every platform.
//!
//! Decoded nodes borrow their byte strings from the input buffer; use
//! `into_owned` to keep a tree after the buffer is gone.
//!
//! # Example
//!
//! ```
//! use docnode::{Node, NodeList, NodeType};
//!
//! let tree: NodeList = [Node::new(NodeType::Choose)
//!     .child(Node::new(NodeType::When).attr(&b"test"[..], &b"$(x)"[..]))
//!     .child(Node::new(NodeType::Otherwise))]
//! .into_iter()
//! .collect();
//!
//! let mut buffer = Vec::new();
//! tree.pack_to_buffer(&mut buffer);
//!
//! let decoded = NodeList::unpack(&buffer)?;
//! assert_eq!(decoded, tree);
//!
//! // A truncated buffer never decodes
//! assert!(NodeList::unpack(&buffer[..buffer.len() - 1]).is_err());
//! # Ok::<(), docnode::Error>(())
//! ```

mod attribute;
mod error;
mod header;
mod limits;
mod list;
mod node;
mod node_type;
mod raw;
#[cfg(feature = "xml-output")]
mod xml;

pub use attribute::Attribute;
pub use error::{Error, ErrorKind, Result};
pub use header::{NodeHeader, VERSION};
pub use limits::{DecodeLimits, DEFAULT_MAX_DEPTH};
pub use list::NodeList;
pub use node::{Node, Nodes};
pub use node_type::NodeType;
pub use raw::{unpack_nth, RawNode, RawNodes};
