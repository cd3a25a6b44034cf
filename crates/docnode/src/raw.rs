//! Undecoded views over packed nodes.
//!
//! A [`RawNode`] is the exact byte range of one encoded node together with its
//! validated header. [`RawNodes`] walks a packed node list by jumping over
//! each node's declared length, so skipping a subtree costs the same no
//! matter how large it is.

use docnode_common::{BinaryReader, INT_FIELD_SIZE};

use crate::header::NodeHeader;
use crate::node::read_count;
use crate::{Node, NodeType, Result};

/// One encoded node, not yet decoded.
#[derive(Debug, Clone, Copy)]
pub struct RawNode<'a> {
    header: NodeHeader,
    bytes: &'a [u8],
}

impl<'a> RawNode<'a> {
    /// View the node at the start of `data`.
    ///
    /// Only the header is validated; the body is not inspected.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = NodeHeader::peek(data)?;
        Ok(Self {
            header,
            bytes: &data[..header.total_len()],
        })
    }

    /// The node's header.
    pub fn header(&self) -> &NodeHeader {
        &self.header
    }

    /// Type tag from the header.
    pub fn node_type(&self) -> NodeType {
        self.header.node_type()
    }

    /// Encoded length, including all descendants.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; an encoded node is never empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The encoded bytes of this node.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Fully decode this node.
    pub fn decode(&self) -> Result<Node<'a>> {
        Node::unpack(self.bytes).map(|(node, _)| node)
    }

    /// Iterate over this node's children without decoding them.
    ///
    /// Steps over the data payload and attributes to reach the child list.
    pub fn children(&self) -> Result<RawNodes<'a>> {
        let mut reader = BinaryReader::new(self.bytes);
        reader.skip(NodeHeader::SIZE)?;
        reader.read_lp_bytes()?;

        let attr_count = read_count(&mut reader)?;
        for _ in 0..attr_count {
            reader.read_lp_bytes()?;
            reader.read_lp_bytes()?;
        }

        RawNodes::new(reader.remaining_bytes())
    }
}

/// Iterator over the nodes of a packed node list.
///
/// Yields `Err` at most once, then stops.
#[derive(Debug, Clone)]
pub struct RawNodes<'a> {
    data: &'a [u8],
    offset: usize,
    remaining: usize,
}

impl<'a> RawNodes<'a> {
    /// Start iterating the packed node list at the start of `data`.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let count = read_count(&mut reader)?;
        Ok(Self {
            data,
            offset: INT_FIELD_SIZE,
            remaining: count,
        })
    }

    /// Byte offset of the next node relative to the start of the list.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of nodes not yet yielded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<'a> Iterator for RawNodes<'a> {
    type Item = Result<RawNode<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        match RawNode::parse(&self.data[self.offset..]) {
            Ok(node) => {
                self.offset += node.len();
                self.remaining -= 1;
                Some(Ok(node))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Decode only the top-level node at `index` in a packed list, skipping the rest.
pub fn unpack_nth(data: &[u8], index: usize) -> Result<Option<Node<'_>>> {
    let Some(raw) = RawNodes::new(data)?.nth(index) else {
        return Ok(None);
    };
    raw.and_then(|raw| raw.decode()).map(Some)
}
