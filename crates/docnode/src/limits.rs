//! Decode limits.

/// Default maximum nesting depth accepted by a decode.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Bounds applied while decoding untrusted buffers.
///
/// The wire format itself does not bound nesting; each level of children
/// costs several stack frames in the decoder, so the depth is capped. The
/// default fits a 2 MiB thread stack in unoptimized builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum number of nesting levels. Top-level nodes are level one.
    pub max_depth: usize,
}

impl DecodeLimits {
    /// Limits with the given maximum depth.
    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// No depth limit. Only use with trusted input.
    pub const fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
