//! Node type tags.

/// The role of a node in a fragment tree.
///
/// Fourteen tags are known. Any other raw value is legal on the wire and is
/// carried verbatim in [`NodeType::Other`] so it survives a round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Tag 0.
    #[default]
    Unknown,
    /// Plain markup passed through unchanged.
    Pre,
    Include,
    Comment,
    Remove,
    Vars,
    Choose,
    When,
    Otherwise,
    Try,
    Attempt,
    Except,
    HtmlComment,
    SpecialInclude,
    /// Any tag outside the known set.
    Other(i32),
}

impl NodeType {
    /// Every known tag, in raw value order.
    pub const KNOWN: [NodeType; 14] = [
        Self::Unknown,
        Self::Pre,
        Self::Include,
        Self::Comment,
        Self::Remove,
        Self::Vars,
        Self::Choose,
        Self::When,
        Self::Otherwise,
        Self::Try,
        Self::Attempt,
        Self::Except,
        Self::HtmlComment,
        Self::SpecialInclude,
    ];

    /// Map a raw wire value to a tag. Never fails.
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Unknown,
            1 => Self::Pre,
            2 => Self::Include,
            3 => Self::Comment,
            4 => Self::Remove,
            5 => Self::Vars,
            6 => Self::Choose,
            7 => Self::When,
            8 => Self::Otherwise,
            9 => Self::Try,
            10 => Self::Attempt,
            11 => Self::Except,
            12 => Self::HtmlComment,
            13 => Self::SpecialInclude,
            other => Self::Other(other),
        }
    }

    /// The raw wire value.
    pub const fn raw(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Pre => 1,
            Self::Include => 2,
            Self::Comment => 3,
            Self::Remove => 4,
            Self::Vars => 5,
            Self::Choose => 6,
            Self::When => 7,
            Self::Otherwise => 8,
            Self::Try => 9,
            Self::Attempt => 10,
            Self::Except => 11,
            Self::HtmlComment => 12,
            Self::SpecialInclude => 13,
            Self::Other(raw) => raw,
        }
    }

    /// Name of a known tag, `None` for [`NodeType::Other`].
    ///
    /// An `Other` value that happens to hold a known raw value (only possible
    /// when constructed by hand) is still reported by that value's name.
    pub const fn name(self) -> Option<&'static str> {
        let name = match Self::from_raw(self.raw()) {
            Self::Unknown => "UNKNOWN",
            Self::Pre => "PRE",
            Self::Include => "INCLUDE",
            Self::Comment => "COMMENT",
            Self::Remove => "REMOVE",
            Self::Vars => "VARS",
            Self::Choose => "CHOOSE",
            Self::When => "WHEN",
            Self::Otherwise => "OTHERWISE",
            Self::Try => "TRY",
            Self::Attempt => "ATTEMPT",
            Self::Except => "EXCEPT",
            Self::HtmlComment => "HTML_COMMENT",
            Self::SpecialInclude => "SPECIAL_INCLUDE",
            Self::Other(_) => return None,
        };
        Some(name)
    }

    /// Look up a known tag by its upper-case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::KNOWN.into_iter().find(|t| t.name() == Some(name))
    }

    /// Check if this is one of the known tags.
    pub const fn is_known(self) -> bool {
        self.name().is_some()
    }
}

impl From<i32> for NodeType {
    fn from(raw: i32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<NodeType> for i32 {
    fn from(node_type: NodeType) -> Self {
        node_type.raw()
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "TYPE({})", self.raw()),
        }
    }
}
