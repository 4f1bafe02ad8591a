/// Virtual type keys and their textual form.
///
/// A key is a 4-character tag followed by a tag-specific payload.  Inside
/// the crate keys are handled as [`VirtualType`] values; the text form
/// only exists at the boundary where a key is stored as a type string
/// (the analysis pass's candidate types) and is produced by
/// [`VirtualType::to_key`] / consumed by [`VirtualType::parse`].
///
/// ```text
/// <01>#M#C\Phake.mock~App\User        mock construction
/// <02>\App\User|<01>#M#C\...~Foo      verification (pass-through union)
/// <03>\App\User                       stub configuration
/// <04>                                stubbed-method chain
/// ```
use std::fmt;

/// Width of every tag.
pub const TAG_LEN: usize = 4;

pub const MOCK_TAG: &str = "<01>";
pub const VERIFY_TAG: &str = "<02>";
pub const STUB_TAG: &str = "<03>";
pub const STUBBED_METHOD_TAG: &str = "<04>";

/// Separates the call-signature token from the class name in a MOCK
/// payload.  Only the first occurrence counts.
pub const MOCK_SEPARATOR: u8 = b'~';

/// Separates the members of a VERIFY / STUB union.
pub const UNION_SEPARATOR: char = '|';

/// The four key kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Mock,
    Verify,
    Stub,
    StubbedMethod,
}

impl Tag {
    pub const ALL: [Tag; 4] = [Tag::Mock, Tag::Verify, Tag::Stub, Tag::StubbedMethod];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Mock => MOCK_TAG,
            Tag::Verify => VERIFY_TAG,
            Tag::Stub => STUB_TAG,
            Tag::StubbedMethod => STUBBED_METHOD_TAG,
        }
    }

    /// Read the tag at the start of `key`.
    ///
    /// Returns `None` when `key` is shorter than [`TAG_LEN`] bytes, when
    /// the first [`TAG_LEN`] bytes do not end on a character boundary, or
    /// when they are not one of the four tags.
    pub fn from_key(key: &str) -> Option<Tag> {
        let head = key.get(..TAG_LEN)?;
        Tag::ALL.into_iter().find(|t| t.as_str() == head)
    }

    /// Human readable label used in hover text and CLI output.
    pub fn label(self) -> &'static str {
        match self {
            Tag::Mock => "mock",
            Tag::Verify => "verification",
            Tag::Stub => "stub",
            Tag::StubbedMethod => "stubbed method",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A virtual return type, the decoded form of a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VirtualType {
    /// `Phake::mock('Name')` and friends.
    Mock {
        /// Call-signature token of the mock-builder call.
        signature: String,
        /// The literal class or interface name that was mocked.
        class_name: String,
    },
    /// `Phake::verify($x)`: typed like `$x`.  Members are kept verbatim and
    /// may themselves be embedded MOCK keys.
    Verify(Vec<String>),
    /// `Phake::when($x)`: typed like `$x`.
    Stub(Vec<String>),
    /// Any call chained onto a stub.
    StubbedMethod,
}

impl VirtualType {
    pub fn tag(&self) -> Tag {
        match self {
            VirtualType::Mock { .. } => Tag::Mock,
            VirtualType::Verify(_) => Tag::Verify,
            VirtualType::Stub(_) => Tag::Stub,
            VirtualType::StubbedMethod => Tag::StubbedMethod,
        }
    }

    /// Serialize to the textual key.
    pub fn to_key(&self) -> String {
        self.to_string()
    }

    /// Parse a textual key.
    ///
    /// Malformed keys yield `None`: a short or untagged string, or a MOCK
    /// payload without a `~`.  Empty union members are dropped; a
    /// VERIFY / STUB key whose union ends up empty still parses (and
    /// decodes to nothing).
    pub fn parse(key: &str) -> Option<VirtualType> {
        let tag = Tag::from_key(key)?;
        let payload = &key[TAG_LEN..];
        match tag {
            Tag::Mock => {
                let sep = memchr::memchr(MOCK_SEPARATOR, payload.as_bytes())?;
                Some(VirtualType::Mock {
                    signature: payload[..sep].to_string(),
                    class_name: payload[sep + 1..].to_string(),
                })
            }
            Tag::Verify => Some(VirtualType::Verify(split_union(payload))),
            Tag::Stub => Some(VirtualType::Stub(split_union(payload))),
            Tag::StubbedMethod => Some(VirtualType::StubbedMethod),
        }
    }

    /// The union members of a VERIFY / STUB type; empty for the others.
    pub fn members(&self) -> &[String] {
        match self {
            VirtualType::Verify(members) | VirtualType::Stub(members) => members,
            _ => &[],
        }
    }
}

impl fmt::Display for VirtualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().as_str())?;
        match self {
            VirtualType::Mock {
                signature,
                class_name,
            } => write!(f, "{}~{}", signature, class_name),
            VirtualType::Verify(members) | VirtualType::Stub(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", UNION_SEPARATOR)?;
                    }
                    f.write_str(member)?;
                }
                Ok(())
            }
            VirtualType::StubbedMethod => Ok(()),
        }
    }
}

fn split_union(payload: &str) -> Vec<String> {
    payload
        .split(UNION_SEPARATOR)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a candidate type string is a virtual type key rather than a
/// plain class name.
pub fn is_key(type_name: &str) -> bool {
    Tag::from_key(type_name).is_some()
}
