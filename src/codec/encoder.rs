/// Signature encoder: call site to virtual type.
///
/// Recognises four call kinds by call-signature token:
///
/// | kind           | tokens                                          |
/// |----------------|-------------------------------------------------|
/// | mock           | `Phake::mock`, `Phake::partialMock`, `Phake::partMock` |
/// | verify         | `Phake::verify`, `Phake::verifyStatic`          |
/// | stub           | `Phake::when`, `Phake::whenStatic`              |
/// | stubbed method | any member call on a receiver in a stub chain   |
use super::key::VirtualType;

/// Prefix of every member-call signature token.
pub const MEMBER_CALL_MARKER: &str = "#M#";

pub const MOCK_SIGNATURES: [&str; 3] = [
    "#M#C\\Phake.mock",
    "#M#C\\Phake.partialMock",
    "#M#C\\Phake.partMock",
];

pub const VERIFY_SIGNATURES: [&str; 2] = ["#M#C\\Phake.verify", "#M#C\\Phake.verifyStatic"];

pub const STUB_SIGNATURES: [&str; 2] = ["#M#C\\Phake.when", "#M#C\\Phake.whenStatic"];

/// One argument of a call as seen by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArgument {
    /// A string literal and its contents (quotes stripped).
    StringLiteral(String),
    /// An expression with zero or more inferred candidate type names.
    Typed(Vec<String>),
    /// Anything else.
    Other,
}

/// Position of a call in a method chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainState {
    /// Not chained onto a stub.
    #[default]
    Fresh,
    /// The receiver is a stub or a method already stubbed through one.
    InStubChain,
}

impl ChainState {
    /// Transition over the receiver's virtual type.
    pub fn after(receiver: Option<&VirtualType>) -> ChainState {
        match receiver {
            Some(VirtualType::Stub(_)) | Some(VirtualType::StubbedMethod) => {
                ChainState::InStubChain
            }
            _ => ChainState::Fresh,
        }
    }

    /// Chain state of a call whose receiver has the given candidate types.
    /// Candidates are parsed as keys; plain class names leave the chain
    /// fresh.
    pub fn from_receiver_types<S: AsRef<str>>(types: &[S]) -> ChainState {
        types
            .iter()
            .map(|t| ChainState::after(VirtualType::parse(t.as_ref()).as_ref()))
            .find(|s| *s == ChainState::InStubChain)
            .unwrap_or_default()
    }
}

/// A call expression reduced to what the encoder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Token identifying the invoked member, e.g. `#M#C\Phake.mock`.
    pub signature: String,
    pub arguments: Vec<CallArgument>,
    pub chain: ChainState,
}

impl CallSite {
    pub fn new(signature: impl Into<String>, arguments: Vec<CallArgument>) -> Self {
        Self {
            signature: signature.into(),
            arguments,
            chain: ChainState::Fresh,
        }
    }

    pub fn with_chain(mut self, chain: ChainState) -> Self {
        self.chain = chain;
        self
    }
}

/// The recognised call kinds that are decided by signature alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    MockConstruction,
    Verify,
    Stub,
}

impl CallKind {
    pub fn of_signature(signature: &str) -> Option<CallKind> {
        if MOCK_SIGNATURES.contains(&signature) {
            Some(CallKind::MockConstruction)
        } else if VERIFY_SIGNATURES.contains(&signature) {
            Some(CallKind::Verify)
        } else if STUB_SIGNATURES.contains(&signature) {
            Some(CallKind::Stub)
        } else {
            None
        }
    }
}

/// Encode a call site, or `None` when it is not a recognised pattern or
/// lacks the argument the pattern needs.
pub fn encode(site: &CallSite) -> Option<VirtualType> {
    let encoded = match CallKind::of_signature(&site.signature) {
        Some(CallKind::MockConstruction) => match site.arguments.first() {
            Some(CallArgument::StringLiteral(contents)) if !contents.is_empty() => {
                Some(VirtualType::Mock {
                    signature: site.signature.clone(),
                    class_name: contents.clone(),
                })
            }
            _ => None,
        },
        Some(CallKind::Verify) => pass_through_types(site).map(VirtualType::Verify),
        Some(CallKind::Stub) => pass_through_types(site).map(VirtualType::Stub),
        None => {
            if site.signature.starts_with(MEMBER_CALL_MARKER)
                && site.chain == ChainState::InStubChain
            {
                Some(VirtualType::StubbedMethod)
            } else {
                None
            }
        }
    };
    if let Some(ref vt) = encoded {
        tracing::debug!(signature = %site.signature, key = %vt, "encoded call");
    }
    encoded
}

/// Candidate types of the first argument, without empties or repeats,
/// in first-seen order.
fn pass_through_types(site: &CallSite) -> Option<Vec<String>> {
    let Some(CallArgument::Typed(types)) = site.arguments.first() else {
        return None;
    };
    let mut union: Vec<String> = Vec::with_capacity(types.len());
    for t in types {
        if !t.is_empty() && !union.contains(t) {
            union.push(t.clone());
        }
    }
    if union.is_empty() { None } else { Some(union) }
}
