//! Virtual type codec for Phake call patterns.
//!
//! PHP's declared signatures cannot say that `Phake::mock('Foo')` returns a
//! `Foo`, or that `Phake::when($foo)->bar()` returns an answer binder.  The
//! codec fills that gap in two one-directional steps:
//!
//! 1. [`encoder::encode`] looks at a [`CallSite`] and, for a recognised
//!    pattern, produces a [`VirtualType`] whose text form (the *key*) is
//!    cached by the analysis pass as if it were an ordinary type name.
//! 2. [`SignatureDecoder`] later turns a key back into the declarations it
//!    stands for, using a read-only [`SymbolIndex`](crate::index::SymbolIndex).
//!
//! The decoder may recurse into keys embedded in its own payload (a
//! verified mock carries the mock's key) but never calls the encoder.
//!
//! # Submodules
//!
//! - [`key`]: tags, the [`VirtualType`] enum, and its text form.
//! - [`encoder`]: call-site classification and the stub-chain state.
//! - [`decoder`]: key resolution and [`ResolvedDeclarationSet`].
//! - [`resolve`]: class-or-interface name resolution.

pub mod decoder;
pub mod encoder;
pub mod key;
pub mod resolve;

pub use decoder::{ResolvedDeclarationSet, SignatureDecoder};
pub use encoder::{CallArgument, CallKind, CallSite, ChainState, encode};
pub use key::{Tag, VirtualType};
pub use resolve::resolve_name;

/// Encode a call site straight to its textual key.
pub fn encode_key(site: &CallSite) -> Option<String> {
    encode(site).map(|vt| vt.to_key())
}
