use phake_lsp::codec::encoder::{MOCK_SIGNATURES, STUB_SIGNATURES, VERIFY_SIGNATURES};
use phake_lsp::codec::{CallArgument, CallKind, CallSite, ChainState, VirtualType, encode, encode_key};

fn literal(s: &str) -> Vec<CallArgument> {
    vec![CallArgument::StringLiteral(s.to_string())]
}

fn typed(types: &[&str]) -> Vec<CallArgument> {
    vec![CallArgument::Typed(
        types.iter().map(|t| t.to_string()).collect(),
    )]
}

// ─── Mock construction ──────────────────────────────────────────────────────

#[test]
fn test_mock_literal_encodes_signature_and_name() {
    let site = CallSite::new("#M#C\\Phake.mock", literal("Foo"));
    assert_eq!(
        encode_key(&site).as_deref(),
        Some("<01>#M#C\\Phake.mock~Foo")
    );
}

#[test]
fn test_every_mock_token_is_recognised() {
    for token in MOCK_SIGNATURES {
        let vt = encode(&CallSite::new(token, literal("App\\User")));
        assert_eq!(
            vt,
            Some(VirtualType::Mock {
                signature: token.to_string(),
                class_name: "App\\User".to_string(),
            }),
            "token {token}"
        );
    }
}

#[test]
fn test_mock_needs_non_empty_literal_first() {
    assert_eq!(encode(&CallSite::new("#M#C\\Phake.mock", literal(""))), None);
    assert_eq!(encode(&CallSite::new("#M#C\\Phake.mock", Vec::new())), None);
    assert_eq!(
        encode(&CallSite::new("#M#C\\Phake.mock", typed(&["\\Foo"]))),
        None
    );
    let second_is_literal = vec![CallArgument::Other, CallArgument::StringLiteral("Foo".into())];
    assert_eq!(
        encode(&CallSite::new("#M#C\\Phake.mock", second_is_literal)),
        None
    );
}

// ─── Verify / stub pass-through ─────────────────────────────────────────────

#[test]
fn test_verify_passes_types_through() {
    let site = CallSite::new("#M#C\\Phake.verify", typed(&["Foo", "Bar"]));
    assert_eq!(encode_key(&site).as_deref(), Some("<02>Foo|Bar"));
}

#[test]
fn test_stub_tokens_encode_stub() {
    for token in STUB_SIGNATURES {
        let vt = encode(&CallSite::new(token, typed(&["\\App\\User"])));
        assert_eq!(vt, Some(VirtualType::Stub(vec!["\\App\\User".to_string()])));
    }
    for token in VERIFY_SIGNATURES {
        let vt = encode(&CallSite::new(token, typed(&["\\App\\User"])));
        assert_eq!(vt, Some(VirtualType::Verify(vec!["\\App\\User".to_string()])));
    }
}

#[test]
fn test_pass_through_drops_duplicates_and_empties_keeping_order() {
    let site = CallSite::new("#M#C\\Phake.when", typed(&["B", "", "A", "B", "A"]));
    assert_eq!(encode_key(&site).as_deref(), Some("<03>B|A"));
}

#[test]
fn test_stub_without_types_is_absent() {
    assert_eq!(encode(&CallSite::new("#M#C\\Phake.when", typed(&[]))), None);
    assert_eq!(encode(&CallSite::new("#M#C\\Phake.when", typed(&["", ""]))), None);
    assert_eq!(
        encode(&CallSite::new("#M#C\\Phake.verify", vec![CallArgument::Other])),
        None
    );
    assert_eq!(
        encode(&CallSite::new("#M#C\\Phake.verify", literal("Foo"))),
        None
    );
}

#[test]
fn test_verify_carries_embedded_mock_key() {
    let mock_key = "<01>#M#C\\Phake.mock~Foo";
    let site = CallSite::new("#M#C\\Phake.verify", typed(&[mock_key]));
    assert_eq!(
        encode_key(&site),
        Some(format!("<02>{}", mock_key))
    );
}

// ─── Stubbed-method chains ──────────────────────────────────────────────────

#[test]
fn test_call_on_stub_becomes_stubbed_method() {
    let receiver = vec!["<03>\\App\\User".to_string()];
    let site = CallSite::new("#M#<03>\\App\\User.save", Vec::new())
        .with_chain(ChainState::from_receiver_types(&receiver));
    assert_eq!(encode(&site), Some(VirtualType::StubbedMethod));
    assert_eq!(encode_key(&site).as_deref(), Some("<04>"));
}

#[test]
fn test_chain_continues_past_stubbed_method() {
    let site = CallSite::new("#M#<04>.thenReturn", literal("x"))
        .with_chain(ChainState::from_receiver_types(&["<04>"]));
    assert_eq!(encode(&site), Some(VirtualType::StubbedMethod));
}

#[test]
fn test_chain_state_transitions() {
    assert_eq!(ChainState::after(None), ChainState::Fresh);
    assert_eq!(
        ChainState::after(Some(&VirtualType::Stub(vec!["A".into()]))),
        ChainState::InStubChain
    );
    assert_eq!(
        ChainState::after(Some(&VirtualType::StubbedMethod)),
        ChainState::InStubChain
    );
    assert_eq!(
        ChainState::after(Some(&VirtualType::Verify(vec!["A".into()]))),
        ChainState::Fresh
    );
    assert_eq!(
        ChainState::after(Some(&VirtualType::Mock {
            signature: "#M#C\\Phake.mock".into(),
            class_name: "A".into(),
        })),
        ChainState::Fresh
    );
}

#[test]
fn test_tag_like_text_in_a_name_does_not_start_a_chain() {
    // Only a receiver whose type *parses* as a stub counts.
    let receiver = ["\\Weird<03>Name", "<02><03>X"];
    assert_eq!(ChainState::from_receiver_types(&receiver), ChainState::Fresh);
    let site = CallSite::new("#M#\\Weird<03>Name.go", Vec::new())
        .with_chain(ChainState::from_receiver_types(&receiver));
    assert_eq!(encode(&site), None);
}

#[test]
fn test_fresh_member_call_is_absent() {
    let site = CallSite::new("#M#\\App\\User.save", Vec::new());
    assert_eq!(encode(&site), None);
}

#[test]
fn test_in_chain_non_member_signature_is_absent() {
    let site = CallSite::new("#F#strlen", Vec::new()).with_chain(ChainState::InStubChain);
    assert_eq!(encode(&site), None);
}

// ─── Allow-lists ────────────────────────────────────────────────────────────

#[test]
fn test_unlisted_tokens_are_absent() {
    let tokens = [
        "#M#C\\Phake.spy",
        "#M#C\\Phake.mock2",
        "#M#C\\Other.mock",
        "#M#CPhake.mock",
        "#C\\Phake",
        "",
        "mock",
    ];
    for token in tokens {
        assert_eq!(encode(&CallSite::new(token, literal("Foo"))), None, "{token}");
        assert_eq!(encode(&CallSite::new(token, typed(&["Foo"]))), None, "{token}");
        assert_eq!(CallKind::of_signature(token), None);
    }
}

#[test]
fn test_call_kind_of_signature() {
    assert_eq!(
        CallKind::of_signature("#M#C\\Phake.partMock"),
        Some(CallKind::MockConstruction)
    );
    assert_eq!(
        CallKind::of_signature("#M#C\\Phake.verifyStatic"),
        Some(CallKind::Verify)
    );
    assert_eq!(
        CallKind::of_signature("#M#C\\Phake.whenStatic"),
        Some(CallKind::Stub)
    );
}
