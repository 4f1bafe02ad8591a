mod common;

use common::{create_phake_workspace, open_document, position_of, text_position};
use phake_lsp::Backend;
use tower_lsp::LanguageServer;
use tower_lsp::lsp_types::*;

async fn definition(backend: &Backend, uri: &Url, position: Position) -> Vec<Location> {
    let params = GotoDefinitionParams {
        text_document_position_params: text_position(uri, position),
        work_done_progress_params: WorkDoneProgressParams::default(),
        partial_result_params: PartialResultParams::default(),
    };
    match backend.goto_definition(params).await.unwrap() {
        Some(GotoDefinitionResponse::Scalar(location)) => vec![location],
        Some(GotoDefinitionResponse::Array(locations)) => locations,
        Some(GotoDefinitionResponse::Link(_)) => panic!("links are never returned"),
        None => Vec::new(),
    }
}

fn file_name(location: &Location) -> String {
    location
        .uri
        .path_segments()
        .and_then(|mut s| s.next_back())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_mock_literal_jumps_to_class() {
    let (backend, _dir) = create_phake_workspace();
    let uri = Url::parse("file:///tests/UserTest.php").unwrap();
    let text = "<?php\n$m = Phake::mock('User');\n";
    open_document(&backend, &uri, text).await;

    let locations = definition(&backend, &uri, position_of(text, "User'", 2)).await;
    assert_eq!(locations.len(), 1);
    assert_eq!(file_name(&locations[0]), "User.php");
    // `class User {` is on line 3 of User.php.
    assert_eq!(locations[0].range.start, Position::new(3, 6));
    assert_eq!(locations[0].range.end, Position::new(3, 10));
}

#[tokio::test]
async fn test_mock_literal_jumps_to_interface() {
    let (backend, _dir) = create_phake_workspace();
    let uri = Url::parse("file:///tests/MailerTest.php").unwrap();
    let text = "<?php\n$m = Phake::mock('\\App\\Contracts\\Mailer');\n";
    open_document(&backend, &uri, text).await;

    let locations = definition(&backend, &uri, position_of(text, "Mailer'", 0)).await;
    assert_eq!(locations.len(), 1);
    assert_eq!(file_name(&locations[0]), "Mailer.php");
}

#[tokio::test]
async fn test_qualified_mock_literal_without_leading_backslash() {
    let (backend, _dir) = create_phake_workspace();
    let uri = Url::parse("file:///tests/UserTest.php").unwrap();
    let text = "<?php\n$m = Phake::mock('App\\Models\\User');\n";
    open_document(&backend, &uri, text).await;

    let locations = definition(&backend, &uri, position_of(text, "User'", 1)).await;
    assert_eq!(locations.len(), 1);
    assert_eq!(file_name(&locations[0]), "User.php");
}

#[tokio::test]
async fn test_method_on_mock_jumps_to_mocked_method() {
    let (backend, _dir) = create_phake_workspace();
    let uri = Url::parse("file:///tests/UserTest.php").unwrap();
    let text = concat!(
        "<?php\n",
        "$m = Phake::mock('User');\n",
        "Phake::verify($m)->getName();\n",
    );
    open_document(&backend, &uri, text).await;

    let locations = definition(&backend, &uri, position_of(text, "getName", 3)).await;
    assert_eq!(locations.len(), 1);
    assert_eq!(file_name(&locations[0]), "User.php");
    assert_eq!(locations[0].range.start.line, 5);
}

#[tokio::test]
async fn test_stubbed_method_jumps_to_answer_binder() {
    let (backend, _dir) = create_phake_workspace();
    let uri = Url::parse("file:///tests/UserTest.php").unwrap();
    let text = concat!(
        "<?php\n",
        "$m = Phake::mock('User');\n",
        "Phake::when($m)->save()->thenReturn(true);\n",
    );
    open_document(&backend, &uri, text).await;

    let locations = definition(&backend, &uri, position_of(text, "thenReturn", 1)).await;
    assert_eq!(locations.len(), 1);
    assert_eq!(file_name(&locations[0]), "Phake.php");
    assert_eq!(locations[0].range.start.line, 8);
}

#[tokio::test]
async fn test_unknown_names_give_no_definition() {
    let (backend, _dir) = create_phake_workspace();
    let uri = Url::parse("file:///tests/UserTest.php").unwrap();
    let text = concat!(
        "<?php\n",
        "$m = Phake::mock('Nope');\n",
        "$u = Phake::mock('User');\n",
        "$u->missing();\n",
    );
    open_document(&backend, &uri, text).await;

    assert!(definition(&backend, &uri, position_of(text, "Nope", 1)).await.is_empty());
    assert!(
        definition(&backend, &uri, position_of(text, "missing", 1))
            .await
            .is_empty()
    );
}
