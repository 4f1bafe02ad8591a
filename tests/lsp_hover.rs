mod common;

use common::{create_phake_workspace, open_document, position_of, text_position};
use phake_lsp::Backend;
use tower_lsp::LanguageServer;
use tower_lsp::lsp_types::*;

async fn hover_text(backend: &Backend, uri: &Url, position: Position) -> Option<String> {
    let params = HoverParams {
        text_document_position_params: text_position(uri, position),
        work_done_progress_params: WorkDoneProgressParams::default(),
    };
    let hover = backend.hover(params).await.unwrap()?;
    match hover.contents {
        HoverContents::Markup(markup) => Some(markup.value),
        other => panic!("unexpected hover contents: {:?}", other),
    }
}

#[tokio::test]
async fn test_hover_on_mock_call_lists_declarations() {
    let (backend, _dir) = create_phake_workspace();
    let uri = Url::parse("file:///tests/UserTest.php").unwrap();
    let text = "<?php\n$m = Phake::mock('User');\n";
    open_document(&backend, &uri, text).await;

    let text = hover_text(&backend, &uri, position_of(text, "mock(", 1))
        .await
        .unwrap();
    assert!(text.starts_with("Phake mock: `<01>#M#C\\Phake.mock~User`"), "{}", text);
    assert!(text.contains("- class `App\\Models\\User`"), "{}", text);
    assert!(text.contains("- function `Phake::mock`"), "{}", text);
}

#[tokio::test]
async fn test_hover_on_variable_shows_its_key() {
    let (backend, _dir) = create_phake_workspace();
    let uri = Url::parse("file:///tests/UserTest.php").unwrap();
    let text = concat!(
        "<?php\n",
        "$stub = Phake::when(Phake::mock('Mailer'));\n",
        "$stub->send('x');\n",
    );
    open_document(&backend, &uri, text).await;

    let text = hover_text(&backend, &uri, position_of(text, "$stub->", 2))
        .await
        .unwrap();
    assert!(text.starts_with("Phake stub: `<03><01>"), "{}", text);
    assert!(text.contains("- interface `App\\Contracts\\Mailer`"), "{}", text);
}

#[tokio::test]
async fn test_hover_on_stubbed_method_names_answer_binder() {
    let (backend, _dir) = create_phake_workspace();
    let uri = Url::parse("file:///tests/UserTest.php").unwrap();
    let text = "<?php\nPhake::when(Phake::mock('User'))->save();\n";
    open_document(&backend, &uri, text).await;

    let text = hover_text(&backend, &uri, position_of(text, "save", 1))
        .await
        .unwrap();
    assert_eq!(
        text,
        "Phake stubbed method: `<04>`\n\n- class `Phake_Proxies_AnswerBinderProxy`"
    );
}

#[tokio::test]
async fn test_no_hover_on_ordinary_code() {
    let (backend, _dir) = create_phake_workspace();
    let uri = Url::parse("file:///tests/Plain.php").unwrap();
    let text = "<?php\n$n = strlen('abc');\n";
    open_document(&backend, &uri, text).await;

    assert!(
        hover_text(&backend, &uri, position_of(text, "strlen", 2))
            .await
            .is_none()
    );
}
