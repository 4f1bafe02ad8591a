use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use phake_lsp::codec::{CallArgument, CallSite, SignatureDecoder, encode_key};
use phake_lsp::config::DEFAULT_ANSWER_BINDER;
use phake_lsp::index::ProjectIndex;
use phake_lsp::parser::{parse_document, parse_symbols};

const PHAKE: &str = "<?php
class Phake {
    public static function mock($className) {}
    public static function verify($mock) {}
    public static function when($mock) {}
}
class Phake_Proxies_AnswerBinderProxy {
    public function thenReturn($value) {}
}
";

const TEST_FILE: &str = "<?php
namespace Tests;
use App\\Models\\User;
class UserTest {
    public function testSave(User $user) {
        $m = \\Phake::mock('User');
        \\Phake::verify($m)->save();
        \\Phake::when($m)->save()->thenReturn(true);
        \\Phake::verify($user)->getName();
    }
}
";

fn build_index() -> ProjectIndex {
    let index = ProjectIndex::new();
    index.update_file(
        "file:///vendor/Phake.php",
        parse_symbols("file:///vendor/Phake.php", PHAKE).declarations,
    );
    for i in 0..200 {
        let uri = format!("file:///src/Models/Model{}.php", i);
        let source = format!(
            "<?php\nnamespace App\\Models;\nclass Model{} {{ public function save() {{}} }}\n",
            i
        );
        index.update_file(&uri, parse_symbols(&uri, &source).declarations);
    }
    index.update_file(
        "file:///src/Models/User.php",
        parse_symbols(
            "file:///src/Models/User.php",
            "<?php\nnamespace App\\Models;\nclass User { public function save() {} }\n",
        )
        .declarations,
    );
    index
}

fn bench_codec(c: &mut Criterion) {
    let mock = CallSite::new(
        "#M#C\\Phake.mock",
        vec![CallArgument::StringLiteral("User".to_string())],
    );
    c.bench_function("encode_mock", |b| {
        b.iter(|| black_box(encode_key(black_box(&mock))))
    });

    let index = build_index();
    let decoder = SignatureDecoder::new(&index, DEFAULT_ANSWER_BINDER);
    let keys = [
        "<01>#M#C\\Phake.mock~User",
        "<02><01>#M#C\\Phake.mock~User",
        "<03>\\App\\Models\\User|\\App\\Models\\Model7",
        "<04>",
    ];
    c.bench_function("decode_keys", |b| {
        b.iter(|| {
            for key in keys {
                black_box(decoder.decode(black_box(key)));
            }
        })
    });
}

fn bench_analysis(c: &mut Criterion) {
    c.bench_function("parse_and_analyse", |b| {
        b.iter(|| black_box(parse_document("file:///tests/UserTest.php", black_box(TEST_FILE))))
    });
}

criterion_group!(codec, bench_codec, bench_analysis);
criterion_main!(codec);
