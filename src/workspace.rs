/// Workspace scanning.
///
/// Walks a directory tree for `*.php` files with `ignore`, so `.gitignore`
/// and `.ignore` files are honoured, skips any directory whose name is
/// listed in `[index] exclude`, and extracts the declarations of every
/// file it finds.
///
/// The Composer vendor directory is almost always gitignored but holds
/// Phake itself, so it is walked as a second root with ignore files
/// turned off.
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::{DirEntry, WalkBuilder};
use tower_lsp::lsp_types::Url;

use crate::error::{Error, Result};
use crate::index::ProjectIndex;
use crate::parser::parse_symbols;
use crate::types::Declaration;

/// The Composer vendor directory of `root`: `config.vendor-dir` from
/// `composer.json`, or `vendor`.
pub fn vendor_dir(root: &Path) -> PathBuf {
    let configured = fs::read_to_string(root.join("composer.json"))
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .and_then(|json| {
            json.get("config")
                .and_then(|c| c.get("vendor-dir"))
                .and_then(|v| v.as_str())
                .map(|s| s.trim_end_matches('/').to_string())
        });
    root.join(configured.as_deref().unwrap_or("vendor"))
}

fn is_excluded_dir(entry: &DirEntry, exclude: &[String]) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude.iter().any(|ex| ex == name))
}

fn walk_php_files(mut builder: WalkBuilder, exclude: &[String], paths: &mut Vec<PathBuf>) {
    let exclude: Vec<String> = exclude.to_vec();
    let walker = builder
        .hidden(false)
        .filter_entry(move |entry| !is_excluded_dir(entry, &exclude))
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "php") {
            paths.push(path.to_path_buf());
        }
    }
}

/// Every PHP file under `root` and its vendor directory, in a stable
/// order.  Fails only when `root` itself cannot be read; unreadable
/// entries below it are logged and skipped.
pub fn collect_php_files(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    fs::metadata(root).map_err(|e| Error::io(root, e))?;

    let mut paths = Vec::new();
    walk_php_files(WalkBuilder::new(root), exclude, &mut paths);

    let vendor = vendor_dir(root);
    let vendor_excluded = vendor
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| exclude.iter().any(|ex| ex == name));
    if vendor.is_dir() && !vendor_excluded {
        tracing::debug!("indexing vendor directory {}", vendor.display());
        let mut builder = WalkBuilder::new(&vendor);
        builder
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false);
        walk_php_files(builder, exclude, &mut paths);
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// The `file://` URI of a path, falling back to a plain prefix when the
/// path is not absolute.
pub fn path_to_uri(path: &Path) -> String {
    match Url::from_file_path(path) {
        Ok(url) => url.to_string(),
        Err(()) => format!("file://{}", path.display()),
    }
}

/// Scan `root` and extract declarations, one entry per file.
///
/// Files that cannot be read are logged and skipped.
pub fn scan(root: &Path, exclude: &[String]) -> Result<Vec<(String, Vec<Declaration>)>> {
    let paths = collect_php_files(root, exclude)?;
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let uri = path_to_uri(&path);
        let symbols = parse_symbols(&uri, &content);
        files.push((uri, symbols.declarations));
    }

    tracing::info!("scanned {} PHP file(s) under {}", files.len(), root.display());
    Ok(files)
}

/// Scan `root` into `index`, leaving the URIs in `skip` untouched.
/// Returns the number of files indexed.
pub fn index_into(
    index: &ProjectIndex,
    root: &Path,
    exclude: &[String],
    skip: &HashSet<String>,
) -> Result<usize> {
    let files: Vec<(String, Vec<Declaration>)> = scan(root, exclude)?
        .into_iter()
        .filter(|(uri, _)| !skip.contains(uri))
        .collect();
    let count = files.len();
    index.extend(files);
    Ok(count)
}
