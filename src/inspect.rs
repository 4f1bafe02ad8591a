/// The `inspect` command: analyse one file against an indexed workspace
/// and report every call the codec recognised.
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::Backend;
use crate::codec::Tag;
use crate::error::{Error, Result};
use crate::util::offset_to_position;
use crate::workspace::path_to_uri;

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub file: String,
    pub indexed_files: usize,
    pub calls: Vec<InspectedCall>,
}

#[derive(Debug, Serialize)]
pub struct InspectedCall {
    /// One-based line of the method name.
    pub line: u32,
    /// One-based column of the method name.
    pub column: u32,
    pub method: String,
    pub signature: String,
    pub kind: &'static str,
    pub key: String,
    /// `"<keyword> <fqn>"` for every declaration the key decodes to.
    pub resolved: Vec<String>,
}

/// Index `workspace` (default: the file's directory) and analyse `file`.
pub fn inspect(file: &Path, workspace: Option<&Path>) -> Result<InspectReport> {
    let file = file.canonicalize().map_err(|e| Error::io(file, e))?;
    let content = fs::read_to_string(&file).map_err(|e| Error::io(&file, e))?;

    let root = match workspace {
        Some(root) => root.canonicalize().map_err(|e| Error::io(root, e))?,
        None => file.parent().unwrap_or(Path::new("/")).to_path_buf(),
    };
    let backend = Backend::new_with_workspace(root);
    let uri = path_to_uri(&file);
    backend.update_ast(&uri, &content);

    let analysis = backend.analysis_for(&uri).unwrap_or_default();
    let calls = analysis
        .virtual_calls()
        .filter_map(|call| {
            let key = call.key.clone()?;
            let pos = offset_to_position(&content, call.name_span.start);
            let resolved = backend
                .decode_types(std::slice::from_ref(&key))
                .into_iter()
                .map(|d| format!("{} {}", d.kind.keyword(), d.fqn))
                .collect();
            Some(InspectedCall {
                line: pos.line + 1,
                column: pos.character + 1,
                method: call.method.clone(),
                signature: call.signature.clone(),
                kind: Tag::from_key(&key).map(Tag::label).unwrap_or("unknown"),
                key,
                resolved,
            })
        })
        .collect();

    Ok(InspectReport {
        file: file.display().to_string(),
        indexed_files: backend.index().file_count(),
        calls,
    })
}

impl InspectReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} virtual call(s), {} indexed file(s)",
            self.file,
            self.calls.len(),
            self.indexed_files
        )?;
        for call in &self.calls {
            writeln!(
                f,
                "  {}:{} {} [{}] {}",
                call.line, call.column, call.method, call.kind, call.key
            )?;
            if call.resolved.is_empty() {
                writeln!(f, "      (unresolved)")?;
            }
            for decl in &call.resolved {
                writeln!(f, "      -> {}", decl)?;
            }
        }
        Ok(())
    }
}
