//! Deterministic cleanup of model output into compilable component source.
//!
//! Models wrap code in fences and chat around it despite instructions. This pass:
//! 1. keeps only the body of the first fenced block (if any) and strips stray fences
//! 2. rejects full HTML documents
//! 3. drops prose before the first declaration
//! 4. strips `react` / `react-dom` imports (the sandbox supplies those bindings)
//! 5. finds the default-exported component and rewrites the export away

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::generation::error::GenerationError;

static FENCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*```[\w+#.-]*\s*$").unwrap());

static DOCUMENT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!doctype\b|<html[\s>]").unwrap());

static DECLARATION_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(import|export|function|const|let|var|class)\b").unwrap()
});

static RENDERER_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*import\s+(?:[\w$*{}\s,]+?\s+from\s+)?["'](?:react|react-dom|react-dom/client|react/jsx-runtime)["'][ \t]*;?[ \t]*\r?\n?"#,
    )
    .unwrap()
});

static DEFAULT_EXPORT_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)export\s+default\s+((?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*))")
        .unwrap()
});

static DEFAULT_EXPORT_BINDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*export\s+default\s+([A-Za-z_$][\w$]*)\s*;?[ \t]*$").unwrap()
});

static NAMED_EXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)export\s+((?:async\s+)?(?:function|const|let|var|class)\b)").unwrap()
});

/// Cleaned, executable component source and the name of its component.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SanitizedSource {
    pub code: String,
    pub component_name: String,
}

pub fn sanitize(raw: &str) -> Result<SanitizedSource, GenerationError> {
    let text = strip_fences(raw);

    if DOCUMENT_MARKER.is_match(&text) {
        return Err(GenerationError::NotComponentSource);
    }

    let text = match DECLARATION_START.find(&text) {
        Some(start) => text[start.start()..].to_string(),
        None => text,
    };

    let text = RENDERER_IMPORT.replace_all(&text, "").into_owned();

    let (text, component_name) = rewrite_default_export(&text)?;
    let text = NAMED_EXPORT.replace_all(&text, "$1$2").into_owned();

    Ok(SanitizedSource {
        code: text.trim().to_string(),
        component_name,
    })
}

/// Keeps the body of the first fenced block when one exists, then removes any
/// fence marker lines left at either end.
fn strip_fences(raw: &str) -> String {
    let lines: Vec<&str> = raw.trim().lines().collect();

    let body: Vec<&str> = match lines.iter().position(|line| FENCE_LINE.is_match(line)) {
        Some(open) => {
            let rest = &lines[open + 1..];
            match rest.iter().position(|line| FENCE_LINE.is_match(line)) {
                Some(close) => rest[..close].to_vec(),
                None => rest.to_vec(),
            }
        }
        None => lines,
    };

    let mut body: &[&str] = &body;
    while body.first().is_some_and(|line| FENCE_LINE.is_match(line)) {
        body = &body[1..];
    }
    while body.last().is_some_and(|line| FENCE_LINE.is_match(line)) {
        body = &body[..body.len() - 1];
    }

    body.join("\n").trim().to_string()
}

fn rewrite_default_export(text: &str) -> Result<(String, String), GenerationError> {
    if let Some(captures) = DEFAULT_EXPORT_FUNCTION.captures(text) {
        let name = captures[3].to_string();
        let rewritten = DEFAULT_EXPORT_FUNCTION.replace(text, "$1$2").into_owned();
        return Ok((rewritten, name));
    }

    if let Some(captures) = DEFAULT_EXPORT_BINDING.captures(text) {
        let name = captures[1].to_string();
        let rewritten = DEFAULT_EXPORT_BINDING.replace(text, "").into_owned();
        return Ok((rewritten, name));
    }

    Err(GenerationError::ComponentNameNotFound)
}
