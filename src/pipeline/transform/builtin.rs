//! Transforms that need no external tool

use std::path::Path;
use xxhash_rust::xxh3::xxh3_64;

use super::{EmittedAsset, ModuleContent, Transform, TransformContext};

/// Identity
pub struct RawTransform;

impl Transform for RawTransform {
    fn name(&self) -> &str {
        "raw"
    }

    fn apply(
        &self,
        _ctx: &mut TransformContext<'_>,
        input: ModuleContent,
    ) -> Result<ModuleContent, String> {
        Ok(input)
    }
}

/// JSON document to a data module
pub struct JsonTransform;

impl Transform for JsonTransform {
    fn name(&self) -> &str {
        "json"
    }

    fn apply(
        &self,
        _ctx: &mut TransformContext<'_>,
        input: ModuleContent,
    ) -> Result<ModuleContent, String> {
        let value: serde_json::Value =
            serde_json::from_slice(&input.bytes).map_err(|e| format!("invalid JSON: {}", e))?;
        let literal = serde_json::to_string(&value).map_err(|e| e.to_string())?;
        Ok(ModuleContent::data(literal))
    }
}

/// Stylesheet text to a data module exporting it as a string
pub struct CssTransform;

impl Transform for CssTransform {
    fn name(&self) -> &str {
        "css"
    }

    fn apply(
        &self,
        _ctx: &mut TransformContext<'_>,
        input: ModuleContent,
    ) -> Result<ModuleContent, String> {
        let text = input.text()?;
        Ok(ModuleContent::data(js_string(text)))
    }
}

/// Injects the stylesheet exported by the previous step into the document
pub struct StyleTransform;

impl Transform for StyleTransform {
    fn name(&self) -> &str {
        "style"
    }

    fn apply(
        &self,
        _ctx: &mut TransformContext<'_>,
        input: ModuleContent,
    ) -> Result<ModuleContent, String> {
        let literal = input
            .data_literal
            .ok_or_else(|| "style must follow a step exporting stylesheet text, such as css".to_string())?;
        let code = format!(
            "var css = {};\n\
             if (typeof document !== \"undefined\") {{\n  \
             var style = document.createElement(\"style\");\n  \
             style.appendChild(document.createTextNode(css));\n  \
             document.head.appendChild(style);\n\
             }}\n\
             module.exports = css;\n",
            literal
        );
        Ok(ModuleContent::code(code))
    }
}

/// Inlines small files as data URLs, emitting larger ones like [`FileTransform`]
pub struct UrlTransform;

impl Transform for UrlTransform {
    fn name(&self) -> &str {
        "url"
    }

    fn apply(
        &self,
        ctx: &mut TransformContext<'_>,
        input: ModuleContent,
    ) -> Result<ModuleContent, String> {
        let size = input.bytes.len() as u64;
        if let Some(limit) = ctx.step.option_u64("limit") {
            if size > limit {
                log::debug!(
                    "{}: {} bytes exceeds url limit {}, emitting file",
                    ctx.path.display(),
                    size,
                    limit
                );
                return FileTransform.apply(ctx, input);
            }
        }

        let mime = ctx
            .step
            .option_str("mimetype")
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime(ctx.path).to_string());
        let url = format!(
            "data:{};base64,{}",
            mime,
            base64_simd::STANDARD.encode_to_string(&input.bytes)
        );
        Ok(ModuleContent::data(js_string(&url)))
    }
}

/// Emits the bytes as a separate asset and exports its public path
pub struct FileTransform;

/// Default emitted asset name
pub const DEFAULT_ASSET_NAME: &str = "[hash].[ext]";

impl Transform for FileTransform {
    fn name(&self) -> &str {
        "file"
    }

    fn apply(
        &self,
        ctx: &mut TransformContext<'_>,
        input: ModuleContent,
    ) -> Result<ModuleContent, String> {
        let template = ctx.step.option_str("name").unwrap_or(DEFAULT_ASSET_NAME);
        let file_name = asset_file_name(template, ctx.path, &input.bytes);
        let public_path = ctx.step.option_str("public-path").unwrap_or("");

        let literal = js_string(&format!("{}{}", public_path, file_name));
        ctx.emitted.push(EmittedAsset {
            file_name,
            source: ctx.path.to_path_buf(),
            bytes: input.bytes,
        });
        Ok(ModuleContent::data(literal))
    }
}

/// Expand `[hash]`, `[name]` and `[ext]` in an asset name template
pub fn asset_file_name(template: &str, path: &Path, bytes: &[u8]) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = template
        .replace("[hash]", &format!("{:016x}", xxh3_64(bytes)))
        .replace("[name]", &stem)
        .replace("[ext]", &ext);
    name.strip_suffix('.').map(str::to_string).unwrap_or(name)
}

/// Quote text as a JavaScript string literal
pub fn js_string(text: &str) -> String {
    // serde_json only fails on non-string map keys, never on a &str
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

/// MIME type for a file, by extension
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "application/font-woff",
        "woff2" => "font/woff2",
        "ttf" => "application/octet-stream",
        "eot" => "application/vnd.ms-fontobject",
        "css" => "text/css",
        "json" => "application/json",
        "js" | "mjs" | "cjs" => "application/javascript",
        "html" => "text/html",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
