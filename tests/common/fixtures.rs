//! Test fixture helpers for creating test projects
//!
//! Provides a small web project with a descriptor, two entry points, a
//! shared module, JSON data, a stylesheet, an image and a static page.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Re-export anyhow for convenience
pub use anyhow;

/// Descriptor used by [`web_project`]
pub const WEB_DESCRIPTOR: &str = r#"
mode = "production"
sourcemap = "external"
optimize = ["dedupe", "minify"]

[entry]
app = "src/app.js"
admin = "src/admin.js"

[output]
dir = "dist"
filename = "[name].bundle.js"

[define]
__DEV__ = false

[[rules]]
test = '\.json$'
use = ["json"]

[[rules]]
test = '\.css$'
use = ["css", "style"]

[[rules]]
test = '\.png$'
use = ["url?limit=16"]

[[copy]]
from = "src/index.html"

[[copy]]
from = "src/img"
to = "img"
"#;

/// Write `contents` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, contents: impl AsRef<[u8]>) -> anyhow::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Creates the web project described by [`WEB_DESCRIPTOR`]
///
/// The TempDir must be kept alive for the project to exist.
pub fn web_project() -> anyhow::Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    write_file(root, "assetpipe.toml", WEB_DESCRIPTOR)?;
    write_file(
        root,
        "src/app.js",
        r#"var util = require('./util');
var config = require('./config.json');
require('./style.css');
var logo = require('./logo.png');
if (__DEV__) {
  console.log('debug build');
}
module.exports = util.greet(config.name) + logo;
"#,
    )?;
    write_file(
        root,
        "src/admin.js",
        "module.exports = require('./util').greet('admin');\n",
    )?;
    write_file(
        root,
        "src/util.js",
        "// greeting helper\nexports.greet = function (name) {\n  return 'hello ' + name;\n};\n",
    )?;
    write_file(root, "src/config.json", r#"{ "name": "demo" }"#)?;
    write_file(root, "src/style.css", "body { margin: 0; }\n")?;
    write_file(root, "src/logo.png", [0x89u8; 64])?;
    write_file(root, "src/index.html", "<script src=\"app.bundle.js\"></script>\n")?;
    write_file(root, "src/img/icons/close.svg", "<svg/>")?;

    Ok(temp_dir)
}

/// Creates a project with one raw entry point and no descriptor file
pub fn single_entry_project(source: &str) -> anyhow::Result<TempDir> {
    let temp_dir = TempDir::new()?;
    write_file(temp_dir.path(), "src/index.js", source)?;
    Ok(temp_dir)
}
