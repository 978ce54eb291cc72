//! Line-level source maps for rendered bundles

use oxc_sourcemap::SourceMapBuilder;

/// Records, for each generated line, the source line it came from
///
/// # Examples
///
/// ```
/// use assetpipe::pipeline::sourcemap::LineMap;
///
/// let mut map = LineMap::new("app.bundle.js");
/// let source = map.add_source("assetpipe:///src/app.js", "run();\n");
/// map.add_line(None);
/// map.add_line(Some((source, 0)));
/// assert_eq!(map.line_count(), 2);
/// assert!(map.into_json().contains(";AAAA"));
/// ```
pub struct LineMap {
    builder: SourceMapBuilder,
    lines: u32,
}

impl LineMap {
    /// Map for the generated file `file`
    pub fn new(file: &str) -> Self {
        let mut builder = SourceMapBuilder::default();
        builder.set_file(file);
        Self { builder, lines: 0 }
    }

    /// Register a source with its content and return its index
    pub fn add_source(&mut self, name: &str, content: &str) -> u32 {
        self.builder.add_source_and_content(name, content)
    }

    /// Record the next generated line, mapped to `(source, line)` or unmapped
    pub fn add_line(&mut self, origin: Option<(u32, u32)>) {
        if let Some((source, line)) = origin {
            self.builder
                .add_token(self.lines, 0, line, 0, Some(source), None);
        }
        self.lines += 1;
    }

    /// Number of generated lines recorded
    pub fn line_count(&self) -> usize {
        self.lines as usize
    }

    /// Version 3 JSON
    pub fn into_json(self) -> String {
        self.builder.into_sourcemap().to_json_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mappings(json: &str) -> String {
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        value["mappings"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_mappings_are_relative_and_skip_unmapped_lines() {
        let mut map = LineMap::new("app.bundle.js");
        let a = map.add_source("a.js", "x\ny\n");
        let b = map.add_source("b.js", "z\n");
        map.add_line(None);
        map.add_line(Some((a, 0)));
        map.add_line(Some((a, 1)));
        map.add_line(None);
        map.add_line(Some((b, 0)));
        assert_eq!(map.line_count(), 5);
        assert_eq!(mappings(&map.into_json()), ";AAAA;AACA;;ACDA");
    }

    #[test]
    fn test_json_shape() {
        let mut map = LineMap::new("app.bundle.js");
        let a = map.add_source("assetpipe:///src/a.js", "a();");
        map.add_line(Some((a, 0)));
        let value: serde_json::Value = serde_json::from_str(&map.into_json()).unwrap();
        assert_eq!(value["version"], 3);
        assert_eq!(value["file"], "app.bundle.js");
        assert_eq!(value["sources"][0], "assetpipe:///src/a.js");
        assert_eq!(value["sourcesContent"][0], "a();");
        assert_eq!(value["mappings"], "AAAA");
    }
}
