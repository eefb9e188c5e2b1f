// src/language.rs
//! Language registry: which definition owns a filename, and how that
//! language writes comments.
//!
//! The registry is built once at startup (builtins, then an optional JSON
//! definition file layered on top) and is read-only afterwards, so it can
//! be shared freely across worker threads.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Static ruleset describing how to recognize one language and parse its
/// comments.
#[derive(Debug, Clone)]
pub struct LanguageDefinition {
    pub name: String,
    /// Lowercase extension suffixes without the leading dot. Compound
    /// suffixes ("blade.php") are matched longest-first.
    pub extensions: Vec<String>,
    /// Exact filenames for extensionless conventions, lowercase.
    pub filenames: Vec<String>,
    /// Single-line comment markers, first match left-to-right wins.
    pub line_markers: Vec<String>,
    /// Block comment (start, end) delimiter pairs, in priority order.
    pub block_pairs: Vec<(String, String)>,
    /// Whether block comments nest; when false the first end marker closes.
    pub nested: bool,
    /// String-literal delimiters used to suppress comment-like substrings.
    pub quotes: Vec<char>,
    /// Pure-data format: comment detection is skipped, every non-blank
    /// line counts as content.
    pub nocode: bool,
}

impl LanguageDefinition {
    pub fn new(name: &str, extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
            filenames: Vec::new(),
            line_markers: Vec::new(),
            block_pairs: Vec::new(),
            nested: false,
            quotes: Vec::new(),
            nocode: false,
        }
    }

    pub fn filenames(mut self, names: &[&str]) -> Self {
        self.filenames = names.iter().map(|n| n.to_lowercase()).collect();
        self
    }

    pub fn line_markers(mut self, markers: &[&str]) -> Self {
        self.line_markers = markers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn block_pair(mut self, start: &str, end: &str) -> Self {
        self.block_pairs.push((start.to_string(), end.to_string()));
        self
    }

    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    pub fn quotes(mut self, quotes: &[char]) -> Self {
        self.quotes = quotes.to_vec();
        self
    }

    pub fn nocode(mut self) -> Self {
        self.nocode = true;
        self
    }
}

/// External definition shape for the JSON registry file. All fields are
/// optional; the map key becomes the language name.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LanguageSpec {
    extensions: Vec<String>,
    filenames: Vec<String>,
    line_markers: Vec<String>,
    block_pairs: Vec<(String, String)>,
    nested: bool,
    quotes: Vec<char>,
    nocode: bool,
}

impl LanguageSpec {
    fn into_definition(self, name: String) -> LanguageDefinition {
        LanguageDefinition {
            name,
            extensions: self.extensions.iter().map(|e| e.to_lowercase()).collect(),
            filenames: self.filenames.iter().map(|n| n.to_lowercase()).collect(),
            line_markers: self.line_markers,
            block_pairs: self.block_pairs,
            nested: self.nested,
            quotes: self.quotes,
            nocode: self.nocode,
        }
    }
}

/// Immutable filename/extension lookup over the loaded definitions.
#[derive(Debug)]
pub struct Registry {
    definitions: Vec<LanguageDefinition>,
    by_filename: HashMap<String, usize>,
    by_extension: HashMap<String, usize>,
}

impl Registry {
    /// Built-in table only.
    pub fn builtin() -> Self {
        Self::from_definitions(builtin_definitions())
    }

    /// Builtins plus an optional JSON definition file. A definition whose
    /// name matches a built-in replaces it; duplicate extension claims are
    /// resolved most-recently-loaded-wins. A malformed file is fatal.
    pub fn load(custom: Option<&Path>) -> Result<Self> {
        let mut definitions = builtin_definitions();
        if let Some(path) = custom {
            let text = std::fs::read_to_string(path).map_err(|e| AppError::RegistryLoad {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
            let specs: BTreeMap<String, LanguageSpec> =
                serde_json::from_str(&text).map_err(|e| AppError::RegistryLoad {
                    path: path.to_path_buf(),
                    details: e.to_string(),
                })?;
            for (name, spec) in specs {
                definitions.retain(|def| def.name != name);
                definitions.push(spec.into_definition(name));
            }
        }
        Ok(Self::from_definitions(definitions))
    }

    fn from_definitions(definitions: Vec<LanguageDefinition>) -> Self {
        let mut by_filename = HashMap::new();
        let mut by_extension = HashMap::new();
        for (idx, def) in definitions.iter().enumerate() {
            for name in &def.filenames {
                by_filename.insert(name.clone(), idx);
            }
            for ext in &def.extensions {
                by_extension.insert(ext.clone(), idx);
            }
        }
        Self {
            definitions,
            by_filename,
            by_extension,
        }
    }

    /// Match a bare filename to a definition: exact filename first, then
    /// the longest dot-suffix that any definition claims. Case-insensitive.
    pub fn resolve(&self, filename: &str) -> Option<&LanguageDefinition> {
        let lower = filename.to_lowercase();
        if let Some(&idx) = self.by_filename.get(&lower) {
            return Some(&self.definitions[idx]);
        }
        let mut rest = lower.as_str();
        while let Some(dot) = rest.find('.') {
            rest = &rest[dot + 1..];
            if let Some(&idx) = self.by_extension.get(rest) {
                return Some(&self.definitions[idx]);
            }
        }
        None
    }

    pub fn definitions(&self) -> impl Iterator<Item = &LanguageDefinition> {
        self.definitions.iter()
    }
}

fn builtin_definitions() -> Vec<LanguageDefinition> {
    let d = LanguageDefinition::new;
    vec![
        d("Python", &["py", "pyw", "pyx", "pxd", "pxi"])
            .line_markers(&["#"])
            .block_pair("\"\"\"", "\"\"\"")
            .block_pair("'''", "'''")
            .quotes(&['"', '\'']),
        d("JavaScript", &["js", "jsx", "mjs", "cjs"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"', '\'', '`']),
        d("TypeScript", &["ts", "tsx"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"', '\'', '`']),
        d("Java", &["java"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"']),
        d("C", &["c", "h"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"', '\'']),
        d("C++", &["cpp", "cc", "cxx", "hpp", "hh", "hxx"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"', '\'']),
        d("C#", &["cs"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"']),
        d("Go", &["go"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"', '`']),
        d("Rust", &["rs"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .nested()
            .quotes(&['"']),
        d("Ruby", &["rb", "rake", "gemspec"])
            .line_markers(&["#"])
            .block_pair("=begin", "=end")
            .quotes(&['"', '\'']),
        d("PHP", &["php", "phtml", "php3", "php4", "php5", "php7", "phps"])
            .line_markers(&["//", "#"])
            .block_pair("/*", "*/")
            .block_pair("<!--", "-->")
            .quotes(&['"', '\'']),
        d("Swift", &["swift"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .nested()
            .quotes(&['"']),
        d("Kotlin", &["kt", "kts"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .nested()
            .quotes(&['"']),
        d("HTML", &["html", "htm", "xhtml"])
            .block_pair("<!--", "-->")
            .quotes(&['"']),
        d("CSS", &["css"])
            .block_pair("/*", "*/")
            .quotes(&['"', '\'']),
        d("SCSS", &["scss"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"', '\'']),
        d("LESS", &["less"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"', '\'']),
        d("XML", &["xml", "svg", "xsl", "xslt", "xsd", "dtd"])
            .block_pair("<!--", "-->")
            .quotes(&['"']),
        d("JSON", &["json"]).nocode(),
        d("YAML", &["yaml", "yml"])
            .line_markers(&["#"])
            .quotes(&['"', '\'']),
        d("TOML", &["toml"])
            .line_markers(&["#"])
            .quotes(&['"', '\'']),
        d("Markdown", &["md", "markdown"]).nocode(),
        d("Shell", &["sh", "bash", "zsh", "ksh"])
            .line_markers(&["#"])
            .quotes(&['"', '\'']),
        d("PowerShell", &["ps1", "psm1", "psd1"])
            .line_markers(&["#"])
            .block_pair("<#", "#>")
            .quotes(&['"', '\'']),
        d("Batch", &["bat", "cmd"]).line_markers(&["REM", "::"]),
        d("SQL", &["sql"])
            .line_markers(&["--"])
            .block_pair("/*", "*/")
            .quotes(&['\'']),
        d("Perl", &["pl", "pm", "t"])
            .line_markers(&["#"])
            .block_pair("=pod", "=cut")
            .quotes(&['"', '\'']),
        d("Lua", &["lua"])
            .line_markers(&["--"])
            .block_pair("--[[", "]]")
            .quotes(&['"', '\'']),
        d("Haskell", &["hs", "lhs"])
            .line_markers(&["--"])
            .block_pair("{-", "-}")
            .nested()
            .quotes(&['"']),
        d("R", &["r"]).line_markers(&["#"]).quotes(&['"', '\'']),
        d("Dart", &["dart"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"', '\'']),
        d("Groovy", &["groovy", "gradle"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .quotes(&['"', '\'']),
        d("Scala", &["scala", "sc"])
            .line_markers(&["//"])
            .block_pair("/*", "*/")
            .nested()
            .quotes(&['"']),
        d("Elixir", &["ex", "exs"])
            .line_markers(&["#"])
            .quotes(&['"', '\'']),
        d("Clojure", &["clj", "cljs", "cljc", "edn"])
            .line_markers(&[";;", ";"])
            .quotes(&['"']),
        d("Makefile", &["mk"])
            .filenames(&["Makefile", "GNUmakefile"])
            .line_markers(&["#"])
            .quotes(&['"', '\'']),
        d("Dockerfile", &["dockerfile"])
            .filenames(&["Dockerfile"])
            .line_markers(&["#"])
            .quotes(&['"', '\'']),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolves_common_extensions() {
        let registry = Registry::builtin();
        assert_eq!(registry.resolve("main.rs").unwrap().name, "Rust");
        assert_eq!(registry.resolve("app.py").unwrap().name, "Python");
        assert_eq!(registry.resolve("index.html").unwrap().name, "HTML");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let registry = Registry::builtin();
        assert_eq!(registry.resolve("MAIN.RS").unwrap().name, "Rust");
        assert_eq!(registry.resolve("Query.SQL").unwrap().name, "SQL");
    }

    #[test]
    fn exact_filename_beats_extension_lookup() {
        let registry = Registry::builtin();
        assert_eq!(registry.resolve("Makefile").unwrap().name, "Makefile");
        assert_eq!(registry.resolve("Dockerfile").unwrap().name, "Dockerfile");
        assert_eq!(registry.resolve("GNUmakefile").unwrap().name, "Makefile");
    }

    #[test]
    fn unknown_files_resolve_to_none() {
        let registry = Registry::builtin();
        assert!(registry.resolve("photo.png").is_none());
        assert!(registry.resolve("LICENSE").is_none());
        assert!(registry.resolve("noextension").is_none());
    }

    #[test]
    fn python_docstrings_are_block_pairs() {
        let registry = Registry::builtin();
        let python = registry.resolve("x.py").unwrap();
        assert_eq!(python.block_pairs.len(), 2);
        assert!(!python.nested);
    }

    fn write_spec(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn custom_definitions_extend_the_table() {
        let file = write_spec(
            r#"{
                "Vala": {
                    "extensions": ["vala", "vapi"],
                    "line_markers": ["//"],
                    "block_pairs": [["/*", "*/"]],
                    "quotes": ["\""]
                }
            }"#,
        );
        let registry = Registry::load(Some(file.path())).unwrap();
        let def = registry.resolve("widget.vala").unwrap();
        assert_eq!(def.name, "Vala");
        assert_eq!(def.line_markers, vec!["//"]);
    }

    #[test]
    fn longest_suffix_wins_over_host_language() {
        let file = write_spec(
            r#"{
                "Blade": {
                    "extensions": ["blade.php"],
                    "block_pairs": [["{{--", "--}}"]]
                }
            }"#,
        );
        let registry = Registry::load(Some(file.path())).unwrap();
        assert_eq!(registry.resolve("view.blade.php").unwrap().name, "Blade");
        assert_eq!(registry.resolve("index.php").unwrap().name, "PHP");
    }

    #[test]
    fn most_recently_loaded_definition_wins_duplicate_claims() {
        let file = write_spec(
            r#"{
                "MyRust": {
                    "extensions": ["rs"],
                    "line_markers": ["//"]
                }
            }"#,
        );
        let registry = Registry::load(Some(file.path())).unwrap();
        assert_eq!(registry.resolve("main.rs").unwrap().name, "MyRust");
    }

    #[test]
    fn override_by_name_replaces_builtin() {
        let file = write_spec(
            r#"{
                "JSON": {
                    "extensions": ["json", "jsonc"],
                    "line_markers": ["//"],
                    "quotes": ["\""]
                }
            }"#,
        );
        let registry = Registry::load(Some(file.path())).unwrap();
        let def = registry.resolve("settings.jsonc").unwrap();
        assert_eq!(def.name, "JSON");
        assert!(!def.nocode);
    }

    #[test]
    fn malformed_definition_file_is_fatal() {
        let file = write_spec("{ not json ");
        let err = Registry::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, AppError::RegistryLoad { .. }));
    }

    #[test]
    fn missing_definition_file_is_fatal() {
        let err = Registry::load(Some(Path::new("/no/such/languages.json"))).unwrap_err();
        assert!(matches!(err, AppError::RegistryLoad { .. }));
    }
}
