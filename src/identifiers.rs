// src/identifiers.rs

use crate::error::{Result, SimDevError};
use std::collections::{BTreeMap, HashMap};
use tree_sitter::{Language, Parser};

/// Node kind counted as an identifier in every supported grammar
const IDENTIFIER_KIND: &str = "identifier";

/// Languages with a bundled tree-sitter grammar, keyed by the tags
/// produced by [`crate::language::detect_language`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Go,
    Rust,
    Java,
    C,
    Cpp,
}

impl Grammar {
    pub fn from_tag(language: &str) -> Option<Self> {
        match language {
            "Python" => Some(Grammar::Python),
            "JavaScript" => Some(Grammar::JavaScript),
            "TypeScript" => Some(Grammar::TypeScript),
            "TSX" => Some(Grammar::Tsx),
            "Go" => Some(Grammar::Go),
            "Rust" => Some(Grammar::Rust),
            "Java" => Some(Grammar::Java),
            "C" => Some(Grammar::C),
            "C++" => Some(Grammar::Cpp),
            _ => None,
        }
    }

    fn language(self) -> Language {
        match self {
            Grammar::Python => tree_sitter_python::LANGUAGE.into(),
            Grammar::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Grammar::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Grammar::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Grammar::Go => tree_sitter_go::LANGUAGE.into(),
            Grammar::Rust => tree_sitter_rust::LANGUAGE.into(),
            Grammar::Java => tree_sitter_java::LANGUAGE.into(),
            Grammar::C => tree_sitter_c::LANGUAGE.into(),
            Grammar::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }
}

/// Counts identifiers in source files. Holds one parser per grammar, so
/// each worker thread owns its own extractor.
#[derive(Default)]
pub struct IdentifierExtractor {
    parsers: HashMap<Grammar, Parser>,
}

impl IdentifierExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_parse(&self, language: &str) -> bool {
        Grammar::from_tag(language).is_some()
    }

    /// Identifier -> occurrence count. Empty for unsupported languages and
    /// for sources the parser gives up on.
    pub fn extract(&mut self, language: &str, source: &[u8]) -> BTreeMap<String, u64> {
        let mut identifiers = BTreeMap::new();
        let Some(grammar) = Grammar::from_tag(language) else {
            return identifiers;
        };

        let parser = match self.parser_for(grammar) {
            Ok(parser) => parser,
            Err(e) => {
                tracing::warn!("{}", e);
                return identifiers;
            }
        };
        let Some(tree) = parser.parse(source, None) else {
            tracing::debug!(language, "Parser produced no tree");
            return identifiers;
        };

        let mut cursor = tree.walk();
        'walk: loop {
            let node = cursor.node();
            if node.kind() == IDENTIFIER_KIND {
                if let Ok(text) = node.utf8_text(source) {
                    *identifiers.entry(text.to_string()).or_insert(0) += 1;
                }
            }

            if cursor.goto_first_child() || cursor.goto_next_sibling() {
                continue;
            }
            loop {
                if !cursor.goto_parent() {
                    break 'walk;
                }
                if cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        identifiers
    }

    fn parser_for(&mut self, grammar: Grammar) -> Result<&mut Parser> {
        if !self.parsers.contains_key(&grammar) {
            let mut parser = Parser::new();
            parser.set_language(&grammar.language()).map_err(|e| SimDevError::Parser {
                language: format!("{:?}", grammar),
                message: e.to_string(),
            })?;
            self.parsers.insert(grammar, parser);
        }
        self.parsers.get_mut(&grammar).ok_or_else(|| SimDevError::Parser {
            language: format!("{:?}", grammar),
            message: "parser cache miss".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_python_identifiers() {
        let mut extractor = IdentifierExtractor::new();
        let source = b"def add(a, b):\n    total = a + b\n    return total\n";
        let identifiers = extractor.extract("Python", source);

        assert_eq!(identifiers["add"], 1);
        assert_eq!(identifiers["a"], 2);
        assert_eq!(identifiers["b"], 2);
        assert_eq!(identifiers["total"], 2);
    }

    #[test]
    fn counts_go_identifiers() {
        let mut extractor = IdentifierExtractor::new();
        let source = b"package main\n\nfunc main() {\n\tcount := 1\n\tcount++\n}\n";
        let identifiers = extractor.extract("Go", source);
        assert_eq!(identifiers.get("count"), Some(&2));
    }

    #[test]
    fn reuses_parsers_across_calls() {
        let mut extractor = IdentifierExtractor::new();
        extractor.extract("Rust", b"fn f() { let x = 1; }");
        extractor.extract("Rust", b"fn g() { let y = 2; }");
        assert_eq!(extractor.parsers.len(), 1);
    }

    #[test]
    fn unsupported_language_is_empty() {
        let mut extractor = IdentifierExtractor::new();
        assert!(!extractor.can_parse("Markdown"));
        assert!(extractor.extract("Markdown", b"# title").is_empty());
        assert!(extractor.extract("undefined", b"whatever").is_empty());
    }

    #[test]
    fn every_tag_maps_to_a_loadable_grammar() {
        let mut extractor = IdentifierExtractor::new();
        for tag in ["Python", "JavaScript", "TypeScript", "TSX", "Go", "Rust", "Java", "C", "C++"] {
            assert!(extractor.can_parse(tag));
            let grammar = Grammar::from_tag(tag).unwrap();
            assert!(extractor.parser_for(grammar).is_ok(), "{tag}");
        }
    }
}
