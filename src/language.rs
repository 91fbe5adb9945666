// src/language.rs

use std::path::Path;

/// Tag for content with NUL bytes that no rule recognised
pub const BINARY: &str = "binary";
/// Tag for text content that no rule recognised
pub const UNDEFINED: &str = "undefined";

/// How far into a blob to look for a NUL byte, same window git uses
const BINARY_SNIFF_LEN: usize = 8000;

/// Detects the language of a file from its name, falling back to the shebang
/// line of extension-less scripts. Returns [`BINARY`] or [`UNDEFINED`] when
/// nothing matches.
pub fn detect_language(path: &str, content: &[u8]) -> String {
    let detected = by_file_name(path)
        .or_else(|| by_extension(path))
        .or_else(|| by_shebang(content));

    match detected {
        Some(language) => language.to_string(),
        None if is_binary(content) => BINARY.to_string(),
        None => UNDEFINED.to_string(),
    }
}

pub fn is_binary(content: &[u8]) -> bool {
    content.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}

fn by_file_name(path: &str) -> Option<&'static str> {
    let name = Path::new(path).file_name()?.to_str()?;
    match name {
        "Makefile" | "makefile" | "GNUmakefile" => Some("Makefile"),
        "Dockerfile" => Some("Dockerfile"),
        "CMakeLists.txt" => Some("CMake"),
        "Cargo.lock" | "Pipfile" => Some("TOML"),
        "Gemfile" | "Rakefile" => Some("Ruby"),
        _ => None,
    }
}

fn by_extension(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?.to_lowercase();

    let language = match extension.as_str() {
        "py" | "pyi" | "pyw" => "Python",
        "rs" => "Rust",
        "go" => "Go",
        "js" | "jsx" | "mjs" | "cjs" => "JavaScript",
        "ts" | "mts" | "cts" => "TypeScript",
        "tsx" => "TSX",
        "java" => "Java",
        "c" => "C",
        "h" => "C",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => "C++",
        "cs" => "C#",
        "kt" | "kts" => "Kotlin",
        "scala" => "Scala",
        "swift" => "Swift",
        "rb" => "Ruby",
        "php" => "PHP",
        "sh" | "bash" | "zsh" => "Shell",
        "pl" | "pm" => "Perl",
        "lua" => "Lua",
        "r" => "R",
        "jl" => "Julia",
        "hs" => "Haskell",
        "ml" | "mli" => "OCaml",
        "ex" | "exs" => "Elixir",
        "erl" => "Erlang",
        "clj" | "cljs" => "Clojure",
        "dart" => "Dart",
        "sql" => "SQL",
        "html" | "htm" => "HTML",
        "css" => "CSS",
        "scss" => "SCSS",
        "md" | "markdown" => "Markdown",
        "rst" => "reStructuredText",
        "json" => "JSON",
        "yml" | "yaml" => "YAML",
        "toml" => "TOML",
        "xml" => "XML",
        "ini" | "cfg" => "INI",
        "txt" => "Text",
        "ipynb" => "Jupyter Notebook",
        _ => return None,
    };
    Some(language)
}

fn by_shebang(content: &[u8]) -> Option<&'static str> {
    let first_line = content.split(|&b| b == b'\n').next()?;
    let first_line = std::str::from_utf8(first_line).ok()?;
    let interpreter_line = first_line.strip_prefix("#!")?;

    // "#!/usr/bin/env python3" and "#!/bin/bash" both name the interpreter last
    let mut words = interpreter_line.split_whitespace();
    let mut interpreter = words.next()?.rsplit('/').next()?;
    if interpreter == "env" {
        interpreter = words.next()?;
    }

    let interpreter = interpreter.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    match interpreter {
        "python" => Some("Python"),
        "sh" | "bash" | "zsh" | "dash" => Some("Shell"),
        "node" => Some("JavaScript"),
        "ruby" => Some("Ruby"),
        "perl" => Some("Perl"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension() {
        assert_eq!(detect_language("src/main.rs", b"fn main() {}"), "Rust");
        assert_eq!(detect_language("pkg/module.py", b"x = 1"), "Python");
        assert_eq!(detect_language("web/App.tsx", b""), "TSX");
        assert_eq!(detect_language("lib/util.hpp", b""), "C++");
        assert_eq!(detect_language("README.md", b"# hi"), "Markdown");
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(detect_language("MAIN.GO", b"package main"), "Go");
    }

    #[test]
    fn detects_by_file_name() {
        assert_eq!(detect_language("build/Makefile", b"all:"), "Makefile");
        assert_eq!(detect_language("Dockerfile", b"FROM scratch"), "Dockerfile");
    }

    #[test]
    fn detects_by_shebang() {
        assert_eq!(detect_language("bin/run", b"#!/usr/bin/env python3\nprint(1)"), "Python");
        assert_eq!(detect_language("scripts/setup", b"#!/bin/bash\necho hi"), "Shell");
        assert_eq!(detect_language("tool", b"#!/usr/bin/env node\n"), "JavaScript");
    }

    #[test]
    fn falls_back_to_sentinels() {
        assert_eq!(detect_language("blob.dat", &[0x89, 0x00, 0x12]), BINARY);
        assert_eq!(detect_language("LICENSE", b"Permission is hereby granted"), UNDEFINED);
    }
}
