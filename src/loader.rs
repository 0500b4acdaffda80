//! Flat-text loaders for the fact universe and the rule base.
//!
//! Facts are `id;name` per line, rules are `conditions:consequences` with
//! comma-separated fact ids on each side. Every line is a record: malformed,
//! blank and undecodable lines are reported and skipped. A leading byte
//! order mark is ignored. An unreadable source yields an empty result plus
//! one report.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{LoadError, RecordKind};
use crate::fact::Fact;
use crate::rule::Rule;
use crate::rule_base::RuleBase;
use crate::universe::FactUniverse;

const BOM: &str = "\u{feff}";

/// A loaded value together with the problems found while loading it.
#[derive(Debug)]
pub struct Loaded<T> {
    /// Whatever survived loading.
    pub value: T,
    /// Reported problems, in source order.
    pub diagnostics: Vec<LoadError>,
}

impl<T> Loaded<T> {
    /// True if loading reported nothing.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parses fact records from text.
#[must_use]
pub fn parse_facts(text: &str, source_name: &str) -> Loaded<FactUniverse> {
    facts_from_lines(text_lines(text), source_name)
}

/// Parses rule records from text, resolving ids against `universe`.
#[must_use]
pub fn parse_rules(text: &str, source_name: &str, universe: &FactUniverse) -> Loaded<RuleBase> {
    rules_from_lines(text_lines(text), source_name, universe)
}

/// Reads fact records from any reader.
///
/// Lines that are not valid UTF-8 are reported and skipped.
pub fn read_facts<R: Read>(mut reader: R, source_name: &str) -> Loaded<FactUniverse> {
    match read_all(&mut reader, source_name) {
        Ok(bytes) => facts_from_lines(byte_lines(&bytes), source_name),
        Err(err) => Loaded {
            value: FactUniverse::new(),
            diagnostics: vec![err],
        },
    }
}

/// Reads rule records from any reader.
///
/// Lines that are not valid UTF-8 are reported and skipped.
pub fn read_rules<R: Read>(mut reader: R, source_name: &str, universe: &FactUniverse) -> Loaded<RuleBase> {
    match read_all(&mut reader, source_name) {
        Ok(bytes) => rules_from_lines(byte_lines(&bytes), source_name, universe),
        Err(err) => Loaded {
            value: RuleBase::default(),
            diagnostics: vec![err],
        },
    }
}

/// Loads the fact universe from a file.
pub fn load_facts(path: impl AsRef<Path>) -> Loaded<FactUniverse> {
    let path = path.as_ref();
    match std::fs::File::open(path) {
        Ok(file) => read_facts(file, &path.display().to_string()),
        Err(source) => Loaded {
            value: FactUniverse::new(),
            diagnostics: vec![read_error(path, source)],
        },
    }
}

/// Loads the rule base from a file.
pub fn load_rules(path: impl AsRef<Path>, universe: &FactUniverse) -> Loaded<RuleBase> {
    let path = path.as_ref();
    match std::fs::File::open(path) {
        Ok(file) => read_rules(file, &path.display().to_string(), universe),
        Err(source) => Loaded {
            value: RuleBase::default(),
            diagnostics: vec![read_error(path, source)],
        },
    }
}

/// A source line, or the lossy rendering of one that is not valid UTF-8.
type SourceLine<'a> = Result<Cow<'a, str>, String>;

fn text_lines(text: &str) -> impl Iterator<Item = SourceLine<'_>> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    text.lines().map(|line| Ok(Cow::Borrowed(line)))
}

fn byte_lines(bytes: &[u8]) -> impl Iterator<Item = SourceLine<'_>> {
    let bytes = bytes.strip_prefix(BOM.as_bytes()).unwrap_or(bytes);
    bytes.split_inclusive(|b| *b == b'\n').map(|raw| {
        let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        std::str::from_utf8(raw)
            .map(Cow::Borrowed)
            .map_err(|_| String::from_utf8_lossy(raw).into_owned())
    })
}

fn facts_from_lines<'a>(
    lines: impl Iterator<Item = SourceLine<'a>>,
    source_name: &str,
) -> Loaded<FactUniverse> {
    let mut universe = FactUniverse::new();
    let mut diagnostics = Vec::new();

    for (idx, line) in lines.enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(lossy) => {
                diagnostics.push(format_error(source_name, idx + 1, RecordKind::Fact, &lossy));
                continue;
            }
        };
        let parts: Vec<&str> = line.split(';').collect();
        let [id, name] = parts.as_slice() else {
            diagnostics.push(format_error(source_name, idx + 1, RecordKind::Fact, &line));
            continue;
        };
        let id = id.trim();
        if id.is_empty() {
            diagnostics.push(format_error(source_name, idx + 1, RecordKind::Fact, &line));
            continue;
        }
        if !universe.insert(Fact::new(id, name.trim())) {
            let err = LoadError::DuplicateFact {
                source_name: source_name.to_string(),
                line: idx + 1,
                id: id.to_string(),
            };
            warn!(error = %err, "skipping fact");
            diagnostics.push(err);
        }
    }

    info!(source = source_name, facts = universe.len(), skipped = diagnostics.len(), "facts loaded");
    Loaded {
        value: universe,
        diagnostics,
    }
}

fn rules_from_lines<'a>(
    lines: impl Iterator<Item = SourceLine<'a>>,
    source_name: &str,
    universe: &FactUniverse,
) -> Loaded<RuleBase> {
    let mut rules = Vec::new();
    let mut diagnostics = Vec::new();

    for (idx, line) in lines.enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(lossy) => {
                diagnostics.push(format_error(source_name, idx + 1, RecordKind::Rule, &lossy));
                continue;
            }
        };
        let parts: Vec<&str> = line.split(':').collect();
        let [conditions, consequences] = parts.as_slice() else {
            diagnostics.push(format_error(source_name, idx + 1, RecordKind::Rule, &line));
            continue;
        };
        let rule = Rule::new(
            resolve_ids(conditions, universe),
            resolve_ids(consequences, universe),
        );
        debug!(line = idx + 1, rule = %rule, "rule parsed");
        rules.push(rule);
    }

    info!(source = source_name, rules = rules.len(), skipped = diagnostics.len(), "rules loaded");
    Loaded {
        value: RuleBase::new(rules),
        diagnostics,
    }
}

fn resolve_ids(list: &str, universe: &FactUniverse) -> Vec<Fact> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| universe.resolve(id))
        .collect()
}

fn read_all<R: Read>(reader: &mut R, source_name: &str) -> Result<Vec<u8>, LoadError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| read_error(Path::new(source_name), source))?;
    Ok(bytes)
}

fn read_error(path: &Path, source: std::io::Error) -> LoadError {
    let err = LoadError::Read {
        path: path.to_path_buf(),
        source,
    };
    warn!(error = %err, "source unreadable, loading nothing from it");
    err
}

fn format_error(source_name: &str, line: usize, kind: RecordKind, text: &str) -> LoadError {
    let err = LoadError::Format {
        source_name: source_name.to_string(),
        line,
        kind,
        text: text.to_string(),
    };
    warn!(error = %err, "skipping line");
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fact_lines_and_trims() {
        let loaded = parse_facts("A; raining\n B ;cold \n", "facts");
        assert!(loaded.is_clean());
        let u = loaded.value;
        assert_eq!(u.len(), 2);
        assert_eq!(u.get("B").map(Fact::name), Some("cold"));
    }

    #[test]
    fn malformed_fact_line_is_reported_and_skipped() {
        let loaded = parse_facts("A;raining\nbroken line\nB;cold\nC;x;y\n", "facts");
        assert_eq!(loaded.value.len(), 2);
        assert_eq!(loaded.diagnostics.len(), 2);
        assert!(loaded.diagnostics.iter().all(LoadError::is_format));
        let LoadError::Format { line, .. } = &loaded.diagnostics[0] else {
            panic!("expected format error");
        };
        assert_eq!(*line, 2);
    }

    #[test]
    fn blank_lines_are_reported() {
        let loaded = parse_facts("A;x\n\nB;y\n   \n", "facts");
        assert_eq!(loaded.value.len(), 2);
        let lines: Vec<usize> = loaded
            .diagnostics
            .iter()
            .map(|d| match d {
                LoadError::Format { line, .. } => *line,
                other => panic!("expected format error, got {other:?}"),
            })
            .collect();
        assert_eq!(lines, vec![2, 4]);

        let rules = parse_rules("A:B\n\nB:C\n", "rules", &FactUniverse::new());
        assert_eq!(rules.value.len(), 2);
        assert_eq!(rules.diagnostics.len(), 1);
        assert!(rules.diagnostics[0].is_format());
    }

    #[test]
    fn empty_fact_id_is_reported() {
        let loaded = parse_facts(";nameless\nA;raining\n", "facts");
        assert_eq!(loaded.value.len(), 1);
        assert!(!loaded.value.contains(""));
        assert!(matches!(loaded.diagnostics[..], [LoadError::Format { line: 1, .. }]));
    }

    #[test]
    fn leading_bom_is_ignored() {
        let loaded = read_facts("\u{feff}A;raining\nB;cold\n".as_bytes(), "facts");
        assert!(loaded.is_clean());
        assert!(loaded.value.contains("A"));
        assert_eq!(loaded.value.iter().next().map(Fact::id), Some("A"));

        let universe = parse_facts("\u{feff}A;raining\n", "facts").value;
        assert!(universe.contains("A"));
        let rules = parse_rules("\u{feff}A:B\n", "rules", &universe);
        assert_eq!(rules.value[0].conditions()[0].name(), "raining");
    }

    #[test]
    fn duplicate_fact_is_reported() {
        let loaded = parse_facts("A;first\nA;second\n", "facts");
        assert_eq!(loaded.value.get("A").map(Fact::name), Some("first"));
        assert!(matches!(loaded.diagnostics[0], LoadError::DuplicateFact { line: 2, .. }));
    }

    #[test]
    fn rule_ids_resolve_against_universe() {
        let universe = parse_facts("A;raining\nB;cold\n", "facts").value;
        let loaded = parse_rules("A, B : C\n", "rules", &universe);
        assert!(loaded.is_clean());
        let rule = &loaded.value[0];
        assert_eq!(rule.conditions()[0].name(), "raining");
        assert_eq!(rule.conditions()[1].name(), "cold");
        assert_eq!(rule.consequences()[0].id(), "C");
        assert_eq!(rule.consequences()[0].name(), "");
    }

    #[test]
    fn malformed_rule_lines_are_skipped() {
        let universe = FactUniverse::new();
        let loaded = parse_rules("A:B\nno separator\nA:B:C\nB:D\n", "rules", &universe);
        assert_eq!(loaded.value.len(), 2);
        assert_eq!(loaded.diagnostics.len(), 2);
    }

    #[test]
    fn empty_ids_are_dropped() {
        let loaded = parse_rules("A,,B,:C\n", "rules", &FactUniverse::new());
        assert_eq!(loaded.value[0].conditions().len(), 2);
    }

    #[test]
    fn unreadable_file_yields_empty() {
        let loaded = load_facts("/nonexistent/facts.txt");
        assert!(loaded.value.is_empty());
        assert_eq!(loaded.diagnostics.len(), 1);
        assert!(loaded.diagnostics[0].is_read());

        let rules = load_rules("/nonexistent/rules.txt", &loaded.value);
        assert!(rules.value.is_empty());
        assert!(rules.diagnostics[0].is_read());
    }

    #[test]
    fn invalid_utf8_line_is_skipped_alone() {
        let bytes: &[u8] = b"A;raining\nB;cold\nC;\xff\r\nD;warm\n";
        let loaded = read_facts(bytes, "bytes");
        assert_eq!(loaded.value.len(), 3);
        assert!(loaded.value.contains("A") && loaded.value.contains("B") && loaded.value.contains("D"));
        assert!(!loaded.value.contains("C"));
        let [LoadError::Format { line, kind, .. }] = &loaded.diagnostics[..] else {
            panic!("expected one format error, got {:?}", loaded.diagnostics);
        };
        assert_eq!(*line, 3);
        assert_eq!(*kind, RecordKind::Fact);

        let rules = read_rules(&b"A:B\n\xfe:C\n"[..], "bytes", &loaded.value);
        assert_eq!(rules.value.len(), 1);
        assert!(rules.diagnostics[0].is_format());
    }

    #[test]
    fn failing_reader_is_read_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("device gone"))
            }
        }
        let loaded = read_facts(Broken, "broken");
        assert!(loaded.value.is_empty());
        assert!(loaded.diagnostics[0].is_read());
    }
}
