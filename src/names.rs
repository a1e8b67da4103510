use std::collections::{HashMap, HashSet};

/// Words a generated identifier must never take: Python keywords, the builtins
/// a MicroPython program commonly reaches for, and the names the rover runtime
/// pulls into the global namespace.
const RESERVED_WORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield", "abs", "all", "any", "bin", "bool", "bytearray", "bytes",
    "callable", "chr", "dict", "dir", "divmod", "enumerate", "eval", "exec", "filter", "float",
    "format", "getattr", "globals", "hasattr", "hash", "help", "hex", "id", "input", "int",
    "isinstance", "iter", "len", "list", "locals", "map", "max", "min", "next", "object", "oct",
    "open", "ord", "pow", "print", "range", "repr", "reversed", "round", "set", "setattr",
    "slice", "sorted", "str", "sum", "super", "tuple", "type", "zip", "math", "random", "time",
    "gc", "machine", "neopixel", "rover", "hex_to_rgb", "stop_all",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Variable,
    DeveloperVariable,
    Procedure,
}

/// Issues Python identifiers for one generation pass.
///
/// Names are unique across kinds, so a helper function never shadows a user
/// variable and vice versa.
#[derive(Debug, Clone)]
pub struct NameDb {
    reserved: HashSet<String>,
    taken: HashSet<String>,
    by_kind: HashMap<NameKind, HashMap<String, String>>,
}

impl Default for NameDb {
    fn default() -> Self {
        Self::new()
    }
}

impl NameDb {
    pub fn new() -> Self {
        Self {
            reserved: RESERVED_WORDS.iter().map(|w| w.to_string()).collect(),
            taken: HashSet::new(),
            by_kind: HashMap::new(),
        }
    }

    pub fn reserve(&mut self, word: &str) {
        self.reserved.insert(word.to_string());
    }

    /// Stable mapping from a user-facing name to its identifier. Lookups are
    /// case-insensitive, matching how the editor treats variable names.
    pub fn get_name(&mut self, name: &str, kind: NameKind) -> String {
        let normalized = name.to_lowercase();
        if let Some(existing) = self
            .by_kind
            .get(&kind)
            .and_then(|names| names.get(&normalized))
        {
            return existing.clone();
        }
        let safe = self.get_distinct_name(name, kind);
        self.by_kind
            .entry(kind)
            .or_default()
            .insert(normalized, safe.clone());
        safe
    }

    /// A fresh identifier based on `name`, suffixed with `2`, `3`, ... until it
    /// collides with nothing issued or reserved.
    pub fn get_distinct_name(&mut self, name: &str, _kind: NameKind) -> String {
        let base = safe_name(name);
        let mut candidate = base.clone();
        let mut suffix = 1usize;
        while self.taken.contains(&candidate) || self.reserved.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}{}", base, suffix);
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

const URI_SAFE_PUNCTUATION: &str = ";,/?:@&=+$-.!~*'()#";

/// Turn arbitrary editor text into a Python identifier.
///
/// Spaces become underscores. Characters a URI may carry as-is (`-`, `.`, `/`
/// and friends) become an underscore too; everything else is spelled out as
/// its UTF-8 bytes (`%` -> `_25`, `ữ` -> `_E1_BB_AF`). A leading digit gets a
/// `my_` prefix.
pub fn safe_name(name: &str) -> String {
    if name.is_empty() {
        return "unnamed".to_string();
    }
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if c == ' ' || URI_SAFE_PUNCTUATION.contains(c) {
            out.push('_');
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("_{:02X}", byte));
            }
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "my_");
    }
    out
}
