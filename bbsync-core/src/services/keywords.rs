//! Keyword rules for direction inference
//!
//! The bank feed does not always say which way money moved. As a fallback the
//! classifier looks for Portuguese keywords in the line's text. The lists are
//! plain configuration: they can be replaced from settings.json without
//! touching the classification algorithm.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::Direction;

const DEFAULT_DEBIT_KEYWORDS: &[&str] = &[
    "pagamento",
    "pagto",
    "pgto",
    "saque",
    "compra",
    "tarifa",
    "transferencia enviada",
    "pix enviado",
    "ted enviada",
    "doc enviado",
    "debito",
    "juros",
    "iof",
];

const DEFAULT_CREDIT_KEYWORDS: &[&str] = &[
    "deposito",
    "transferencia recebida",
    "pix recebido",
    "ted recebida",
    "doc recebido",
    "salario",
    "credito",
    "rendimento",
    "estorno",
];

/// Keyword lists, one per direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRules {
    #[serde(default)]
    pub debit: Vec<String>,
    #[serde(default)]
    pub credit: Vec<String>,
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self {
            debit: DEFAULT_DEBIT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            credit: DEFAULT_CREDIT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Compiled form of `KeywordRules`
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    debit: Option<Regex>,
    credit: Option<Regex>,
}

impl KeywordMatcher {
    pub fn new(rules: &KeywordRules) -> Result<Self> {
        Ok(Self {
            debit: compile(&rules.debit)?,
            credit: compile(&rules.credit)?,
        })
    }

    /// Direction suggested by the text, debit keywords first
    pub fn classify(&self, text: &str) -> Option<Direction> {
        let text = normalize_text(text);
        if self.debit.as_ref().map(|re| re.is_match(&text)).unwrap_or(false) {
            return Some(Direction::Debit);
        }
        if self.credit.as_ref().map(|re| re.is_match(&text)).unwrap_or(false) {
            return Some(Direction::Credit);
        }
        None
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        // The built-in lists are plain words; escaping makes them always valid
        Self::new(&KeywordRules::default()).unwrap_or(Self {
            debit: None,
            credit: None,
        })
    }
}

fn compile(keywords: &[String]) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| normalize_text(k))
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(&k))
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| Error::Config(format!("invalid keyword rules: {}", e)))
}

/// Lowercase, strip accents and collapse punctuation to single spaces
///
/// "Pix - Enviado" and "PIX ENVIADO" both become "pix enviado".
pub fn normalize_text(text: &str) -> String {
    let folded: String = text.chars().flat_map(char::to_lowercase).map(fold_accent).collect();
    folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
