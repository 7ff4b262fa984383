use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::error::{Error, Result};

const BUILTIN_LABELS: &str = include_str!("../../static/labels.csv");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Marathi];

    /// Display name; this is also what goes into the translation prompt.
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Marathi => "Marathi",
        }
    }

    pub fn needs_translation(self) -> bool {
        self != Language::English
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("unsupported language: {}", s)))
    }
}

/// Static label table for the dashboard chrome. English labels are the keys.
#[derive(Debug, Clone, Default)]
pub struct UiLabels {
    table: HashMap<String, HashMap<Language, String>>,
}

impl UiLabels {
    pub fn builtin() -> Result<Self> {
        Self::from_csv(BUILTIN_LABELS.as_bytes())
    }

    /// Expects a `label` column followed by one column per language name.
    pub fn from_csv<R: Read>(source: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| Error::Config(format!("invalid label table: {}", e)))?
            .clone();

        let columns: Vec<(usize, Language)> = headers
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, h)| h.parse::<Language>().ok().map(|lang| (i, lang)))
            .collect();

        let mut table = HashMap::new();
        for result in reader.records() {
            let record =
                result.map_err(|e| Error::Config(format!("invalid label table: {}", e)))?;
            let Some(label) = record.get(0) else {
                continue;
            };

            let translations: HashMap<Language, String> = columns
                .iter()
                .filter_map(|&(i, lang)| {
                    record
                        .get(i)
                        .filter(|t| !t.is_empty())
                        .map(|t| (lang, t.to_string()))
                })
                .collect();
            table.insert(label.to_string(), translations);
        }

        Ok(Self { table })
    }

    /// Unknown labels and missing translations fall back to English.
    pub fn get<'a>(&'a self, label: &'a str, language: Language) -> &'a str {
        self.table
            .get(label)
            .and_then(|t| t.get(&language))
            .map(String::as_str)
            .unwrap_or(label)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
