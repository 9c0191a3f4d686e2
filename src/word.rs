//! Vocabulary entries and the filters applied to them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Part of speech as stored in the dataset's short-code column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Preposition,
    Conjunction,
    Numeral,
    Auxiliary,
    Pronoun,
    /// Any code not in the table above, kept verbatim.
    Other(String),
}

const POS_TABLE: &[(PartOfSpeech, &str, &str, &str)] = &[
    (PartOfSpeech::Noun, "名", "名詞", "noun"),
    (PartOfSpeech::Verb, "動", "動詞", "verb"),
    (PartOfSpeech::Adjective, "形", "形容詞", "adjective"),
    (PartOfSpeech::Adverb, "副", "副詞", "adverb"),
    (PartOfSpeech::Preposition, "前", "前置詞", "preposition"),
    (PartOfSpeech::Conjunction, "接", "接続詞", "conjunction"),
    (PartOfSpeech::Numeral, "数", "数詞", "numeral"),
    (PartOfSpeech::Auxiliary, "助", "助動詞", "auxiliary"),
    (PartOfSpeech::Pronoun, "代", "代名詞", "pronoun"),
];

impl PartOfSpeech {
    /// Parse the dataset's short code. Unknown codes become `Other`.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        POS_TABLE
            .iter()
            .find(|(_, short, _, _)| *short == code)
            .map(|(pos, _, _, _)| pos.clone())
            .unwrap_or_else(|| PartOfSpeech::Other(code.to_string()))
    }

    /// Parse a user-facing label: short code, long label (名詞) or English name.
    /// Returns `None` for "すべて"/"all", meaning no filter.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let lower = label.to_lowercase();
        if label.is_empty() || label == "すべて" || lower == "all" {
            return None;
        }
        let known = POS_TABLE.iter().find(|(_, short, long, english)| {
            *short == label || *long == label || *english == lower
        });
        Some(match known {
            Some((pos, _, _, _)) => pos.clone(),
            None => PartOfSpeech::Other(label.to_string()),
        })
    }

    pub fn code(&self) -> &str {
        match self {
            PartOfSpeech::Other(code) => code.as_str(),
            known => POS_TABLE
                .iter()
                .find(|(pos, _, _, _)| pos == known)
                .map(|(_, short, _, _)| *short)
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One row of the vocabulary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub part_of_speech: PartOfSpeech,
    pub meaning: String,
    /// 1000-1999 = grade 1, 2000-2999 = grade 2, 3000-3999 = grade 3.
    pub grade_code: u32,
}

impl WordEntry {
    pub fn new(word: &str, pos_code: &str, meaning: &str, grade_code: u32) -> Self {
        WordEntry {
            word: word.to_string(),
            part_of_speech: PartOfSpeech::from_code(pos_code),
            meaning: meaning.to_string(),
            grade_code,
        }
    }

    /// School year encoded by the grade code (1, 2, 3, ...).
    pub fn grade(&self) -> u32 {
        self.grade_code / 1000
    }
}

/// Inclusive grade-code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRange {
    pub min: u32,
    pub max: u32,
}

impl GradeRange {
    pub fn new(min: u32, max: u32) -> Self {
        GradeRange { min, max }
    }

    /// Range covering a single school year.
    pub fn grade(year: u32) -> Self {
        GradeRange::new(year * 1000, year * 1000 + 999)
    }

    /// Parse one of the grade menu presets: `all`, `1`, `2`, `3`, `1-2`.
    /// `Ok(None)` means "all grades".
    pub fn preset(name: &str) -> Result<Option<Self>, String> {
        match name.trim() {
            "" | "all" | "全学年" => Ok(None),
            "1" | "中１のみ" => Ok(Some(GradeRange::grade(1))),
            "2" | "中２のみ" => Ok(Some(GradeRange::grade(2))),
            "3" | "中３のみ" => Ok(Some(GradeRange::grade(3))),
            "1-2" | "中１～２" => Ok(Some(GradeRange::new(1000, 2999))),
            other => Err(format!("Unknown grade preset: {}", other)),
        }
    }

    pub fn contains(&self, grade_code: u32) -> bool {
        (self.min..=self.max).contains(&grade_code)
    }
}

/// Optional criteria narrowing the question pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizFilter {
    pub grade: Option<GradeRange>,
    pub part_of_speech: Option<PartOfSpeech>,
}

impl QuizFilter {
    pub fn matches(&self, entry: &WordEntry) -> bool {
        self.grade.map_or(true, |range| range.contains(entry.grade_code))
            && self
                .part_of_speech
                .as_ref()
                .map_or(true, |pos| *pos == entry.part_of_speech)
    }

    pub fn is_empty(&self) -> bool {
        self.grade.is_none() && self.part_of_speech.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_codes_and_labels_agree() {
        assert_eq!(PartOfSpeech::from_code("名"), PartOfSpeech::Noun);
        assert_eq!(PartOfSpeech::from_label("名詞"), Some(PartOfSpeech::Noun));
        assert_eq!(PartOfSpeech::from_label("Verb"), Some(PartOfSpeech::Verb));
        assert_eq!(PartOfSpeech::from_label("すべて"), None);
        assert_eq!(PartOfSpeech::Adjective.code(), "形");
        assert_eq!(PartOfSpeech::from_code("間"), PartOfSpeech::Other("間".to_string()));
        assert_eq!(PartOfSpeech::from_code("間").code(), "間");
    }

    #[test]
    fn grade_presets() {
        assert_eq!(GradeRange::preset("all"), Ok(None));
        let g1 = GradeRange::preset("1").unwrap().unwrap();
        assert!(g1.contains(1000) && g1.contains(1999) && !g1.contains(2000));
        let g12 = GradeRange::preset("1-2").unwrap().unwrap();
        assert!(g12.contains(2999) && !g12.contains(3000));
        assert!(GradeRange::preset("4").is_err());
    }

    #[test]
    fn filter_combines_grade_and_pos() {
        let dog = WordEntry::new("dog", "名", "犬", 1000);
        let run = WordEntry::new("run", "動", "走る", 2000);
        let filter = QuizFilter {
            grade: Some(GradeRange::grade(1)),
            part_of_speech: Some(PartOfSpeech::Noun),
        };
        assert!(filter.matches(&dog));
        assert!(!filter.matches(&run));
        assert!(QuizFilter::default().matches(&run));
        assert_eq!(dog.grade(), 1);
    }
}
