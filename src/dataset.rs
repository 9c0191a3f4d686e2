//! Vocabulary dataset loading (Excel and CSV)

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use log::{debug, info};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use crate::error::{QuizError, Result};
use crate::word::{PartOfSpeech, WordEntry};

/// Immutable in-memory word table, shared read-only across sessions.
#[derive(Debug, Clone)]
pub struct Dataset {
    entries: Arc<[WordEntry]>,
}

impl Dataset {
    pub fn new(entries: Vec<WordEntry>) -> Self {
        Dataset { entries: entries.into() }
    }

    /// Load a spreadsheet (`.xlsx`, `.xls`, `.ods`) or a `.csv` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(QuizError::DataUnavailable(format!(
                "dataset file not found: {}",
                path.display()
            )));
        }
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let entries = match extension.as_str() {
            "xlsx" | "xls" | "ods" => parse_excel(path)?,
            "csv" => parse_csv(path)?,
            _ => {
                return Err(QuizError::DataUnavailable(format!(
                    "unsupported file format: .{}",
                    extension
                )))
            }
        };
        info!("loaded {} words from {}", entries.len(), path.display());
        Ok(Dataset::new(entries))
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }
}

impl Deref for Dataset {
    type Target = [WordEntry];

    fn deref(&self) -> &[WordEntry] {
        &self.entries
    }
}

/// Column index mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub word: usize,
    pub part_of_speech: usize,
    pub meaning: usize,
    pub grade_code: usize,
}

/// Detect column indices from header names
fn detect_columns(headers: &[String]) -> Result<ColumnMapping> {
    let (mut word, mut pos, mut meaning, mut grade) = (None, None, None, None);

    for (i, header) in headers.iter().enumerate() {
        let slot = match header.trim().to_lowercase().as_str() {
            "語句" | "単語" | "word" | "words" => &mut word,
            "品詞" | "pos" | "part_of_speech" | "part of speech" => &mut pos,
            "意味" | "meaning" | "meanings" | "definition" => &mut meaning,
            "学年コード" | "コード" | "番号" | "grade" | "grade_code" | "code" => {
                &mut grade
            }
            _ => continue,
        };
        // First matching column wins
        slot.get_or_insert(i);
    }

    let missing = |name: &str| {
        QuizError::DataUnavailable(format!("missing required '{}' column in file header", name))
    };
    Ok(ColumnMapping {
        word: word.ok_or_else(|| missing("word"))?,
        part_of_speech: pos.ok_or_else(|| missing("part_of_speech"))?,
        meaning: meaning.ok_or_else(|| missing("meaning"))?,
        grade_code: grade.ok_or_else(|| missing("grade_code"))?,
    })
}

/// Build a row from already-stringified cells. `None` for rows without a word.
fn build_entry(
    cells: &[String],
    mapping: &ColumnMapping,
    line: usize,
) -> Result<Option<WordEntry>> {
    let cell = |i: usize| cells.get(i).map(|s| s.trim()).unwrap_or("");

    let word = cell(mapping.word);
    if word.is_empty() {
        return Ok(None);
    }
    let grade_code = parse_grade(cell(mapping.grade_code)).ok_or_else(|| {
        QuizError::DataUnavailable(format!(
            "row {}: invalid grade code '{}'",
            line,
            cell(mapping.grade_code)
        ))
    })?;

    Ok(Some(WordEntry {
        word: word.to_string(),
        part_of_speech: PartOfSpeech::from_code(cell(mapping.part_of_speech)),
        meaning: cell(mapping.meaning).to_string(),
        grade_code,
    }))
}

/// Grade codes may come through as integers or integral floats ("1001.0").
fn parse_grade(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64).then_some(f as u32)
}

/// Parse the first sheet of a workbook; the format is picked from the extension
pub fn parse_excel(path: &Path) -> Result<Vec<WordEntry>> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .ok_or_else(|| QuizError::DataUnavailable("no sheets found in Excel file".to_string()))?
        .clone();

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let header_row = rows
        .next()
        .ok_or_else(|| QuizError::DataUnavailable("empty file - no header row".to_string()))?;
    let headers: Vec<String> = header_row.iter().map(get_cell_string).collect();
    let mapping = detect_columns(&headers)?;
    debug!("excel column mapping for sheet '{}': {:?}", sheet_name, mapping);

    let mut words = Vec::new();
    for (i, row) in rows.enumerate() {
        let cells: Vec<String> = row.iter().map(get_cell_string).collect();
        if let Some(entry) = build_entry(&cells, &mapping, i + 2)? {
            words.push(entry);
        }
    }
    Ok(words)
}

/// Parse a CSV file with a header row
pub fn parse_csv(path: &Path) -> Result<Vec<WordEntry>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let mapping = detect_columns(&headers)?;
    debug!("csv column mapping: {:?}", mapping);

    let mut words = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let cells: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        if let Some(entry) = build_entry(&cells, &mapping, i + 2)? {
            words.push(entry);
        }
    }
    Ok(words)
}

/// Helper to extract string from Excel cell
fn get_cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_by_header_name() {
        let file = write_csv(concat!(
            "番号,語句,品詞,意味\n",
            "1001,dog,名,犬\n1002,cat,名,猫\n2001,run,動,走る\n,,,\n",
        ));
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset[0], WordEntry::new("dog", "名", "犬", 1001));
        assert_eq!(dataset[2].part_of_speech, PartOfSpeech::Verb);
    }

    #[test]
    fn column_order_does_not_matter() {
        let file = write_csv("meaning,grade,word,pos\n大きい,1003,big,形\n");
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset[0], WordEntry::new("big", "形", "大きい", 1003));
    }

    #[test]
    fn missing_column_is_data_unavailable() {
        let file = write_csv("word,pos,meaning\ndog,名,犬\n");
        let err = Dataset::load(file.path()).unwrap_err();
        assert!(matches!(err, QuizError::DataUnavailable(msg) if msg.contains("grade_code")));
    }

    #[test]
    fn bad_grade_is_data_unavailable() {
        let file = write_csv("word,pos,meaning,grade\ndog,名,犬,first\n");
        assert!(matches!(
            Dataset::load(file.path()),
            Err(QuizError::DataUnavailable(_))
        ));
    }

    #[test]
    fn missing_file_and_unknown_extension() {
        assert!(matches!(
            Dataset::load("/nonexistent/words.csv"),
            Err(QuizError::DataUnavailable(_))
        ));
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            Dataset::load(file.path()),
            Err(QuizError::DataUnavailable(msg)) if msg.contains(".txt")
        ));
    }

    #[test]
    fn loads_first_sheet_of_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("単語").unwrap();
        for (col, header) in ["語句", "品詞", "意味", "学年コード"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        let rows = [("dog", "名", "犬", 1001.0), ("run", "動", "走る", 2001.0)];
        for (i, (word, pos, meaning, grade)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, *word).unwrap();
            sheet.write_string(row, 1, *pos).unwrap();
            sheet.write_string(row, 2, *meaning).unwrap();
            sheet.write_number(row, 3, *grade).unwrap();
        }
        let other = workbook.add_worksheet();
        other.write_string(0, 0, "unrelated").unwrap();
        workbook.save(&path).unwrap();

        let dataset = Dataset::load(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset[0], WordEntry::new("dog", "名", "犬", 1001));
        assert_eq!(dataset[1], WordEntry::new("run", "動", "走る", 2001));
    }

    #[test]
    fn unreadable_xls_is_data_unavailable() {
        let mut file = tempfile::Builder::new().suffix(".xls").tempfile().unwrap();
        file.write_all(b"not a workbook").unwrap();
        assert!(matches!(
            Dataset::load(file.path()),
            Err(QuizError::DataUnavailable(_))
        ));
    }

    #[test]
    fn grade_accepts_integral_floats() {
        assert_eq!(parse_grade("1001"), Some(1001));
        assert_eq!(parse_grade("2001.0"), Some(2001));
        assert_eq!(parse_grade("2001.5"), None);
        assert_eq!(parse_grade(""), None);
    }

    #[test]
    fn clones_share_entries() {
        let dataset = Dataset::new(vec![WordEntry::new("dog", "名", "犬", 1000)]);
        let copy = dataset.clone();
        assert!(std::ptr::eq(dataset.entries(), copy.entries()));
    }
}
