//! Linear word stream over the document model.
//!
//! Every whitespace-delimited token gets an address: the paragraph, run and
//! position that produced it, the page it falls on (manual page breaks only)
//! and, for words inside tables, the table/row/cell it came from.

use crate::model::{DocumentModel, Paragraph, Run};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableContext {
    pub table_index: usize,
    pub row_index: usize,
    pub cell_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordLocation {
    pub word: String,
    pub paragraph_index: usize,
    pub run_index: usize,
    pub word_index: usize,
    pub page_number: usize,
    pub table_context: Option<TableContext>,
}

impl WordLocation {
    pub fn in_table(&self) -> bool {
        self.table_context.is_some()
    }
}

impl fmt::Display for WordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table_context {
            Some(table) => write!(
                f,
                "Page {}, Table {}, Cell ({},{}), Word {}: '{}'",
                self.page_number,
                table.table_index + 1,
                table.row_index + 1,
                table.cell_index + 1,
                self.word_index + 1,
                self.word
            ),
            None => write!(
                f,
                "Page {}, Paragraph {}, Run {}, Word {}: '{}'",
                self.page_number,
                self.paragraph_index + 1,
                self.run_index + 1,
                self.word_index + 1,
                self.word
            ),
        }
    }
}

/// A manual page break and the page number it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageBreak {
    pub paragraph_index: usize,
    pub run_index: usize,
    pub page_number: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordIndex {
    words: Vec<WordLocation>,
    page_breaks: Vec<PageBreak>,
}

impl WordIndex {
    /// Single pass: body paragraphs first, then tables in row/cell order.
    ///
    /// Table words carry the page that is current when table traversal
    /// starts; only body paragraphs advance the page counter.
    pub fn build(model: &DocumentModel) -> Self {
        let mut index = Self::default();
        let mut current_page = 1;

        for (paragraph_index, paragraph) in model.paragraphs.iter().enumerate() {
            for (run_index, run) in paragraph.runs.iter().enumerate() {
                let pages_before = current_page;
                for (word_index, (word, offset)) in split_words(&run.text).into_iter().enumerate() {
                    let breaks_before = run.page_breaks.iter().filter(|&&at| at <= offset).count();
                    index.words.push(WordLocation {
                        word: word.to_string(),
                        paragraph_index,
                        run_index,
                        word_index,
                        page_number: pages_before + breaks_before,
                        table_context: None,
                    });
                }

                for _ in &run.page_breaks {
                    current_page += 1;
                    index.page_breaks.push(PageBreak {
                        paragraph_index,
                        run_index,
                        page_number: current_page,
                    });
                }
            }
        }

        let table_page = current_page;
        for (table_index, table) in model.tables.iter().enumerate() {
            for (row_index, row) in table.rows.iter().enumerate() {
                for (cell_index, cell) in row.cells.iter().enumerate() {
                    let context = TableContext {
                        table_index,
                        row_index,
                        cell_index,
                    };
                    for (paragraph_index, paragraph) in cell.paragraphs.iter().enumerate() {
                        index.push_paragraph_words(paragraph, paragraph_index, table_page, context);
                    }
                }
            }
        }

        log::debug!(
            "Indexed {} words across {} pages",
            index.words.len(),
            index.page_count()
        );

        index
    }

    fn push_paragraph_words(
        &mut self,
        paragraph: &Paragraph,
        paragraph_index: usize,
        page_number: usize,
        context: TableContext,
    ) {
        for (run_index, run) in paragraph.runs.iter().enumerate() {
            for (word_index, (word, _)) in split_words(&run.text).into_iter().enumerate() {
                self.words.push(WordLocation {
                    word: word.to_string(),
                    paragraph_index,
                    run_index,
                    word_index,
                    page_number,
                    table_context: Some(context),
                });
            }
        }
    }

    pub fn words(&self) -> &[WordLocation] {
        &self.words
    }

    pub fn page_breaks(&self) -> &[PageBreak] {
        &self.page_breaks
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Page 1 is implicit; every manual break adds one
    pub fn page_count(&self) -> usize {
        1 + self.page_breaks.len()
    }

    pub fn body_words(&self) -> impl Iterator<Item = &WordLocation> {
        self.words.iter().filter(|word| !word.in_table())
    }

    pub fn table_words(&self) -> impl Iterator<Item = &WordLocation> {
        self.words.iter().filter(|word| word.in_table())
    }

    /// The run a word was taken from
    pub fn run_for<'m>(&self, model: &'m DocumentModel, location: &WordLocation) -> Option<&'m Run> {
        let paragraph = match location.table_context {
            Some(table) => model
                .tables
                .get(table.table_index)?
                .rows
                .get(table.row_index)?
                .cells
                .get(table.cell_index)?
                .paragraphs
                .get(location.paragraph_index)?,
            None => model.paragraphs.get(location.paragraph_index)?,
        };
        paragraph.runs.get(location.run_index)
    }
}

/// Whitespace tokens of a run together with their byte offsets.
fn split_words(text: &str) -> Vec<(&str, usize)> {
    let base = text.as_ptr() as usize;
    text.split_whitespace()
        .map(|word| (word, word.as_ptr() as usize - base))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Table, TableCell, TableRow};

    fn run(text: &str) -> Run {
        Run {
            text: text.to_string(),
            ..Default::default()
        }
    }

    fn paragraph(runs: Vec<Run>) -> Paragraph {
        Paragraph {
            style_name: None,
            runs,
        }
    }

    #[test]
    fn test_split_words_offsets() {
        assert_eq!(
            split_words("  alpha\tbeta  gamma "),
            vec![("alpha", 2), ("beta", 8), ("gamma", 14)]
        );
        assert!(split_words("   ").is_empty());
    }

    #[test]
    fn test_traversal_order_and_addresses() {
        let model = DocumentModel {
            paragraphs: vec![
                paragraph(vec![run("one two"), run(" "), run("three")]),
                paragraph(vec![run("four")]),
            ],
            tables: vec![Table {
                rows: vec![TableRow {
                    cells: vec![
                        TableCell {
                            paragraphs: vec![paragraph(vec![run("cell a")])],
                        },
                        TableCell {
                            paragraphs: vec![paragraph(vec![run("b")])],
                        },
                    ],
                }],
            }],
            section: None,
        };

        let index = WordIndex::build(&model);
        let words: Vec<&str> = index.words().iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["one", "two", "three", "four", "cell", "a", "b"]);

        let three = &index.words()[2];
        assert_eq!((three.paragraph_index, three.run_index, three.word_index), (0, 2, 0));
        assert_eq!(index.body_words().count(), 4);
        assert_eq!(index.table_words().count(), 3);

        let b = &index.words()[6];
        assert_eq!(
            b.table_context,
            Some(TableContext {
                table_index: 0,
                row_index: 0,
                cell_index: 1
            })
        );
        assert_eq!(b.to_string(), "Page 1, Table 1, Cell (1,2), Word 1: 'b'");
        assert_eq!(
            index.words()[1].to_string(),
            "Page 1, Paragraph 1, Run 1, Word 2: 'two'"
        );
    }

    #[test]
    fn test_page_breaks_advance_pages() {
        let mut breaking = run("end start");
        breaking.page_breaks = vec![4];
        let model = DocumentModel {
            paragraphs: vec![
                paragraph(vec![run("first")]),
                paragraph(vec![breaking]),
                paragraph(vec![run("last")]),
            ],
            tables: vec![Table {
                rows: vec![TableRow {
                    cells: vec![TableCell {
                        paragraphs: vec![paragraph(vec![run("cell")])],
                    }],
                }],
            }],
            section: None,
        };

        let index = WordIndex::build(&model);
        let pages: Vec<usize> = index.words().iter().map(|w| w.page_number).collect();
        assert_eq!(pages, vec![1, 1, 2, 2, 2]);
        assert_eq!(index.page_count(), 2);
        assert_eq!(
            index.page_breaks(),
            &[PageBreak {
                paragraph_index: 1,
                run_index: 0,
                page_number: 2
            }]
        );
    }

    #[test]
    fn test_empty_model() {
        let index = WordIndex::build(&DocumentModel::default());
        assert!(index.is_empty());
        assert_eq!(index.page_count(), 1);
    }

    #[test]
    fn test_run_for_resolves_source_run() {
        let model = DocumentModel {
            paragraphs: vec![paragraph(vec![run("a"), run("b")])],
            tables: Vec::new(),
            section: None,
        };
        let index = WordIndex::build(&model);
        let run = index.run_for(&model, &index.words()[1]).unwrap();
        assert_eq!(run.text, "b");
    }
}
