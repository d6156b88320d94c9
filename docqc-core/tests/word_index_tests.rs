//! Word index properties over generated documents.

mod support;

use docqc_core::LoadedDocument;
use pretty_assertions::assert_eq;
use support::*;

fn load(doc: &DocxBuilder) -> LoadedDocument {
    LoadedDocument::from_bytes(&doc.build(), "fixture.docx").unwrap()
}

fn mixed_document() -> DocxBuilder {
    DocxBuilder::new()
        .block(paragraph(&[
            run("Alpha beta", None, None),
            run("  gamma  ", None, None),
        ]))
        .block(paragraph(&[page_break()]))
        .text("delta")
        .block(table(&[
            &[run("one two", None, Some(9.0)), run("three", None, None)],
            &[run("   ", None, None), run("four", None, None)],
        ]))
        .block(paragraph(&[
            run("epsilon", None, None),
            page_break(),
            run("zeta", None, None),
        ]))
}

#[test]
fn word_count_matches_whitespace_tokens() {
    let doc = load(&mixed_document());

    let expected: usize = doc
        .model
        .paragraphs
        .iter()
        .chain(
            doc.model
                .tables
                .iter()
                .flat_map(|t| &t.rows)
                .flat_map(|r| &r.cells)
                .flat_map(|c| &c.paragraphs),
        )
        .flat_map(|p| &p.runs)
        .map(|r| r.text.split_whitespace().count())
        .sum();

    assert_eq!(doc.words.len(), expected);
    assert_eq!(doc.words.len(), 10);
}

#[test]
fn traversal_order_is_body_then_tables() {
    let doc = load(&mixed_document());
    let words: Vec<&str> = doc.words.words().iter().map(|w| w.word.as_str()).collect();
    assert_eq!(
        words,
        vec!["Alpha", "beta", "gamma", "delta", "epsilon", "zeta", "one", "two", "three", "four"]
    );
}

#[test]
fn page_numbers_start_at_one_and_never_decrease() {
    let doc = load(&mixed_document());
    let pages: Vec<usize> = doc.words.words().iter().map(|w| w.page_number).collect();

    assert_eq!(pages.first(), Some(&1));
    assert!(pages.windows(2).all(|pair| pair[0] <= pair[1]));
    // Table words take the page current once body traversal is done
    assert_eq!(pages, vec![1, 1, 1, 2, 2, 3, 3, 3, 3, 3]);
    assert_eq!(doc.words.page_count(), 3);
    assert_eq!(doc.words.page_breaks().len(), 2);
}

#[test]
fn body_and_table_words_partition_the_index() {
    let doc = load(&mixed_document());
    let body = doc.words.body_words().count();
    let table = doc.words.table_words().count();

    assert_eq!(body, 6);
    assert_eq!(table, 4);
    assert_eq!(body + table, doc.words.len());
    assert!(doc.words.body_words().all(|w| w.table_context.is_none()));
    assert!(doc.words.table_words().all(|w| w.table_context.is_some()));
}

#[test]
fn table_word_locations_point_at_their_cells() {
    let doc = load(&mixed_document());
    let four = doc
        .words
        .table_words()
        .find(|w| w.word == "four")
        .unwrap();
    let cell = four.table_context.unwrap();
    assert_eq!((cell.table_index, cell.row_index, cell.cell_index), (0, 1, 1));
    assert_eq!(four.to_string(), "Page 3, Table 1, Cell (2,2), Word 1: 'four'");

    let run = doc.words.run_for(&doc.model, four).unwrap();
    assert_eq!(run.text, "four");

    let one = doc.words.table_words().next().unwrap();
    let run = doc.words.run_for(&doc.model, one).unwrap();
    assert_eq!(run.attributes.font_size_pt, Some(9.0));
}

#[test]
fn empty_document_yields_empty_index() {
    let doc = load(&DocxBuilder::new().block("<w:p/>"));
    assert!(doc.words.is_empty());
    assert_eq!(doc.words.page_count(), 1);
}
