//! Shared fixture: the reference document the acceptance vectors run
//! against. Element structure and attributes mirror the W3C-derived suite;
//! meaningful text nodes and the table comment are kept, inter-element
//! formatting whitespace is not part of the tree.

use domtree::Document;

pub fn fixture() -> Document {
    let mut doc = Document::new();
    let html = doc.append_element(doc.document_id(), "html", &[]);

    let ul = doc.append_element(html, "ul", &[]);
    let li1 = doc.append_element(ul, "li", &[]);
    doc.append_element(li1, "bla", &[]);
    let li2 = doc.append_element(ul, "li", &[("n", "2")]);
    doc.append_text(li2, " ");

    let p1 = doc.append_element(html, "p", &[("id", "foobar")]);
    doc.append_text(p1, "This is a paragraph");

    let nonsense = doc.append_element(html, "nonsense", &[("id", "id1")]);
    doc.append_text(nonsense, "This is not real");

    let p2 = doc.append_element(html, "p", &[("title", "title")]);
    doc.append_text(p2, "A paragraph with a title");
    let span1 = doc.append_element(p2, "span", &[("class", "class1"), ("lang", "en-fr")]);
    doc.append_text(span1, "A span");
    let table = doc.append_element(p2, "table", &[]);
    let tr = doc.append_element(table, "tr", &[]);
    let td = doc.append_element(tr, "td", &[]);
    let span2 = doc.append_element(td, "span", &[("class", "sp")]);
    doc.append_text(span2, "Span in table");

    let p3 = doc.append_element(html, "p", &[("title", "t2"), ("lang", "en-gb")]);
    doc.append_text(p3, "Another one");

    let span3 = doc.append_element(html, "span", &[("class", "a bb c")]);
    doc.append_text(span3, "Multi-class span");

    let div1 = doc.append_element(html, "div", &[("class", "one.word")]);
    doc.append_text(div1, "hooray");
    let anchor = doc.append_element(
        div1,
        "a",
        &[("class", "13"), ("href", "http://example.com")],
    );
    doc.append_text(anchor, "ref");

    let div2 = doc.append_element(html, "div", &[("class", "span")]);
    doc.append_text(div2, "foobar");

    let table2 = doc.append_element(html, "table", &[("id", "t"), ("class", "")]);
    doc.append_comment(table2, " A comment ");

    doc
}

/// Matched elements as their opening tags, sorted for order-independent
/// comparison.
pub fn matched_tags(doc: &Document, expr: &str) -> Vec<String> {
    let selection = doc
        .select(expr)
        .unwrap_or_else(|error| panic!("{{ {} }} failed to parse: {}", expr, error));
    let mut tags: Vec<String> = selection.iter().map(|node| doc.opening_tag(node)).collect();
    tags.sort();
    tags
}

pub fn check(doc: &Document, expr: &str, expected: &[&str]) {
    let mut wanted: Vec<String> = expected.iter().map(|tag| (*tag).to_owned()).collect();
    wanted.sort();
    assert_eq!(matched_tags(doc, expr), wanted, "for {{ {} }}", expr);
}

pub fn check_err(doc: &Document, expr: &str) {
    assert!(
        doc.select(expr).is_err(),
        "{{ {} }} should be a syntax error",
        expr
    );
}
