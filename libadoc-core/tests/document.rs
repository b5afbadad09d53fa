//! Whole-document parsing

use libadoc_core::ast::{
    BlockContent, BulletStyle, DelimitedBlockKind, DocElement, ListKind, NumberingStyle,
};
use libadoc_core::{parse_document, AdmonitionKind, Document, ListItem, ParseOptions};

fn parse(input: &str) -> Document {
    parse_document(input, &ParseOptions::default()).unwrap()
}

fn paragraph_text(element: &DocElement) -> String {
    match element {
        DocElement::Paragraph(paragraph) => paragraph
            .lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        other => panic!("expected a paragraph, got {}", other.kind()),
    }
}

#[test]
fn test_section_with_paragraph() {
    let document = parse("== Title\n\nSome text.\n");
    assert_eq!(document.elements.len(), 1);
    let DocElement::Section(section) = &document.elements[0] else {
        panic!("expected a section");
    };
    assert_eq!(section.level, 1);
    assert_eq!(section.title.content.to_string(), "Title");
    assert_eq!(section.title.id, "_title");
    assert_eq!(section.elements.len(), 1);
    assert_eq!(paragraph_text(&section.elements[0]), "Some text.");
}

#[test]
fn test_nested_sections() {
    let document = parse("== A\n\n=== B\n\ntext\n\n== C\n");
    let sections = document.sections();
    let titles: Vec<_> = sections
        .iter()
        .map(|section| (section.level, section.title.id.as_str()))
        .collect();
    assert_eq!(titles, vec![(1, "_a"), (2, "_b"), (1, "_c")]);

    let DocElement::Section(first) = &document.elements[0] else {
        panic!("expected a section");
    };
    assert!(matches!(&first.elements[0], DocElement::Section(child) if child.level == 2));
}

#[test]
fn test_skipped_section_level_is_an_error() {
    let err = parse_document("== A\n\n==== C\n", &ParseOptions::default()).unwrap_err();
    assert!(err.to_string().contains("cannot be nested"), "{err}");
}

#[test]
fn test_preamble_before_sections() {
    let document = parse("Intro.\n\n== Part\n\nBody.\n");
    assert_eq!(document.elements.len(), 2);
    let DocElement::Preamble(preamble) = &document.elements[0] else {
        panic!("expected a preamble");
    };
    assert_eq!(paragraph_text(&preamble.elements[0]), "Intro.");
    assert!(matches!(document.elements[1], DocElement::Section(_)));
}

#[test]
fn test_explicit_section_id() {
    let document = parse("[[custom]]\n== Title\n");
    assert_eq!(document.sections()[0].title.id, "custom");
}

#[test]
fn test_header_with_author_and_revision() {
    let document = parse(
        "= The Doc\nJohn Q Doe <john@example.com>\nv1.0, 2020-01-01: First draft\n:toc: left\n\nHello.\n",
    );
    let header = document.header.expect("header");
    assert_eq!(header.title.content.to_string(), "The Doc");
    assert_eq!(header.authors.len(), 1);
    assert_eq!(header.authors[0].full_name, "John Q Doe");
    assert_eq!(header.authors[0].email.as_deref(), Some("john@example.com"));

    let revision = header.revision.expect("revision");
    assert_eq!(revision.number.as_deref(), Some("1.0"));
    assert_eq!(revision.date.as_deref(), Some("2020-01-01"));
    assert_eq!(revision.remark.as_deref(), Some("First draft"));

    assert_eq!(header.attributes.len(), 1);
    assert_eq!(header.attributes[0].name, "toc");
    assert_eq!(header.attributes[0].value.as_deref(), Some("left"));
    assert_eq!(paragraph_text(&document.elements[0]), "Hello.");
}

#[test]
fn test_front_matter() {
    let document = parse("---\ntitle: Hello\ntags: [a, b]\n---\n= Doc\n");
    let front_matter = document.front_matter.expect("front matter");
    assert_eq!(front_matter.raw, "title: Hello\ntags: [a, b]\n");
    assert_eq!(
        front_matter.attributes.get("title").and_then(|v| v.as_str()),
        Some("Hello")
    );
    assert!(document.header.is_some());
}

#[test]
fn test_front_matter_must_be_a_mapping() {
    let err = parse_document("---\n- a\n- b\n---\n", &ParseOptions::default()).unwrap_err();
    assert!(err.to_string().contains("mapping"), "{err}");
}

#[test]
fn test_attribute_declaration_and_reset() {
    let document = parse(":version: 1.2\n:!draft:\n:final!:\n");
    let kinds: Vec<_> = document.elements.iter().map(DocElement::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "attribute declaration",
            "attribute reset",
            "attribute reset"
        ]
    );
}

#[test]
fn test_unordered_list_nesting() {
    let document = parse("* a\n** b\n* c\n");
    let DocElement::List(list) = &document.elements[0] else {
        panic!("expected a list");
    };
    assert_eq!(list.kind, ListKind::Unordered);
    assert_eq!(list.items.len(), 2);
    let ListItem::Unordered { bullet, elements, .. } = &list.items[0] else {
        panic!("expected an unordered item");
    };
    assert_eq!(*bullet, BulletStyle::OneAsterisk);
    assert_eq!(paragraph_text(&elements[0]), "a");
    let DocElement::List(child) = &elements[1] else {
        panic!("expected a nested list");
    };
    assert_eq!(child.items[0].level(), 2);
    assert_eq!(paragraph_text(&list.items[1].elements()[0]), "c");
}

#[test]
fn test_ordered_list_styles() {
    let document = parse(". one\n.. sub\n. two\n");
    let DocElement::List(list) = &document.elements[0] else {
        panic!("expected a list");
    };
    assert_eq!(list.kind, ListKind::Ordered);
    assert_eq!(list.items.len(), 2);
    let DocElement::List(child) = &list.items[0].elements()[1] else {
        panic!("expected a nested list");
    };
    assert!(matches!(
        child.items[0],
        ListItem::Ordered {
            numbering: NumberingStyle::LowerAlpha,
            level: 2,
            ..
        }
    ));

    let document = parse("1. first\n2. second\n");
    let DocElement::List(list) = &document.elements[0] else {
        panic!("expected a list");
    };
    assert_eq!(list.items.len(), 2);
}

#[test]
fn test_labeled_list() {
    let document = parse("CPU:: The brain\nRAM:: Memory\n");
    let DocElement::List(list) = &document.elements[0] else {
        panic!("expected a list");
    };
    assert_eq!(list.kind, ListKind::Labeled);
    let terms: Vec<_> = list
        .items
        .iter()
        .map(|item| match item {
            ListItem::Labeled { term, .. } => term.as_str(),
            _ => panic!("expected a labeled item"),
        })
        .collect();
    assert_eq!(terms, vec!["CPU", "RAM"]);
}

#[test]
fn test_list_item_continuation() {
    let document = parse("* item\n+\n----\ncode\n----\n");
    let DocElement::List(list) = &document.elements[0] else {
        panic!("expected a list");
    };
    let elements = list.items[0].elements();
    assert_eq!(elements.len(), 2);
    assert!(matches!(
        &elements[1],
        DocElement::DelimitedBlock(block) if block.kind == DelimitedBlockKind::Listing
    ));
}

#[test]
fn test_list_attributes() {
    let document = parse("[#tools]\n- hammer\n- saw\n");
    let DocElement::List(list) = &document.elements[0] else {
        panic!("expected a list");
    };
    assert_eq!(list.attributes.id.as_deref(), Some("tools"));
    assert_eq!(list.items.len(), 2);
}

#[test]
fn test_admonitions() {
    let document = parse("NOTE: Be careful.\n\n[WARNING]\nHot surface.\n");
    let admonitions: Vec<_> = document
        .elements
        .iter()
        .map(|element| match element {
            DocElement::Paragraph(paragraph) => paragraph.admonition,
            other => panic!("unexpected {}", other.kind()),
        })
        .collect();
    assert_eq!(
        admonitions,
        vec![Some(AdmonitionKind::Note), Some(AdmonitionKind::Warning)]
    );
    assert_eq!(paragraph_text(&document.elements[1]), "Hot surface.");
}

#[test]
fn test_paragraph_attributes() {
    let document = parse("[[intro]]\n.An Intro\n[role=lead]\nText here.\n");
    let DocElement::Paragraph(paragraph) = &document.elements[0] else {
        panic!("expected a paragraph");
    };
    assert_eq!(paragraph.attributes.id.as_deref(), Some("intro"));
    assert_eq!(paragraph.attributes.title.as_deref(), Some("An Intro"));
    let role = paragraph.attributes.option("role").expect("role option");
    assert_eq!(role.value.as_deref(), Some("lead"));
}

#[test]
fn test_delimited_blocks() {
    let document = parse("----\nfn main() {}\n----\n\n```\nplain\n```\n\n====\nInside.\n====\n");
    let blocks: Vec<_> = document
        .elements
        .iter()
        .map(|element| match element {
            DocElement::DelimitedBlock(block) => block,
            other => panic!("unexpected {}", other.kind()),
        })
        .collect();
    assert_eq!(blocks.len(), 3);
    assert_eq!(
        blocks[0].content,
        BlockContent::Verbatim("fn main() {}".to_string())
    );
    assert_eq!(blocks[1].kind, DelimitedBlockKind::Fenced);
    let BlockContent::Blocks(inner) = &blocks[2].content else {
        panic!("expected nested blocks");
    };
    assert_eq!(paragraph_text(&inner[0]), "Inside.");
}

#[test]
fn test_listing_block_with_attributes() {
    let document = parse("[source,rust]\n----\nlet x = 1;\n----\n");
    let DocElement::DelimitedBlock(block) = &document.elements[0] else {
        panic!("expected a delimited block");
    };
    assert_eq!(block.attributes.options.len(), 2);
    assert_eq!(block.attributes.options[0].key, "source");
    assert_eq!(block.attributes.options[1].key, "rust");
}

#[test]
fn test_literal_blocks() {
    let document = parse("  indented text\n\n....\nkept   as is\n....\n\n[literal]\nplain\n");
    let contents: Vec<_> = document
        .elements
        .iter()
        .map(|element| match element {
            DocElement::LiteralBlock { content } => content.as_str(),
            other => panic!("unexpected {}", other.kind()),
        })
        .collect();
    assert_eq!(contents, vec!["  indented text", "kept   as is", "plain"]);
}

#[test]
fn test_block_image_and_toc() {
    let document = parse("toc::[]\nimage::images/tiger.png[Tiger, 200, 100]\n");
    assert!(matches!(document.elements[0], DocElement::TableOfContentsMacro));
    let DocElement::BlockImage(image) = &document.elements[1] else {
        panic!("expected a block image");
    };
    assert_eq!(image.image.path, "images/tiger.png");
    assert_eq!(image.image.alt, "Tiger");
    assert_eq!(image.image.width.as_deref(), Some("200"));
    assert_eq!(image.image.height.as_deref(), Some("100"));
}

#[test]
fn test_memoization_does_not_change_the_tree() {
    let input = "= Doc\n\n== A\n\n* one\n** two\n\nNOTE: *careful* here\n\n=== B\n\n----\nx\n----\n";
    let plain = parse_document(input, &ParseOptions::default()).unwrap();
    let memoized = parse_document(input, &ParseOptions::default().with_memoization(true)).unwrap();
    assert_eq!(plain, memoized);
}

#[test]
fn test_deep_document_parses_on_a_small_stack() {
    let input = "= Doc\n\n== One\n\n=== Two\n\n==== Three\n\n===== Four\n\n\
                 ====== Five\n\n* one\n** two\n\nNOTE: *careful* here\n\n----\nx\n----\n";
    for memoize in [false, true] {
        let options = ParseOptions::default().with_memoization(memoize);
        let document = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || parse_document(input, &options))
            .unwrap()
            .join()
            .expect("parse thread")
            .unwrap();

        let mut elements = &document.elements;
        for level in 1..=5 {
            let DocElement::Section(section) = &elements[0] else {
                panic!("expected a level {level} section, got {:?}", elements[0]);
            };
            assert_eq!(section.level, level);
            elements = &section.elements;
        }
        assert_eq!(elements.len(), 3, "memoize = {memoize}");
        assert!(matches!(elements[2], DocElement::DelimitedBlock(_)));
    }
}

#[test]
fn test_tree_serializes_to_json() {
    let document = parse("== Title\n\nSome *bold* text.\n");
    let json = serde_json::to_value(&document).unwrap();
    assert_eq!(json["elements"][0]["type"], "section");
    assert_eq!(json["elements"][0]["title"]["id"], "_title");
}
