use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Tag name of the top-level category elements.
const CATEGORY_TAG: &[u8] = b"Category";
/// Attribute carrying a category's display name (same spelling as the tag).
const CATEGORY_ATTR: &[u8] = b"Category";
/// Attribute carrying a subcategory's display name.
const SUBCATEGORY_ATTR: &[u8] = b"SubCategory";
/// Attribute carrying a subcategory's item count.
const COUNT_ATTR: &[u8] = b"count";

/// Errors that can occur while parsing the feed document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing failed (malformed or truncated document).
    #[error("XML parse error: {0}")]
    Xml(String),

    /// An element is missing an attribute the pipeline requires.
    #[error("<{element}> element is missing required attribute \"{attribute}\"")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// A `count` attribute did not hold a non-negative integer.
    #[error("Invalid count attribute: \"{value}\"")]
    InvalidCount { value: String },
}

/// A single lost item type with its observed count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCategory {
    /// Display name, verbatim from the feed (hyphens preserved).
    pub name: String,
    /// Number of items currently held.
    pub count: u32,
}

/// A top-level grouping of lost item types, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name, verbatim from the feed.
    pub name: String,
    /// Subcategories in document order.
    pub subcategories: Vec<SubCategory>,
}

/// Parses the feed document into its category tree.
///
/// Walks the XML with an event reader: direct children of the root tagged
/// `Category` open a category; every child element of an open category is
/// treated as a subcategory regardless of its tag, matching the upstream
/// feed contract. Top-level elements with any other tag are skipped along
/// with their subtrees.
///
/// Counts are validated as non-negative integers here, once, so both
/// exporters work from the same checked values.
///
/// # Errors
///
/// - [`ParseError::Xml`] - malformed or truncated XML
/// - [`ParseError::MissingAttribute`] - a category without a `Category`
///   attribute, or a subcategory without `SubCategory` or `count`
/// - [`ParseError::InvalidCount`] - a `count` value that is not a
///   non-negative integer
pub fn parse_feed(xml: &str) -> Result<Vec<Category>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut categories = Vec::new();
    let mut current: Option<Category> = None;
    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                saw_root = true;
                if depth == 2 && e.name().as_ref() == CATEGORY_TAG {
                    current = Some(Category {
                        name: require_attr(&e, &reader, CATEGORY_ATTR)?,
                        subcategories: Vec::new(),
                    });
                } else if depth == 3 {
                    if let Some(category) = current.as_mut() {
                        category.subcategories.push(parse_subcategory(&e, &reader)?);
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                saw_root = true;
                if depth == 1 && e.name().as_ref() == CATEGORY_TAG {
                    // Self-closing category with no subcategories
                    categories.push(Category {
                        name: require_attr(&e, &reader, CATEGORY_ATTR)?,
                        subcategories: Vec::new(),
                    });
                } else if depth == 2 {
                    if let Some(category) = current.as_mut() {
                        category.subcategories.push(parse_subcategory(&e, &reader)?);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if depth == 2 {
                    if let Some(category) = current.take() {
                        categories.push(category);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(ParseError::Xml("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(ParseError::Xml("unexpected end of document".to_string()));
    }

    Ok(categories)
}

/// Extracts a subcategory from an element's attributes.
///
/// The element tag is deliberately not checked; the feed nests only
/// subcategory elements under a category.
fn parse_subcategory(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> Result<SubCategory, ParseError> {
    let name = require_attr(e, reader, SUBCATEGORY_ATTR)?;
    let raw_count = require_attr(e, reader, COUNT_ATTR)?;
    let count = raw_count
        .trim()
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidCount { value: raw_count })?;

    Ok(SubCategory { name, count })
}

/// Reads a required attribute, decoded and unescaped.
fn require_attr(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    name: &'static [u8],
) -> Result<String, ParseError> {
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|err| ParseError::Xml(err.to_string()))?;
        if attr.key.as_ref() == name {
            let decoder = reader.decoder();
            let value = attr
                .decode_and_unescape_value(decoder)
                .map_err(|err| ParseError::Xml(err.to_string()))?;
            return Ok(value.to_string());
        }
    }

    Err(ParseError::MissingAttribute {
        element: String::from_utf8_lossy(e.name().as_ref()).to_string(),
        attribute: std::str::from_utf8(name).unwrap_or("?"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_feed() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<LostProperty>
    <Category Category="Carry Bag / Luggage">
        <SubCategory SubCategory="Back-Pack" count="5"/>
        <SubCategory SubCategory="Suitcase" count="7"/>
    </Category>
    <Category Category="Eyewear">
        <SubCategory SubCategory="Sunglasses" count="12"/>
    </Category>
</LostProperty>"#;

        let categories = parse_feed(xml).expect("Failed to parse basic feed");
        assert_eq!(categories.len(), 2);

        assert_eq!(categories[0].name, "Carry Bag / Luggage");
        assert_eq!(categories[0].subcategories.len(), 2);
        assert_eq!(categories[0].subcategories[0].name, "Back-Pack");
        assert_eq!(categories[0].subcategories[0].count, 5);
        assert_eq!(categories[0].subcategories[1].name, "Suitcase");
        assert_eq!(categories[0].subcategories[1].count, 7);

        assert_eq!(categories[1].name, "Eyewear");
        assert_eq!(categories[1].subcategories[0].count, 12);
    }

    #[test]
    fn test_document_order_preserved() {
        let xml = r#"<LostProperty>
    <Category Category="B"><SubCategory SubCategory="z" count="1"/></Category>
    <Category Category="A"><SubCategory SubCategory="y" count="2"/></Category>
</LostProperty>"#;

        let categories = parse_feed(xml).unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]); // no sorting
    }

    #[test]
    fn test_non_category_top_level_elements_skipped() {
        let xml = r#"<LostProperty>
    <Advisory text="Service notice"/>
    <Updated>2020-01-01</Updated>
    <Category Category="Tools">
        <SubCategory SubCategory="Hammer" count="1"/>
    </Category>
    <Footer><Note>ignored</Note></Footer>
</LostProperty>"#;

        let categories = parse_feed(xml).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Tools");
        assert_eq!(categories[0].subcategories.len(), 1);
    }

    #[test]
    fn test_extra_attributes_ignored() {
        // The live feed carries a count attribute on Category elements too
        let xml = r#"<LostProperty updated="today">
    <Category Category="Tools" count="9">
        <SubCategory SubCategory="Hammer" count="9" note="x"/>
    </Category>
</LostProperty>"#;

        let categories = parse_feed(xml).unwrap();
        assert_eq!(categories[0].subcategories[0].count, 9);
    }

    #[test]
    fn test_empty_category() {
        let xml = r#"<LostProperty>
    <Category Category="Nothing Yet"></Category>
    <Category Category="Also Nothing"/>
</LostProperty>"#;

        let categories = parse_feed(xml).unwrap();
        assert_eq!(categories.len(), 2);
        assert!(categories[0].subcategories.is_empty());
        assert!(categories[1].subcategories.is_empty());
    }

    #[test]
    fn test_empty_root() {
        let categories = parse_feed("<LostProperty></LostProperty>").unwrap();
        assert!(categories.is_empty());
    }

    #[test]
    fn test_missing_category_attribute_is_error() {
        let xml = r#"<LostProperty>
    <Category><SubCategory SubCategory="Hammer" count="1"/></Category>
</LostProperty>"#;

        let err = parse_feed(xml).unwrap_err();
        match err {
            ParseError::MissingAttribute { element, attribute } => {
                assert_eq!(element, "Category");
                assert_eq!(attribute, "Category");
            }
            e => panic!("Expected MissingAttribute, got {:?}", e),
        }
    }

    #[test]
    fn test_missing_subcategory_attribute_is_error() {
        let xml = r#"<LostProperty>
    <Category Category="Tools"><SubCategory count="1"/></Category>
</LostProperty>"#;

        let err = parse_feed(xml).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingAttribute {
                attribute: "SubCategory",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_count_attribute_is_error() {
        let xml = r#"<LostProperty>
    <Category Category="Tools"><SubCategory SubCategory="Hammer"/></Category>
</LostProperty>"#;

        let err = parse_feed(xml).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingAttribute {
                attribute: "count",
                ..
            }
        ));
    }

    #[test]
    fn test_non_numeric_count_is_error() {
        let xml = r#"<LostProperty>
    <Category Category="Tools"><SubCategory SubCategory="Hammer" count="many"/></Category>
</LostProperty>"#;

        let err = parse_feed(xml).unwrap_err();
        match err {
            ParseError::InvalidCount { value } => assert_eq!(value, "many"),
            e => panic!("Expected InvalidCount, got {:?}", e),
        }
    }

    #[test]
    fn test_negative_count_is_error() {
        let xml = r#"<LostProperty>
    <Category Category="Tools"><SubCategory SubCategory="Hammer" count="-1"/></Category>
</LostProperty>"#;

        assert!(matches!(
            parse_feed(xml),
            Err(ParseError::InvalidCount { .. })
        ));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let result = parse_feed("<not valid xml");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(matches!(parse_feed(""), Err(ParseError::Xml(_))));
    }

    #[test]
    fn test_entities_unescaped_in_attribute_values() {
        let xml = r#"<LostProperty>
    <Category Category="Music &amp; Movies">
        <SubCategory SubCategory="CD &amp; DVD" count="2"/>
    </Category>
</LostProperty>"#;

        let categories = parse_feed(xml).unwrap();
        assert_eq!(categories[0].name, "Music & Movies");
        assert_eq!(categories[0].subcategories[0].name, "CD & DVD");
    }

    #[test]
    fn test_nested_category_tag_not_treated_as_top_level() {
        // A Category tag below the top level is a child of its category,
        // so it needs subcategory attributes like any other child.
        let xml = r#"<LostProperty>
    <Wrapper>
        <Category Category="Hidden">
            <SubCategory SubCategory="x" count="1"/>
        </Category>
    </Wrapper>
</LostProperty>"#;

        let categories = parse_feed(xml).unwrap();
        assert!(categories.is_empty());
    }

    #[test]
    fn test_deeper_descendants_of_category_ignored() {
        let xml = r#"<LostProperty>
    <Category Category="Tools">
        <SubCategory SubCategory="Hammer" count="1">
            <Detail SubCategory="unused" count="99"/>
        </SubCategory>
    </Category>
</LostProperty>"#;

        let categories = parse_feed(xml).unwrap();
        assert_eq!(categories[0].subcategories.len(), 1);
        assert_eq!(categories[0].subcategories[0].count, 1);
    }
}
