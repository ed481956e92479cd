use crate::models::Document;

/// Field-removal variant: drops the encoded body from every item
///
/// Idempotent; items without a body are left as they are.
pub fn truncated(document: &Document) -> Document {
    let mut derived = document.clone();
    for item in derived.items_mut() {
        item.remove_content();
    }
    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CONTENT_ENCODED;
    use crate::variants::tests::canonical;

    #[test]
    fn test_removes_content_only() {
        let source = canonical(3);
        let derived = truncated(&source);

        for (before, after) in source.items().iter().zip(derived.items()) {
            assert!(before.content_encoded.is_some());
            assert!(after.content_encoded.is_none());
            assert_eq!(before.description, after.description);
            assert_eq!(before.link, after.link);
            assert_eq!(before.fields, after.fields);
        }

        let xml = derived.to_xml();
        let item = xml.child("channel").unwrap().child("item").unwrap();
        assert!(item.child(CONTENT_ENCODED).is_none());
    }

    #[test]
    fn test_idempotent() {
        let source = canonical(5);
        let once = truncated(&source);
        let twice = truncated(&once);
        assert_eq!(once, twice);
    }
}
