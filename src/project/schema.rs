//! Rewrite of the private feed shape into the public one.
//!
//! The private feed names item fields after NGW's resource API. The rewrite
//! walks the parsed document and renames known keys on project items only,
//! so values elsewhere (styles, descriptions) are never touched.

use serde_json::{Map, Value};

/// Item keys renamed by the rewrite, as `(private, public)`.
const ITEM_RENAMES: [(&str, &str); 3] = [
    ("display_name", "title"),
    ("resource_cls", "type"),
    ("children", "layers"),
];

/// Rename the top-level `items` to `layers`, then rewrite every item.
///
/// A document already in the public shape passes through unchanged.
pub fn rewrite_private(doc: &mut Value) {
    let Some(root) = doc.as_object_mut() else {
        return;
    };
    rename_key(root, "items", "layers");
    if let Some(Value::Array(items)) = root.get_mut("layers") {
        rewrite_items(items);
    }
}

fn rewrite_items(items: &mut [Value]) {
    for item in items.iter_mut().filter_map(Value::as_object_mut) {
        for (from, to) in ITEM_RENAMES {
            rename_key(item, from, to);
        }
        if let Some(Value::Array(children)) = item.get_mut("layers") {
            rewrite_items(children);
        }
    }
}

/// Move `from` to `to`. A value already under `to` is replaced.
fn rename_key(obj: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = obj.remove(from) {
        obj.insert(to.to_string(), value);
    }
}
